//! Dictionary lemmatization of nouns.
//!
//! A [`LemmaDictionary`] maps inflected noun forms onto their base form using
//! an exception table and, failing that, the noun detachment rules checked
//! against a lexicon of known base forms. Dictionaries whose lexicon is not
//! exhaustive (the built-in one, hand-written tables) also guess the singular
//! of regular plurals they have never seen.
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use ntmprep_core::error::{Error, Result};

const BUILTIN_ENGLISH: &str = include_str!("../data/lemmas_en.tsv");

/// Suffix replacements tried when a form is not in the exception table.
const NOUN_RULES: [(&str, &str); 8] = [
    ("s", ""),
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

static ENGLISH: OnceLock<Arc<LemmaDictionary>> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct LemmaDictionary {
    exceptions: HashMap<String, String>,
    lexicon: HashSet<String>,
    guess_plurals: bool,
}

impl LemmaDictionary {
    /// Parse `form<TAB>lemma` and bare-word lines; `#` starts a comment line.
    pub fn parse(source: &str) -> Self {
        let mut dict = Self { guess_plurals: true, ..Self::default() };
        for line in source.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once('\t') {
                Some((form, lemma)) => {
                    let lemma = lemma.trim().to_lowercase();
                    dict.lexicon.insert(lemma.clone());
                    dict.exceptions.insert(form.trim().to_lowercase(), lemma);
                }
                None => {
                    dict.lexicon.insert(line.to_lowercase());
                }
            }
        }
        dict
    }

    /// Build from WordNet's `index.noun` and `noun.exc`.
    ///
    /// The noun index is taken as the complete lexicon, so unknown words are
    /// left unchanged. Multi-word collocations are skipped.
    pub fn parse_wordnet(index_noun: &str, noun_exc: &str) -> Self {
        let mut dict = Self::default();
        for line in index_noun.lines().filter(|l| !l.starts_with(' ')) {
            if let Some(lemma) = line.split_whitespace().next().filter(|w| !w.contains('_')) {
                dict.lexicon.insert(lemma.to_lowercase());
            }
        }
        for line in noun_exc.lines() {
            let mut fields = line.split_whitespace();
            let Some(form) = fields.next().filter(|w| !w.contains('_')) else { continue };
            if let Some(base) = fields.filter(|w| !w.contains('_')).min_by_key(|w| w.len()) {
                dict.exceptions.insert(form.to_lowercase(), base.to_lowercase());
            }
        }
        dict
    }

    /// Load a table file, or a WordNet `dict` directory holding `index.noun` and `noun.exc`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let read = |p: &Path| std::fs::read_to_string(p).map_err(|e| Error::io(p.display().to_string(), e));
        let dict = if path.is_dir() {
            Self::parse_wordnet(&read(&path.join("index.noun"))?, &read(&path.join("noun.exc"))?)
        } else {
            Self::parse(&read(path)?)
        };
        tracing::info!(
            path = %path.display(),
            exceptions = dict.exceptions.len(),
            lexicon = dict.lexicon.len(),
            "loaded lemma dictionary"
        );
        Ok(dict)
    }

    /// The built-in English dictionary, parsed on first use and shared afterwards.
    pub fn english() -> Arc<LemmaDictionary> {
        ENGLISH
            .get_or_init(|| {
                let dict = Self::parse(BUILTIN_ENGLISH);
                tracing::debug!(
                    exceptions = dict.exceptions.len(),
                    lexicon = dict.lexicon.len(),
                    "initialized built-in lemma dictionary"
                );
                Arc::new(dict)
            })
            .clone()
    }

    /// Load `path` when given, else fall back to [`LemmaDictionary::english`].
    pub fn load(path: Option<&Path>) -> Result<Arc<LemmaDictionary>> {
        match path {
            Some(p) => Ok(Arc::new(Self::from_path(p)?)),
            None => Ok(Self::english()),
        }
    }

    pub fn lemmatize(&self, word: &str) -> String {
        if let Some(lemma) = self.exceptions.get(word) {
            return lemma.clone();
        }
        let mut chosen: Option<String> = self.lexicon.contains(word).then(|| word.to_string());
        for (suffix, replacement) in NOUN_RULES {
            if let Some(stem) = word.strip_suffix(suffix) {
                let candidate = format!("{stem}{replacement}");
                if self.lexicon.contains(&candidate) && chosen.as_ref().map_or(true, |c| candidate.len() < c.len()) {
                    chosen = Some(candidate);
                }
            }
        }
        chosen
            .or_else(|| if self.guess_plurals { guess_singular(word) } else { None })
            .unwrap_or_else(|| word.to_string())
    }
}

/// Singular of a regular English plural, or `None` when `word` does not look like one.
fn guess_singular(word: &str) -> Option<String> {
    if word.len() < 4 || !word.ends_with('s') || ["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
        return None;
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return Some(if stem.chars().count() >= 2 { format!("{stem}y") } else { format!("{stem}ie") });
    }
    if ["sses", "shes", "ches", "xes", "zzes"].iter().any(|s| word.ends_with(s)) {
        return Some(word[..word.len() - 2].to_string());
    }
    Some(word[..word.len() - 1].to_string())
}
