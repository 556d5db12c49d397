//! Frequency-bounded vocabulary fitting and bag-of-words encoding.
//!
//! [`fit`] learns a [`VocabularyState`] from a training collection; [`transform`]
//! encodes any collection against that state into a CSR count matrix whose
//! columns follow the sorted vocabulary.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use sprs::{CompressedStorage, CsMat, CsVec};

use ntmprep_core::error::{Error, Result};

use crate::stopwords::StopWords;
use crate::tokenize::Tokenizer;

/// Rows are documents, columns are vocabulary indices.
pub type SparseMatrix = CsMat<u32>;

#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyOptions {
    pub min_df: f64,
    pub max_df: f64,
    pub min_token_len: usize,
    pub stop_words: bool,
}

impl Default for VocabularyOptions {
    fn default() -> Self {
        Self { min_df: 0.01, max_df: 0.9, min_token_len: 2, stop_words: true }
    }
}

impl From<&ntmprep_core::config::VocabularyConfig> for VocabularyOptions {
    fn from(c: &ntmprep_core::config::VocabularyConfig) -> Self {
        Self { min_df: c.min_df, max_df: c.max_df, min_token_len: c.min_token_len, stop_words: c.stop_words }
    }
}

impl VocabularyOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_df) || !(0.0..=1.0).contains(&self.max_df) || self.min_df > self.max_df {
            return Err(Error::InvalidConfig(format!(
                "document frequency bounds must satisfy 0 <= min_df <= max_df <= 1, got [{}, {}]",
                self.min_df, self.max_df
            )));
        }
        Ok(())
    }
}

/// Tokenizer plus optional stop word removal; the same analysis is used for fitting and encoding.
#[derive(Debug, Clone)]
pub struct Analyzer {
    tokenizer: Tokenizer,
    stop_words: Option<StopWords>,
}

impl Analyzer {
    pub fn new(tokenizer: Tokenizer, stop_words: Option<StopWords>) -> Self {
        Self { tokenizer, stop_words }
    }

    pub fn english(options: &VocabularyOptions) -> Self {
        let tokenizer = Tokenizer::new(crate::lemma::LemmaDictionary::english(), options.min_token_len);
        Self::new(tokenizer, options.stop_words.then(StopWords::english))
    }

    /// Stop words are dropped on the surface form and again after lemmatizing.
    pub fn analyze(&self, document: &str) -> Vec<String> {
        let Some(stop) = &self.stop_words else {
            return self.tokenizer.tokenize(document);
        };
        self.tokenizer
            .surface_tokens(document)
            .iter()
            .filter(|t| !stop.contains(t))
            .map(|t| self.tokenizer.lemmatize(t))
            .filter(|t| !stop.contains(t))
            .collect()
    }
}

/// Fitted encoder state. Immutable once built.
#[derive(Debug, Clone)]
pub struct VocabularyState {
    tokens: Vec<String>,
    index: HashMap<String, usize>,
    documents: usize,
    analyzer: Analyzer,
}

impl VocabularyState {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token_index(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Number of documents the state was fit on.
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Tokens joined by `\n` in column order, without a trailing newline.
    pub fn listing(&self) -> String {
        self.tokens.join("\n")
    }

    /// Count vector for one document, keyed by ascending column index.
    pub fn encode(&self, document: &str) -> CsVec<u32> {
        let mut counts: BTreeMap<usize, u32> = BTreeMap::new();
        for token in self.analyzer.analyze(document) {
            if let Some(&col) = self.index.get(&token) {
                *counts.entry(col).or_insert(0) += 1;
            }
        }
        let (indices, data): (Vec<usize>, Vec<u32>) = counts.into_iter().unzip();
        CsVec::new(self.tokens.len(), indices, data)
    }
}

/// Learn the vocabulary of `documents`, keeping tokens whose document
/// frequency lies within `[min_df * N, max_df * N]` (both ends inclusive).
pub fn fit<S: AsRef<str>>(documents: &[S], analyzer: Analyzer, options: &VocabularyOptions) -> Result<VocabularyState> {
    options.validate()?;

    let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
    for doc in documents {
        let distinct: BTreeSet<String> = analyzer.analyze(doc.as_ref()).into_iter().collect();
        for token in distinct {
            *document_frequency.entry(token).or_insert(0) += 1;
        }
    }

    let n = documents.len() as f64;
    let (low, high) = (options.min_df * n, options.max_df * n);
    let candidates = document_frequency.len();
    let tokens: Vec<String> = document_frequency
        .into_iter()
        .filter(|(_, df)| {
            let df = *df as f64;
            df >= low && df <= high
        })
        .map(|(token, _)| token)
        .collect();
    let index = tokens.iter().enumerate().map(|(i, t)| (t.clone(), i)).collect();

    tracing::info!(
        documents = documents.len(),
        candidates,
        kept = tokens.len(),
        min_df = options.min_df,
        max_df = options.max_df,
        "fitted vocabulary"
    );
    Ok(VocabularyState { tokens, index, documents: documents.len(), analyzer })
}

/// Encode `documents` row by row against a fitted state.
pub fn transform<S: AsRef<str>>(documents: &[S], state: &VocabularyState) -> SparseMatrix {
    let mut matrix = CsMat::empty(CompressedStorage::CSR, state.len());
    matrix.reserve_outer_dim_exact(documents.len());
    for doc in documents {
        let row = state.encode(doc.as_ref());
        matrix = matrix.append_outer_csvec(row.view());
    }
    tracing::debug!(rows = matrix.rows(), cols = matrix.cols(), nnz = matrix.nnz(), "encoded documents");
    matrix
}
