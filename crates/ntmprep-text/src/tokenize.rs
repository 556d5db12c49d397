use std::sync::Arc;

use crate::lemma::LemmaDictionary;

/// Lower-cases, strips ASCII punctuation, splits on whitespace and lemmatizes.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    lemmas: Arc<LemmaDictionary>,
    min_len: usize,
}

impl Tokenizer {
    pub fn new(lemmas: Arc<LemmaDictionary>, min_len: usize) -> Self {
        Self { lemmas, min_len }
    }

    /// Built-in English dictionary with the default minimum length of 2.
    pub fn english() -> Self {
        Self::new(LemmaDictionary::english(), 2)
    }

    /// Lower-cased, punctuation-free tokens longer than `min_len` characters, before lemmatization.
    pub fn surface_tokens(&self, document: &str) -> Vec<String> {
        let cleaned: String = document.to_lowercase().chars().filter(|c| !c.is_ascii_punctuation()).collect();
        cleaned.split_whitespace().filter(|t| t.chars().count() > self.min_len).map(str::to_string).collect()
    }

    pub fn lemmatize(&self, token: &str) -> String {
        self.lemmas.lemmatize(token)
    }

    pub fn tokenize(&self, document: &str) -> Vec<String> {
        self.surface_tokens(document).iter().map(|t| self.lemmatize(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_floor_applies_before_lemmatizing() {
        let dict = Arc::new(LemmaDictionary::parse("men\tman\n"));
        let tok = Tokenizer::new(dict, 2);
        assert_eq!(tok.tokenize("we are men"), vec!["are", "man"]);
    }

    #[test]
    fn apostrophes_are_removed_not_split() {
        assert_eq!(Tokenizer::english().tokenize("Don't!"), vec!["dont"]);
    }
}
