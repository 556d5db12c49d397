pub mod lemma;
pub mod stopwords;
pub mod tokenize;
pub mod vocab;

pub use lemma::LemmaDictionary;
pub use stopwords::StopWords;
pub use tokenize::Tokenizer;
pub use vocab::{fit, transform, Analyzer, SparseMatrix, VocabularyOptions, VocabularyState};
