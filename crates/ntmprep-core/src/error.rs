use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed input in {key}: {message}")]
    Decode { key: String, message: String },

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Vocabulary is empty after frequency filtering ({documents} documents, df in [{min_df}, {max_df}])")]
    EmptyVocabulary {
        documents: usize,
        min_df: f64,
        max_df: f64,
    },

    #[error("Upload of {key} failed: {message}")]
    Upload { key: String, message: String },
}

/// Coarse classification of an [`Error`], cheap to copy into reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    InvalidConfig,
    NotFound,
    Io,
    Decode,
    Encode,
    EmptyVocabulary,
    Upload,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Io { .. } => ErrorKind::Io,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::Encode(_) => ErrorKind::Encode,
            Error::EmptyVocabulary { .. } => ErrorKind::EmptyVocabulary,
            Error::Upload { .. } => ErrorKind::Upload,
        }
    }

    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io { key: key.into(), source }
    }

    pub fn decode(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Decode { key: key.into(), message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
