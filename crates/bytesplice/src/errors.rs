//! # Error Types

/// Errors from bytesplice operations.
#[derive(Debug, thiserror::Error)]
pub enum BytespliceError {
    /// A symbol char with no reverse byte mapping.
    #[error("symbol {symbol:?} is not a byte symbol")]
    InvalidSymbol {
        /// The unmapped symbol.
        symbol: char,
    },

    /// Decoded bytes do not form valid UTF-8.
    #[error(transparent)]
    MalformedByteSequence(#[from] std::string::FromUtf8Error),

    /// The token is already present in the vocabulary.
    #[error("token {token:?} is already registered")]
    DuplicateToken {
        /// The duplicate token string.
        token: String,
    },

    /// Vocabulary file contents could not be interpreted.
    #[error("vocab format: {0}")]
    VocabFormat(String),

    /// Vocabulary data is inconsistent.
    #[error("{0}")]
    VocabConflict(String),

    /// Token value out of range for the target type.
    #[error("token out of range")]
    TokenOutOfRange,

    /// A split pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Parse error (json, merge rule, etc.)
    #[error("parse error: {0}")]
    Parse(String),
}

/// Result type for bytesplice operations.
pub type BSResult<T> = core::result::Result<T, BytespliceError>;
