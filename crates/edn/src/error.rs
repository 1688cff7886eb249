use thiserror::Error;

/// Boxed error returned by tag readers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for EDN reading and printing.
#[derive(Debug, Error)]
pub enum EdnError {
    #[error("EDN syntax error at char {pos}: {msg}")]
    Syntax { pos: usize, msg: &'static str },
    #[error("unexpected end of input at char {0}")]
    UnexpectedEof(usize),
    #[error("invalid UTF-8 at char {0}")]
    InvalidUtf8(usize),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("duplicate key: {0}")]
    DuplicateKey(String),
    #[error("no reader function for tag {0}")]
    UnknownTag(String),
    #[error("reader for tag #{tag} failed: {source}")]
    TagRead {
        tag: String,
        #[source]
        source: BoxError,
    },
    #[error("no print method for {0}")]
    NoPrintMethod(String),
    #[error("value cannot be represented as JSON: {0}")]
    NotJson(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
