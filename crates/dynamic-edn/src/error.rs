use edn_pack::EdnError;
use thiserror::Error;

/// Errors surfaced by the registry and the read/write pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The stream held no further forms.
    #[error("end of input")]
    EndOfInput,
    /// A tag had no reader and no default reader was set.
    #[error("no reader function for tag {0}")]
    UnknownTag(String),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// Writing or flushing the output sink failed.
    #[error("serialization I/O error: {0}")]
    Io(#[source] std::io::Error),
    #[error("tag #{tag} is already registered to {existing}")]
    DuplicateRegistration { tag: String, existing: &'static str },
    #[error("key already present: {0}")]
    KeyExists(String),
    #[error("translator for #{tag} failed: {message}")]
    Translator { tag: String, message: String },
    #[error("no print method for {0}")]
    NoPrintMethod(String),
    #[error(transparent)]
    Edn(EdnError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn type_mismatch(expected: &'static str, found: &edn_pack::Edn) -> Self {
        Error::TypeMismatch {
            expected,
            found: found.kind(),
        }
    }
}

impl From<EdnError> for Error {
    fn from(err: EdnError) -> Self {
        match err {
            EdnError::UnknownTag(tag) => Error::UnknownTag(tag),
            EdnError::NoPrintMethod(name) => Error::NoPrintMethod(name),
            EdnError::Io(io) => Error::Io(io),
            // Errors raised by our own tag readers come back unwrapped.
            EdnError::TagRead { tag, source } => match source.downcast::<Error>() {
                Ok(inner) => *inner,
                Err(other) => Error::Translator {
                    tag,
                    message: other.to_string(),
                },
            },
            other => Error::Edn(other),
        }
    }
}
