use std::fmt;

/// Hard failures of the exchange codec
///
/// Per-item problems are warnings, not errors; these only fire when the package as a whole
/// cannot be read or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The package has no manifest
    ManifestNotFound,
    /// A required document is missing or is not well-formed
    ParseError(String),
    SerializationError(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::ManifestNotFound => write!(f, "Package has no manifest"),
            CodecError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            CodecError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}
