use thiserror::Error;

/// Errors surfaced by the engine. Empty result sets are never an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed constructor input, search parameters or conditions.
    #[error("configuration error: {0}")]
    Config(String),
    /// A field name that the schema does not declare.
    #[error("field '{0}' does not exist in the schema")]
    UnknownField(String),
    /// A document that does not conform to the schema.
    #[error("document does not match schema: {0}")]
    Validation(String),
    /// A where-clause operator used against an incompatible field type.
    #[error("type mismatch on field '{field}': {detail}")]
    TypeMismatch { field: String, detail: String },
    /// The engine cannot hold any more documents.
    #[error("capacity exhausted: {0}")]
    Capacity(String),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self { Error::Config(msg.into()) }

    pub(crate) fn mismatch(field: &str, detail: impl Into<String>) -> Self {
        Error::TypeMismatch { field: field.to_string(), detail: detail.into() }
    }

    /// True for the configuration class of errors (bad parameters or schema references).
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::UnknownField(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
