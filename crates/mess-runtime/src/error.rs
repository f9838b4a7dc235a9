use crate::api::ApiError;
use crate::session::SessionState;
use mess_engine::ValidationError;
use std::fmt;

/// Result type for mess-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which write a `Write` error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOp::Create => write!(f, "create"),
            WriteOp::Update => write!(f, "update"),
            WriteOp::Delete => write!(f, "delete"),
        }
    }
}

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Schemas could not be fetched; nothing can be shown
    SchemaLoad(ApiError),

    /// Grid data for a model could not be fetched; the grid keeps what it had
    DataLoad { model: String, source: ApiError },

    /// Create, update or delete failed; the edit session stays open
    Write {
        op: WriteOp,
        model: String,
        source: ApiError,
    },

    /// Candidate list for a reference field could not be fetched
    ReferenceLoad { model: String, source: ApiError },

    /// Model name not present in the schema catalog
    UnknownModel(String),

    /// Operation not allowed in the session's current state
    InvalidState {
        op: &'static str,
        state: SessionState,
    },

    /// Operation needs a persisted record but the working copy has no identity
    MissingIdentity,

    /// Grid row index out of range
    NoSuchRow(usize),

    /// Editor input rejected for a field
    Validation(ValidationError),

    /// Configuration error
    Config(String),

    /// IO operation failed
    Io(std::io::Error),
}

impl Error {
    /// Errors after which an open edit session is still usable
    pub fn keeps_session_open(&self) -> bool {
        matches!(
            self,
            Error::Write { .. }
                | Error::ReferenceLoad { .. }
                | Error::Validation(_)
                | Error::MissingIdentity
                | Error::InvalidState { .. }
        )
    }

    /// The backend's own message, when the error came from the transport
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::SchemaLoad(source)
            | Error::DataLoad { source, .. }
            | Error::Write { source, .. }
            | Error::ReferenceLoad { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SchemaLoad(err) => write!(f, "Failed to load schemas: {}", err),
            Error::DataLoad { model, source } => {
                write!(f, "Failed to load '{}' data: {}", model, source)
            }
            Error::Write { op, model, source } => {
                write!(f, "Failed to {} '{}' record: {}", op, model, source)
            }
            Error::ReferenceLoad { model, source } => {
                write!(f, "Failed to load '{}' candidates: {}", model, source)
            }
            Error::UnknownModel(name) => write!(f, "Unknown model: {}", name),
            Error::InvalidState { op, state } => {
                write!(f, "Cannot {} while session is {}", op, state)
            }
            Error::MissingIdentity => write!(f, "Record has no identity yet"),
            Error::NoSuchRow(index) => write!(f, "No row at index {}", index),
            Error::Validation(err) => write!(f, "{}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::SchemaLoad(err) => Some(err),
            Error::DataLoad { source, .. }
            | Error::Write { source, .. }
            | Error::ReferenceLoad { source, .. } => Some(source),
            Error::Validation(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::UnknownModel(_)
            | Error::InvalidState { .. }
            | Error::MissingIdentity
            | Error::NoSuchRow(_)
            | Error::Config(_) => None,
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
