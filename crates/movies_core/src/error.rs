//! Domain error types for the movies/actors catalog.

use thiserror::Error;

/// A domain error, carrying enough structure to map losslessly onto the
/// MCP wire taxonomy at the protocol boundary. Field/message are set on
/// every variant that can be traced back to a single input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{field} must not be empty")]
    Empty { field: String },

    #[error("{field} is out of range: {message}")]
    OutOfRange { field: String, message: String },

    #[error("{field} is not a valid http(s) URL: {message}")]
    BadUrl { field: String, message: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("version conflict on {resource} {id}: expected {expected}, found {actual}")]
    Conflict {
        resource: String,
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("{field} failed validation: {message}")]
    Validation { field: String, message: String },

    /// A genuine storage/infrastructure failure (dropped connection, I/O
    /// error, unexpected row shape) - never the caller's fault, so it is
    /// excluded from `is_input_error()` and maps to `InternalError` at the
    /// protocol boundary instead of `InvalidParams`.
    #[error("infrastructure failure: {message}")]
    Infrastructure { message: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;

impl DomainError {
    pub fn empty(field: impl Into<String>) -> Self {
        Self::Empty { field: field.into() }
    }

    pub fn out_of_range(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OutOfRange {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn bad_url(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadUrl {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn conflict(resource: impl Into<String>, id: impl Into<String>, expected: u64, actual: u64) -> Self {
        Self::Conflict {
            resource: resource.into(),
            id: id.into(),
            expected,
            actual,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::Infrastructure { message: message.into() }
    }

    /// The field this error is attached to, if any (used when shaping
    /// `InvalidParams` error data at the protocol boundary).
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Empty { field }
            | Self::OutOfRange { field, .. }
            | Self::BadUrl { field, .. }
            | Self::Validation { field, .. } => Some(field),
            Self::NotFound { .. } | Self::Conflict { .. } | Self::Infrastructure { .. } => None,
        }
    }

    /// Whether this error stems from a bad/missing input reference rather
    /// than infrastructure failure - used to pick InvalidParams vs Internal.
    /// `Infrastructure` is deliberately excluded: it is never the caller's
    /// fault.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Empty { .. }
                | Self::OutOfRange { .. }
                | Self::BadUrl { .. }
                | Self::NotFound { .. }
                | Self::Conflict { .. }
                | Self::Validation { .. }
        )
    }
}
