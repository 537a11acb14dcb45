//! Common result and error types for the tessera compiler.

/// The standard result type for operations that can only fail on a bug.
///
/// `Err` indicates a broken internal invariant (for example a registry hash
/// that no longer decodes), not a problem with the user's styles. Style
/// problems such as unknown recipes are ignored and never surface here.
pub type TesseraResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in tessera, not a user input problem.
#[derive(Debug, thiserror::Error)]
#[error("internal compiler error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
