//! Error types for the screening workflow.
//!
//! Session and controller operations return `Result<T, AppError>`. None of
//! these are fatal: a rejected transition leaves the state untouched and the
//! caller decides whether to surface a message.

use std::path::PathBuf;

/// Result alias used by the library-style modules.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    /// An operation was attempted in a state that forbids it.
    #[error("Invalid state: cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// Analysis operations require a logged-in controller.
    #[error("Not authenticated: log in or sign up first")]
    NotAuthenticated,

    /// The auth collaborator rejected the credentials.
    #[error("Authentication rejected: all fields are required")]
    AuthRejected,

    /// The selected image could not be read.
    #[error("Failed to read image {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The selected image file contains no data.
    #[error("Image file is empty: {}", .0.display())]
    EmptyImage(PathBuf),

    /// The simulator event channel closed while a run was in flight.
    #[error("Analysis session closed unexpectedly")]
    SessionClosed,
}

impl AppError {
    /// Returns true for rejected state transitions.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, AppError::InvalidState { .. })
    }
}
