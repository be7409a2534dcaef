use std::fmt;
use std::io;

/// Result alias for calls that cross into the operating system.
pub type OsResult<T> = Result<T, OsError>;

/// Failure of an OS-level collaborator call.
///
/// Components convert these into `bool`/`Option` results at their own
/// boundary and log them; they never cross component boundaries as panics.
#[derive(Debug, thiserror::Error)]
pub enum OsError {
    /// An OS call returned an error code.
    #[error("{op} failed: {message}")]
    Call { op: &'static str, message: String },

    /// The window or process no longer exists.
    #[error("{what} no longer exists")]
    Gone { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Window management is not available on this platform.
    #[error("window management is not supported on this platform")]
    Unsupported,
}

impl OsError {
    /// Builds a [`OsError::Call`] from the failing operation and its cause.
    pub fn call(op: &'static str, cause: impl fmt::Display) -> Self {
        Self::Call {
            op,
            message: cause.to_string(),
        }
    }

    pub fn gone(what: impl fmt::Display) -> Self {
        Self::Gone {
            what: what.to_string(),
        }
    }
}
