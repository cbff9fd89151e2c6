use thiserror::Error;

/// Failures surfaced by the sync core to its caller.
///
/// Negative elapsed time (clock skew between client and backend) is not an
/// error: it is clamped to zero where the elapsed time is computed.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The backend call could not complete.
    #[error("backend request failed: {0}")]
    Transport(String),

    /// The requested transition does not apply to the current session.
    #[error("session state conflict: {0}")]
    StateConflict(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    pub fn is_transport(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }

    pub fn is_state_conflict(&self) -> bool {
        matches!(self, SyncError::StateConflict(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
