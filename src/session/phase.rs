use crate::backend::models::Session;
use serde::Serialize;
use std::fmt;

/// Client-side classification of the latest session snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Active,
    Ended,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Active => "active",
            SessionPhase::Ended => "ended",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The only place phase is decided.
pub fn derive_phase(session: Option<&Session>) -> SessionPhase {
    match session {
        None => SessionPhase::Idle,
        Some(session) if session.ended_at.is_none() => SessionPhase::Active,
        Some(_) => SessionPhase::Ended,
    }
}
