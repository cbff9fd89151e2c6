use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One continuous tracked work interval, as owned by the backend.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// The signed-in user. Replaced wholesale on every fetch.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub token: String,
}
