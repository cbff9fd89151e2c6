//! The backend process the tracker delegates to.
//!
//! The backend owns every session rule; the client only asks it to start or
//! stop, reads snapshots back, and listens for sessions it ends on its own.

pub mod client;
pub mod models;

use crate::error::Result;
use async_trait::async_trait;
use models::{Session, User};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use client::HttpBackend;

/// Name of the push notification announcing that the active session ended.
pub const SESSION_ENDED_EVENT: &str = "SessionEnded";

#[async_trait]
pub trait Backend: Send + Sync + 'static {
    /// Start a session. `None` means the backend refused because one is
    /// already running.
    async fn start_session(&self) -> Result<Option<Session>>;

    /// Stop the active session. The acknowledgment carries no timing data.
    async fn stop_session(&self) -> Result<bool>;

    async fn get_session(&self) -> Result<Option<Session>>;

    async fn get_user(&self) -> Result<Option<User>>;

    /// Cumulative tracked seconds for the current day.
    async fn get_time_tracked_today(&self) -> Result<u64>;

    async fn subscribe_session_ended(&self) -> Result<Subscription>;
}

/// Live subscription to the "session ended" notification.
///
/// Dropping the subscription releases it. Releasing twice is a no-op.
#[derive(Debug)]
pub struct Subscription {
    events: mpsc::Receiver<()>,
    pump: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(events: mpsc::Receiver<()>) -> Self {
        Self { events, pump: None }
    }

    /// Subscription fed by a background task, aborted on release.
    pub fn with_pump(events: mpsc::Receiver<()>, pump: JoinHandle<()>) -> Self {
        Self {
            events,
            pump: Some(pump),
        }
    }

    /// Wait for the next notification. `None` once the source is gone.
    pub async fn recv(&mut self) -> Option<()> {
        self.events.recv().await
    }

    pub fn unsubscribe(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.events.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
