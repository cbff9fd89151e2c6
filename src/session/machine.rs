use crate::backend::Backend;
use crate::backend::models::Session;
use crate::error::{Result, SyncError};
use crate::session::phase::SessionPhase;
use crate::sync::store::{Store, Update};
use std::sync::Arc;
use tracing::info;

/// Requests session transitions from the backend and adopts its answer.
///
/// Nothing is applied optimistically: on any failure the local snapshot,
/// and therefore the phase, stays exactly as it was.
pub struct SessionStateMachine<B: Backend> {
    backend: Arc<B>,
    store: Store,
}

impl<B: Backend> Clone for SessionStateMachine<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            store: self.store.clone(),
        }
    }
}

impl<B: Backend> SessionStateMachine<B> {
    pub fn new(backend: Arc<B>, store: Store) -> Self {
        Self { backend, store }
    }

    pub fn phase(&self) -> SessionPhase {
        self.store.phase()
    }

    /// Start a session and adopt the backend's record as the new snapshot.
    pub async fn request_start(&self) -> Result<Session> {
        if self.phase() == SessionPhase::Active {
            return Err(SyncError::StateConflict(
                "a session is already active".to_string(),
            ));
        }

        let session = self.backend.start_session().await?.ok_or_else(|| {
            SyncError::StateConflict("backend already has an active session".to_string())
        })?;

        info!(session_id = %session.id, started_at = %session.started_at, "Session started");
        self.store.apply(Update::Session(Some(session.clone())));
        Ok(session)
    }

    /// Stop the active session, then re-fetch it to learn when it ended.
    pub async fn request_stop(&self) -> Result<Option<Session>> {
        if self.phase() != SessionPhase::Active {
            return Err(SyncError::StateConflict(
                "no active session to stop".to_string(),
            ));
        }

        if !self.backend.stop_session().await? {
            return Err(SyncError::StateConflict(
                "backend declined to stop the session".to_string(),
            ));
        }

        let session = self.backend.get_session().await?;
        info!(
            session_id = session.as_ref().map(|s| s.id.as_str()).unwrap_or("-"),
            "Session stopped"
        );
        self.store.apply(Update::Session(session.clone()));
        Ok(session)
    }
}
