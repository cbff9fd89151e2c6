#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use timecard_sync::backend::models::{Session, User};
use timecard_sync::backend::{Backend, Subscription};
use timecard_sync::error::{Result, SyncError};
use timecard_sync::sync::{Store, TrackerState};
use tokio::sync::{Semaphore, mpsc};

#[derive(Default)]
pub struct Failures {
    pub start: bool,
    pub stop: bool,
    pub get_session: bool,
    pub get_user: bool,
    pub daily_total: bool,
    pub subscribe: bool,
}

#[derive(Default)]
struct Inner {
    user: Option<User>,
    session: Option<Session>,
    daily_total: u64,
    failures: Failures,
    notifier: Option<mpsc::Sender<()>>,
    daily_gate: Option<Arc<Semaphore>>,
    next_id: usize,
}

/// In-memory backend that owns session rules the way the real one does.
#[derive(Default)]
pub struct MockBackend {
    inner: Mutex<Inner>,
    pub start_calls: AtomicUsize,
    pub stop_calls: AtomicUsize,
    pub session_fetches: AtomicUsize,
    pub user_fetches: AtomicUsize,
    pub daily_fetches: AtomicUsize,
    pub subscribe_calls: AtomicUsize,
}

pub fn user(name: &str) -> User {
    User {
        name: name.to_string(),
        token: "jwt-token".to_string(),
    }
}

pub fn active_session(id: &str, minutes_ago: i64) -> Session {
    Session {
        id: id.to_string(),
        started_at: Utc::now() - ChronoDuration::minutes(minutes_ago),
        ended_at: None,
    }
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_user(self: Arc<Self>, user: User) -> Arc<Self> {
        self.inner.lock().unwrap().user = Some(user);
        self
    }

    pub fn with_session(self: Arc<Self>, session: Session) -> Arc<Self> {
        self.inner.lock().unwrap().session = Some(session);
        self
    }

    pub fn set_daily_total(&self, secs: u64) {
        self.inner.lock().unwrap().daily_total = secs;
    }

    pub fn fail(&self, set: impl FnOnce(&mut Failures)) {
        set(&mut self.inner.lock().unwrap().failures);
    }

    /// Hold daily-total fetches until permits are added to the returned gate.
    pub fn gate_daily_total(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.inner.lock().unwrap().daily_gate = Some(Arc::clone(&gate));
        gate
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.lock().unwrap().session.clone()
    }

    /// End the active session on the backend side and push the notification.
    pub async fn end_session_remotely(&self) -> bool {
        let notifier = {
            let mut inner = self.inner.lock().unwrap();
            if let Some(session) = inner.session.as_mut() {
                session.ended_at.get_or_insert_with(Utc::now);
            }
            inner.notifier.clone()
        };
        match notifier {
            Some(tx) => tx.send(()).await.is_ok(),
            None => false,
        }
    }

    /// Drop the push stream from the backend side, as a restart would.
    pub fn close_stream(&self) {
        self.inner.lock().unwrap().notifier = None;
    }

    pub fn notifier_closed(&self) -> bool {
        self.inner
            .lock()
            .unwrap()
            .notifier
            .as_ref()
            .map(|tx| tx.is_closed())
            .unwrap_or(true)
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn start_session(&self) -> Result<Option<Session>> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        if inner.failures.start {
            return Err(SyncError::Transport("start unavailable".to_string()));
        }
        if inner.session.as_ref().is_some_and(Session::is_active) {
            return Ok(None);
        }
        inner.next_id += 1;
        let session = Session {
            id: format!("sess-{}", inner.next_id),
            started_at: Utc::now(),
            ended_at: None,
        };
        inner.session = Some(session.clone());
        Ok(Some(session))
    }

    async fn stop_session(&self) -> Result<bool> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        if inner.failures.stop {
            return Err(SyncError::Transport("stop unavailable".to_string()));
        }
        match inner.session.as_mut() {
            Some(session) if session.is_active() => {
                session.ended_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_session(&self) -> Result<Option<Session>> {
        self.session_fetches.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.lock().unwrap();
        if inner.failures.get_session {
            return Err(SyncError::Transport("session unavailable".to_string()));
        }
        Ok(inner.session.clone())
    }

    async fn get_user(&self) -> Result<Option<User>> {
        self.user_fetches.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.lock().unwrap();
        if inner.failures.get_user {
            return Err(SyncError::Transport("user unavailable".to_string()));
        }
        Ok(inner.user.clone())
    }

    async fn get_time_tracked_today(&self) -> Result<u64> {
        self.daily_fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.inner.lock().unwrap().daily_gate.clone();
        if let Some(gate) = gate {
            gate.acquire()
                .await
                .map_err(|err| SyncError::Transport(err.to_string()))?
                .forget();
        }
        let inner = self.inner.lock().unwrap();
        if inner.failures.daily_total {
            return Err(SyncError::Transport("daily total unavailable".to_string()));
        }
        Ok(inner.daily_total)
    }

    async fn subscribe_session_ended(&self) -> Result<Subscription> {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        if inner.failures.subscribe {
            return Err(SyncError::Transport("event stream unavailable".to_string()));
        }
        let (tx, rx) = mpsc::channel(8);
        inner.notifier = Some(tx);
        Ok(Subscription::new(rx))
    }
}

/// Poll `check` until it holds, failing after a few seconds.
pub async fn eventually(what: &str, check: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {}", what));
}

/// Wait until the store satisfies `pred`, failing after a few seconds.
pub async fn wait_for<F>(store: &Store, pred: F) -> TrackerState
where
    F: Fn(&TrackerState) -> bool,
{
    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let state = rx.borrow_and_update();
                if pred(&*state) {
                    return state.clone();
                }
            }
            rx.changed().await.expect("store dropped");
        }
    })
    .await
    .expect("store never reached the expected state")
}
