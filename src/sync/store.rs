use crate::backend::models::{Session, User};
use crate::duration::format_relative;
use crate::session::clock::ClockRange;
use crate::session::phase::{SessionPhase, derive_phase};
use std::sync::Arc;
use tokio::sync::watch;

/// Latest backend snapshots held by the client.
///
/// Every field is replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerState {
    pub user: Option<User>,
    pub session: Option<Session>,
    pub daily_total: Option<u64>,
}

/// Completed fetch results fed into the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    User(Option<User>),
    Session(Option<Session>),
    Snapshots {
        user: Option<User>,
        session: Option<Session>,
    },
    DailyTotal(u64),
    Reset,
}

impl TrackerState {
    pub fn apply(&mut self, update: Update) {
        match update {
            Update::User(user) => self.user = user,
            Update::Session(session) => self.session = session,
            Update::Snapshots { user, session } => {
                self.user = user;
                self.session = session;
            }
            Update::DailyTotal(total) => self.daily_total = Some(total),
            Update::Reset => *self = TrackerState::default(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        derive_phase(self.session.as_ref())
    }

    /// Range the elapsed clock should show, if any.
    pub fn clock_range(&self) -> Option<ClockRange> {
        self.session.as_ref().map(|session| ClockRange {
            start: session.started_at,
            end: session.ended_at,
        })
    }

    pub fn time_tracked_today(&self) -> Option<String> {
        self.daily_total.map(format_relative)
    }
}

/// Single writer-visible slot for [`TrackerState`].
///
/// Updates are applied in the order their fetches complete; the last one
/// to complete wins for the fields it carries.
#[derive(Debug, Clone)]
pub struct Store {
    tx: Arc<watch::Sender<TrackerState>>,
}

impl Store {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(TrackerState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn apply(&self, update: Update) {
        self.tx.send_modify(|state| state.apply(update));
    }

    pub fn snapshot(&self) -> TrackerState {
        self.tx.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.tx.borrow().phase()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.tx.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
