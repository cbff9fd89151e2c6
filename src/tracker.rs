//! What the tracker card shows: who is signed in, the session phase, the
//! live elapsed time and the time tracked today.

use crate::session::clock::{Elapsed, ElapsedTimeClock};
use crate::session::phase::SessionPhase;
use crate::sync::store::TrackerState;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerLabel {
    pub name: Option<String>,
    pub phase: SessionPhase,
    pub session_id: Option<String>,
    pub elapsed: Option<String>,
    pub today: Option<String>,
}

impl fmt::Display for TrackerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.as_deref().unwrap_or("(signed out)"))?;
        write!(f, " [{}]", self.phase)?;
        if let Some(elapsed) = &self.elapsed {
            write!(f, " {}", elapsed)?;
        }
        if let Some(today) = &self.today {
            write!(f, " | today: {}", today)?;
        }
        Ok(())
    }
}

/// Build the label from a snapshot and the current clock reading.
pub fn render(state: &TrackerState, elapsed: Option<Elapsed>) -> TrackerLabel {
    TrackerLabel {
        name: state.user.as_ref().map(|user| user.name.clone()),
        phase: state.phase(),
        session_id: state.session.as_ref().map(|session| session.id.clone()),
        elapsed: elapsed.map(|elapsed| elapsed.to_string()),
        today: state.time_tracked_today(),
    }
}

/// Tracker card backed by a live [`ElapsedTimeClock`].
pub struct TrackerView {
    clock: ElapsedTimeClock,
}

impl TrackerView {
    pub fn new(tick: Duration) -> Self {
        Self::with_clock(ElapsedTimeClock::new(tick))
    }

    pub fn with_clock(clock: ElapsedTimeClock) -> Self {
        Self { clock }
    }

    /// Point the clock at the session in `state`. Idle unmounts it.
    pub fn sync(&mut self, state: &TrackerState) {
        self.clock.mount(state.clock_range());
    }

    pub fn label(&self, state: &TrackerState) -> TrackerLabel {
        render(state, self.clock.reading())
    }

    pub fn clock_updates(&self) -> watch::Receiver<Option<Elapsed>> {
        self.clock.subscribe()
    }

    pub fn is_ticking(&self) -> bool {
        self.clock.is_ticking()
    }
}
