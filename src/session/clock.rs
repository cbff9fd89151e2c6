//! Live elapsed-time reading for the tracker label.

use crate::duration::compact_parts;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Whole hours and leftover minutes between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Elapsed {
    pub hour: u64,
    pub minute: u64,
}

impl Elapsed {
    pub const ZERO: Elapsed = Elapsed { hour: 0, minute: 0 };

    pub fn from_secs(secs: u64) -> Self {
        Self {
            hour: secs / 3600,
            minute: (secs % 3600) / 60,
        }
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&compact_parts(self.hour, self.minute))
    }
}

/// Elapsed time from `start` until `end`, or until `now` while still open.
///
/// A start in the future (client/backend clock skew) reads as zero.
pub fn compute_at(start: DateTime<Utc>, end: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Elapsed {
    let until = end.unwrap_or(now);
    let secs = (until - start).num_seconds().max(0);
    Elapsed::from_secs(secs as u64)
}

pub fn compute(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Elapsed {
    compute_at(start, end, Utc::now())
}

/// Interval the clock is mounted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockRange {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

pub type TimeSource = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Self-ticking elapsed reading.
///
/// While the mounted range is open the reading is recomputed once per tick;
/// a closed range is computed once. The clock owns its ticker task: mounting
/// a different range, unmounting, or dropping the clock cancels it.
pub struct ElapsedTimeClock {
    tick: Duration,
    now: TimeSource,
    range: Option<ClockRange>,
    reading: Arc<watch::Sender<Option<Elapsed>>>,
    ticker: Option<JoinHandle<()>>,
}

impl ElapsedTimeClock {
    pub fn new(tick: Duration) -> Self {
        Self::with_time_source(tick, Arc::new(Utc::now))
    }

    pub fn with_time_source(tick: Duration, now: TimeSource) -> Self {
        let (reading, _) = watch::channel(None);
        Self {
            // tokio intervals reject a zero period
            tick: tick.max(Duration::from_millis(1)),
            now,
            range: None,
            reading: Arc::new(reading),
            ticker: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Elapsed>> {
        self.reading.subscribe()
    }

    pub fn reading(&self) -> Option<Elapsed> {
        *self.reading.borrow()
    }

    pub fn range(&self) -> Option<ClockRange> {
        self.range
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|ticker| !ticker.is_finished())
    }

    /// Mount the clock on `range`. Re-mounting the same range keeps the
    /// running ticker; any other range replaces it.
    pub fn mount(&mut self, range: Option<ClockRange>) {
        if self.range == range {
            return;
        }
        self.cancel();
        self.range = range;

        let Some(range) = range else {
            self.reading.send_replace(None);
            return;
        };

        self.reading
            .send_replace(Some(compute_at(range.start, range.end, (self.now)())));

        if range.end.is_some() {
            return;
        }

        let reading = Arc::clone(&self.reading);
        let now = Arc::clone(&self.now);
        let tick = self.tick;
        debug!(start = %range.start, "Elapsed clock ticking");

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately; the mount already computed it.
            interval.tick().await;
            loop {
                interval.tick().await;
                let value = Some(compute_at(range.start, None, now()));
                reading.send_if_modified(|current| {
                    if *current == value {
                        return false;
                    }
                    *current = value;
                    true
                });
            }
        }));
    }

    pub fn unmount(&mut self) {
        self.mount(None);
    }

    fn cancel(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for ElapsedTimeClock {
    fn drop(&mut self) {
        self.cancel();
    }
}
