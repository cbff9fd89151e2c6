use crate::backend::models::{Session, User};
use crate::backend::{Backend, Subscription};
use crate::error::{Result, SyncError};
use crate::session::machine::SessionStateMachine;
use crate::sync::store::{Store, Update};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Keeps the user, session and daily-total snapshots fresh.
///
/// Two independent background tasks feed the same [`Store`]: one reacts to
/// the backend's "session ended" notification, the other polls the daily
/// total on a fixed interval.
pub struct SyncController<B: Backend> {
    backend: Arc<B>,
    store: Store,
    poll_interval: Duration,
    resubscribe_delay: Duration,
}

const DEFAULT_RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);
const MAX_RESUBSCRIBE_DELAY: Duration = Duration::from_secs(60);

impl<B: Backend> SyncController<B> {
    pub fn new(backend: Arc<B>, poll_interval: Duration) -> Self {
        Self {
            backend,
            store: Store::new(),
            poll_interval,
            resubscribe_delay: DEFAULT_RESUBSCRIBE_DELAY,
        }
    }

    /// First wait before re-opening a closed "session ended" stream. Each
    /// failed attempt doubles it, up to one minute.
    pub fn with_resubscribe_delay(mut self, delay: Duration) -> Self {
        self.resubscribe_delay = delay.max(Duration::from_millis(1));
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn machine(&self) -> SessionStateMachine<B> {
        SessionStateMachine::new(Arc::clone(&self.backend), self.store.clone())
    }

    /// Fetch user and session once, concurrently.
    pub async fn refresh_snapshots(&self) -> Result<()> {
        let (user, session) = fetch_snapshots(self.backend.as_ref()).await?;
        self.store.apply(Update::Snapshots { user, session });
        Ok(())
    }

    pub async fn refresh_daily_total(&self) -> Result<u64> {
        let total = self.backend.get_time_tracked_today().await?;
        self.store.apply(Update::DailyTotal(total));
        Ok(total)
    }

    /// Load the initial snapshots and start both background tasks.
    ///
    /// Nothing is left running if any step fails.
    pub async fn initialize(&self) -> Result<SyncHandle> {
        if self.poll_interval.is_zero() {
            return Err(SyncError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        self.refresh_snapshots().await?;
        let subscription = self.backend.subscribe_session_ended().await?;

        let notifications = tokio::spawn(reconcile_on_session_ended(
            Arc::clone(&self.backend),
            self.store.clone(),
            subscription,
            self.resubscribe_delay,
        ));
        let poll = tokio::spawn(poll_daily_total(
            Arc::clone(&self.backend),
            self.store.clone(),
            self.poll_interval,
        ));

        info!(
            poll_interval_secs = self.poll_interval.as_secs_f64(),
            "Sync started"
        );

        Ok(SyncHandle {
            store: self.store.clone(),
            notifications: Some(notifications),
            poll: Some(poll),
        })
    }
}

async fn fetch_snapshots<B: Backend>(backend: &B) -> Result<(Option<User>, Option<Session>)> {
    tokio::try_join!(backend.get_user(), backend.get_session())
}

async fn refresh_into<B: Backend>(backend: &B, store: &Store, reason: &str) {
    match fetch_snapshots(backend).await {
        Ok((user, session)) => store.apply(Update::Snapshots { user, session }),
        Err(err) => warn!(error = %err, reason, "Failed to refresh snapshots"),
    }
}

/// Reconcile on every "session ended" notification for as long as the task
/// runs. A closed stream is re-opened with backoff, and the snapshots are
/// re-fetched afterwards since a notification may have been missed.
async fn reconcile_on_session_ended<B: Backend>(
    backend: Arc<B>,
    store: Store,
    mut subscription: Subscription,
    resubscribe_delay: Duration,
) {
    loop {
        while subscription.recv().await.is_some() {
            info!("Backend reported session ended");
            refresh_into(backend.as_ref(), &store, "session ended").await;
        }
        subscription.unsubscribe();
        warn!("Session-ended stream closed; resubscribing");

        subscription = resubscribe(backend.as_ref(), resubscribe_delay).await;
        refresh_into(backend.as_ref(), &store, "resubscribed").await;
    }
}

async fn resubscribe<B: Backend>(backend: &B, base: Duration) -> Subscription {
    let mut attempt = 0;
    loop {
        tokio::time::sleep(backoff(base, attempt)).await;
        match backend.subscribe_session_ended().await {
            Ok(subscription) => {
                info!(attempt = attempt + 1, "Resubscribed to session-ended stream");
                return subscription;
            }
            Err(err) => {
                warn!(error = %err, attempt = attempt + 1, "Failed to resubscribe");
                attempt += 1;
            }
        }
    }
}

/// `base * 2^attempt`, capped at [`MAX_RESUBSCRIBE_DELAY`].
fn backoff(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(2_u32.saturating_pow(attempt))
        .unwrap_or(MAX_RESUBSCRIBE_DELAY)
        .min(MAX_RESUBSCRIBE_DELAY)
}

async fn poll_daily_total<B: Backend>(backend: Arc<B>, store: Store, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        match backend.get_time_tracked_today().await {
            Ok(total) => {
                debug!(total_secs = total, "Daily total refreshed");
                store.apply(Update::DailyTotal(total));
            }
            Err(err) => warn!(error = %err, "Failed to refresh daily total"),
        }
    }
}

/// Owner of the running sync tasks.
///
/// [`SyncHandle::shutdown`] is the deactivation path: it waits for both tasks
/// to stop and then discards the snapshots. Dropping the handle without
/// calling it still cancels both tasks.
pub struct SyncHandle {
    store: Store,
    notifications: Option<JoinHandle<()>>,
    poll: Option<JoinHandle<()>>,
}

impl SyncHandle {
    pub fn is_running(&self) -> bool {
        [&self.notifications, &self.poll]
            .into_iter()
            .flatten()
            .any(|task| !task.is_finished())
    }

    pub async fn shutdown(mut self) {
        for task in self.take_tasks() {
            task.abort();
            // Cancellation is the expected outcome here.
            let _ = task.await;
        }
        self.store.apply(Update::Reset);
        debug!("Sync stopped");
    }

    fn take_tasks(&mut self) -> Vec<JoinHandle<()>> {
        [self.notifications.take(), self.poll.take()]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        for task in self.take_tasks() {
            task.abort();
        }
    }
}
