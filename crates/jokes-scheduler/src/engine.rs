use std::sync::{Arc, Mutex};
use std::time::Duration;

use jokes_core::config::TIMER_KEY;
use jokes_store::KeyValueStore;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::countdown::{duration_ms, Countdown, TickOutcome};
use crate::error::{Result, SchedulerError};

/// Read the persisted countdown, falling back to the full `interval`.
///
/// Missing, corrupt or negative values and store read failures all yield
/// `interval`; the scheduler always starts. Values above `interval` are
/// clamped.
pub fn restore_remaining(store: &dyn KeyValueStore, interval: Duration) -> Duration {
    match store.get_u64(TIMER_KEY) {
        Ok(Some(ms)) => {
            let restored = Duration::from_millis(ms).min(interval);
            debug!(remaining_ms = ms, "countdown restored from store");
            restored
        }
        Ok(None) => interval,
        Err(e) => {
            warn!("countdown restore failed, using full interval: {e}");
            interval
        }
    }
}

/// Countdown-refresh scheduler.
///
/// Owns the countdown and one tokio task that wakes every `tick`. When the
/// countdown crosses zero the `on_expire` callback fires once and the
/// countdown resets to the full interval. [`Scheduler::stop`] cancels future
/// wakeups and persists the remaining value under [`TIMER_KEY`].
pub struct Scheduler {
    store: Arc<dyn KeyValueStore>,
    interval: Duration,
    countdown: Option<Arc<Mutex<Countdown>>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(store: Arc<dyn KeyValueStore>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(SchedulerError::InvalidInterval(interval));
        }
        Ok(Self {
            store,
            interval,
            countdown: None,
            cancel: CancellationToken::new(),
            task: None,
        })
    }

    /// Begin the wakeup loop. The first wakeup happens after `tick`.
    ///
    /// `on_expire` runs on the tick task and must not block; hand work off
    /// (e.g. `try_send` on a channel) instead.
    pub fn start<F>(
        &mut self,
        initial_remaining: Duration,
        tick: Duration,
        mut on_expire: F,
    ) -> Result<()>
    where
        F: FnMut() + Send + 'static,
    {
        if self.task.is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        let countdown = Arc::new(Mutex::new(Countdown::new(
            initial_remaining,
            self.interval,
            tick,
        )?));
        self.cancel = CancellationToken::new();
        self.countdown = Some(Arc::clone(&countdown));

        let cancel = self.cancel.clone();
        info!(
            remaining_ms = duration_ms(initial_remaining),
            tick_ms = duration_ms(tick),
            interval_ms = duration_ms(self.interval),
            "scheduler started"
        );

        self.task = Some(tokio::spawn(async move {
            let mut wakeups = interval_at(Instant::now() + tick, tick);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = wakeups.tick() => {
                        // Lock is released before the callback runs.
                        let outcome = match countdown.lock() {
                            Ok(mut cd) => cd.tick(),
                            Err(_) => {
                                warn!("countdown lock poisoned, stopping tick loop");
                                break;
                            }
                        };
                        if outcome == TickOutcome::Expired {
                            info!("countdown expired");
                            on_expire();
                        }
                    }
                }
            }
            debug!("tick loop exited");
        }));
        Ok(())
    }

    /// Restore the countdown from the store and start ticking.
    pub fn resume<F>(&mut self, tick: Duration, on_expire: F) -> Result<()>
    where
        F: FnMut() + Send + 'static,
    {
        let remaining = restore_remaining(self.store.as_ref(), self.interval);
        self.start(remaining, tick, on_expire)
    }

    /// Current in-memory countdown. Full interval when never started.
    pub fn remaining(&self) -> Duration {
        self.countdown
            .as_ref()
            .and_then(|cd| cd.lock().ok().map(|cd| cd.remaining()))
            .unwrap_or(self.interval)
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Cancel pending wakeups and persist the remaining countdown.
    ///
    /// The second and later calls do nothing. A failed write is logged and
    /// swallowed; the next launch simply starts from the full interval.
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        self.cancel.cancel();
        // Wait so no tick can slip in between the read and the write below.
        if let Err(e) = task.await {
            warn!("tick loop ended abnormally: {e}");
        }

        let remaining_ms = self
            .countdown
            .as_ref()
            .and_then(|cd| cd.lock().ok().map(|cd| cd.remaining_ms()));
        let Some(remaining_ms) = remaining_ms else {
            warn!("countdown unavailable, nothing persisted");
            return;
        };

        match self.store.set_u64(TIMER_KEY, remaining_ms) {
            Ok(()) => info!(remaining_ms, "scheduler stopped, countdown persisted"),
            Err(e) => warn!(remaining_ms, "failed to persist countdown: {e}"),
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
