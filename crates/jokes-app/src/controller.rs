use std::sync::Arc;
use std::time::Duration;

use jokes_content::{ContentCell, FetchCompletion, JokeSource};
use jokes_core::{InstanceSnapshot, JokesConfig, RefreshTrigger};
use jokes_scheduler::{duration_ms, Scheduler};
use jokes_store::KeyValueStore;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::terminal::{self, Command};

/// Why [`Controller::drive`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Transient interruption: rebuild from a snapshot.
    Reload,
    Quit,
}

/// Root controller. Owns the scheduler and the content cell for one
/// lifetime (create → drive → teardown); nothing outlives it except the
/// preference store and, across a reload, the returned snapshot.
pub struct Controller {
    cell: ContentCell,
    scheduler: Scheduler,
    tick: Duration,
    completions: mpsc::Receiver<FetchCompletion>,
    expiries: mpsc::Receiver<()>,
}

impl Controller {
    /// Restore content and countdown, then start ticking.
    pub async fn create(
        config: &JokesConfig,
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn JokeSource>,
        snapshot: Option<InstanceSnapshot>,
    ) -> anyhow::Result<Self> {
        let (completion_tx, completions) = mpsc::channel(16);
        let mut cell = ContentCell::new(
            source,
            Arc::clone(&store),
            config.display.fallback_message.clone(),
            completion_tx,
        );
        cell.load(snapshot.as_ref()).await;

        let (expiry_tx, expiries) = mpsc::channel(8);
        let mut scheduler = Scheduler::new(store, config.timer.interval())?;
        scheduler.resume(config.timer.tick(), move || {
            // try_send never blocks the tick task
            if expiry_tx.try_send(()).is_err() {
                warn!("expiry channel full or closed, refresh skipped");
            }
        })?;

        info!(
            remaining_ms = duration_ms(scheduler.remaining()),
            loaded = cell.is_loaded(),
            "controller ready"
        );

        Ok(Self {
            cell,
            scheduler,
            tick: config.timer.tick(),
            completions,
            expiries,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.cell.subscribe()
    }

    pub fn cell(&self) -> &ContentCell {
        &self.cell
    }

    pub fn remaining(&self) -> Duration {
        self.scheduler.remaining()
    }

    /// Manual refresh. The countdown keeps running untouched.
    pub fn refresh_now(&self) {
        self.cell.refresh(RefreshTrigger::Manual);
    }

    /// Event loop for this lifetime. All state changes happen here.
    pub async fn drive(&mut self, commands: &mut mpsc::Receiver<Command>) -> Exit {
        loop {
            tokio::select! {
                Some(()) = self.expiries.recv() => {
                    self.cell.refresh(RefreshTrigger::Scheduled);
                }
                Some(done) = self.completions.recv() => {
                    self.cell.apply(done);
                }
                cmd = commands.recv() => match cmd {
                    Some(Command::NewJoke) => self.refresh_now(),
                    Some(Command::Status) => self.log_status(),
                    Some(Command::Reload) => return Exit::Reload,
                    Some(Command::Quit) | None => return Exit::Quit,
                },
            }
        }
    }

    /// Stop the scheduler (persisting the countdown) and hand back the
    /// in-memory snapshot. In-flight fetches keep running; a joke that lands
    /// afterwards goes straight to the store.
    pub async fn teardown(mut self) -> InstanceSnapshot {
        self.scheduler.stop().await;
        self.cell.snapshot()
    }

    fn log_status(&self) {
        info!(
            remaining_ms = duration_ms(self.remaining()),
            tick_ms = duration_ms(self.tick),
            loaded = self.cell().is_loaded(),
            "status"
        );
    }
}

/// Application lifecycle: create, drive until reload or quit, tear down.
///
/// A reload carries the content snapshot into the next controller; a quit
/// ends the process after the countdown is persisted.
pub async fn run(
    config: JokesConfig,
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn JokeSource>,
    mut commands: mpsc::Receiver<Command>,
) -> anyhow::Result<()> {
    let mut snapshot = None;
    loop {
        let mut controller = Controller::create(
            &config,
            Arc::clone(&store),
            Arc::clone(&source),
            snapshot.take(),
        )
        .await?;
        let printer = tokio::spawn(terminal::print_display(controller.subscribe()));

        let exit = controller.drive(&mut commands).await;
        let snap = controller.teardown().await;
        // display channel closed with the cell; let the printer finish
        let _ = printer.await;

        match exit {
            Exit::Reload => {
                info!("reloading controller from snapshot");
                snapshot = Some(snap);
            }
            Exit::Quit => {
                info!("shutting down");
                return Ok(());
            }
        }
    }
}
