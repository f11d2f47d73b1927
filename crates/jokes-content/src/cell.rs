use std::sync::Arc;

use jokes_core::config::JOKE_KEY;
use jokes_core::{InstanceSnapshot, RefreshTrigger};
use jokes_store::KeyValueStore;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::FetchError;
use crate::source::JokeSource;

/// Result of one background fetch, delivered back to the control task.
#[derive(Debug)]
pub struct FetchCompletion {
    /// UUIDv7 so fetch start order is visible in logs.
    pub id: Uuid,
    pub trigger: RefreshTrigger,
    pub result: Result<String, FetchError>,
}

/// Holds the one joke currently on screen.
///
/// States: EMPTY until the first successful fetch or restore, LOADED after.
/// A failed fetch never moves the cell back to EMPTY.
///
/// The cell itself is only touched from the control task. [`ContentCell::refresh`]
/// spawns the network call and the outcome comes back as a [`FetchCompletion`]
/// which the control task hands to [`ContentCell::apply`].
pub struct ContentCell {
    source: Arc<dyn JokeSource>,
    store: Arc<dyn KeyValueStore>,
    fallback: String,
    current: Option<String>,
    display: watch::Sender<String>,
    completions: mpsc::Sender<FetchCompletion>,
}

impl ContentCell {
    pub fn new(
        source: Arc<dyn JokeSource>,
        store: Arc<dyn KeyValueStore>,
        fallback: impl Into<String>,
        completions: mpsc::Sender<FetchCompletion>,
    ) -> Self {
        let fallback = fallback.into();
        let (display, _) = watch::channel(fallback.clone());
        Self {
            source,
            store,
            fallback,
            current: None,
            display,
            completions,
        }
    }

    /// Receiver for the display sink. Always holds the text to show.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.display.subscribe()
    }

    /// Produce the text to show at startup.
    ///
    /// Lookup order: in-memory value, `snapshot`, preference store, network.
    /// Never fails: a failed fetch yields the fallback message and writes
    /// nothing to the store.
    pub async fn load(&mut self, snapshot: Option<&InstanceSnapshot>) -> String {
        if let Some(joke) = &self.current {
            return joke.clone();
        }

        if let Some(joke) = snapshot.and_then(|s| s.joke()).filter(|j| !j.is_empty()) {
            debug!("joke restored from instance snapshot");
            self.show(joke.to_string());
            return joke.to_string();
        }

        match self.store.get(JOKE_KEY) {
            Ok(Some(joke)) if !joke.is_empty() => {
                debug!("joke restored from store");
                self.show(joke.clone());
                return joke;
            }
            Ok(_) => {}
            Err(e) => warn!("joke restore failed, treating as empty: {e}"),
        }

        let id = Uuid::now_v7();
        let trigger = RefreshTrigger::Startup;
        info!(fetch_id = %id, %trigger, source = self.source.name(), "no saved joke, fetching");
        match self.source.fetch().await {
            Ok(joke) => {
                self.commit(joke.clone());
                joke
            }
            Err(e) => {
                warn!(fetch_id = %id, %trigger, "fetch failed, showing fallback: {e}");
                self.display.send_replace(self.fallback.clone());
                self.fallback.clone()
            }
        }
    }

    /// Start a background fetch. Returns immediately with the fetch id.
    ///
    /// Nothing is cancelled: overlapping refreshes all run to completion and
    /// the one that completes last wins when applied. A joke that lands after
    /// the control task is gone is still persisted, so the next launch sees it.
    pub fn refresh(&self, trigger: RefreshTrigger) -> Uuid {
        let id = Uuid::now_v7();
        let source = Arc::clone(&self.source);
        let store = Arc::clone(&self.store);
        let tx = self.completions.clone();
        debug!(fetch_id = %id, %trigger, "refresh requested");

        tokio::spawn(async move {
            let result = source.fetch().await;
            let completion = FetchCompletion {
                id,
                trigger,
                result,
            };
            if let Err(mpsc::error::SendError(undelivered)) = tx.send(completion).await {
                persist_undelivered(store.as_ref(), undelivered);
            }
        });
        id
    }

    /// Apply a finished fetch. Returns `true` when the joke changed.
    pub fn apply(&mut self, completion: FetchCompletion) -> bool {
        let FetchCompletion {
            id,
            trigger,
            result,
        } = completion;
        match result {
            Ok(joke) => {
                info!(fetch_id = %id, %trigger, "joke refreshed");
                self.commit(joke);
                true
            }
            Err(e) => {
                warn!(fetch_id = %id, %trigger, "refresh failed, keeping previous joke: {e}");
                false
            }
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    pub fn display_text(&self) -> &str {
        self.current.as_deref().unwrap_or(&self.fallback)
    }

    pub fn snapshot(&self) -> InstanceSnapshot {
        InstanceSnapshot::new(self.current.clone())
    }

    /// New joke from the network: remember, persist, show.
    fn commit(&mut self, joke: String) {
        if let Err(e) = self.store.set(JOKE_KEY, &joke) {
            warn!("failed to persist joke: {e}");
        }
        self.show(joke);
    }

    /// Restored joke: remember and show, no write.
    fn show(&mut self, joke: String) {
        self.current = Some(joke.clone());
        self.display.send_replace(joke);
    }
}

/// Completion with no control task left to apply it. Only the store sees it.
fn persist_undelivered(store: &dyn KeyValueStore, completion: FetchCompletion) {
    let FetchCompletion { id, trigger, result } = completion;
    match result {
        Ok(joke) => match store.set(JOKE_KEY, &joke) {
            Ok(()) => info!(fetch_id = %id, %trigger, "control task gone, joke persisted"),
            Err(e) => warn!(fetch_id = %id, %trigger, "failed to persist late joke: {e}"),
        },
        Err(e) => debug!(fetch_id = %id, %trigger, "control task gone, failed fetch dropped: {e}"),
    }
}
