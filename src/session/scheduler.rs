//! Debounced document saves.
//!
//! A save request stores the newest document and arms a one-shot timer.
//! Requests arriving while the timer is armed only replace the stored
//! document, so a burst of mutations costs one write. Immediate saves
//! cancel the timer and write synchronously. Writes never overlap.

use super::{SessionStore, SidebarDocument};
use anyhow::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Sink for collected documents.
pub trait DocumentSaver: Send + Sync {
    fn save_document(&self, document: &SidebarDocument) -> Result<()>;
}

impl DocumentSaver for SessionStore {
    fn save_document(&self, document: &SidebarDocument) -> Result<()> {
        self.write(document)
    }
}

type Action = Arc<dyn Fn() + Send + Sync>;

/// One-shot timer that coalesces arms.
///
/// Outside a tokio runtime `arm` runs the action inline.
pub struct DeferredTask {
    delay: Duration,
    action: Action,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for DeferredTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredTask")
            .field("delay", &self.delay)
            .field("armed", &self.is_armed())
            .finish()
    }
}

impl DeferredTask {
    pub fn new(delay: Duration, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            delay,
            action: Arc::new(action),
            handle: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_armed(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start the timer unless it is already running.
    pub fn arm(&self) {
        let mut slot = self.handle.lock();
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let action = Arc::clone(&self.action);
                let delay = self.delay;
                *slot = Some(runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Err(e) = tokio::task::spawn_blocking(move || action()).await {
                        log::error!("Deferred task failed: {}", e);
                    }
                }));
            }
            Err(_) => {
                drop(slot);
                (self.action)();
            }
        }
    }

    /// Cancel a running timer. Returns whether one was armed.
    pub fn disarm(&self) -> bool {
        match self.handle.lock().take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Run the action now if the timer was armed.
    pub fn finalize(&self) {
        if self.disarm() {
            (self.action)();
        }
    }
}

impl Drop for DeferredTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

/// Newest requested document, stamped with a generation.
#[derive(Debug, Default)]
struct Pending {
    next_generation: u64,
    document: Option<(u64, SidebarDocument)>,
}

/// State shared between callers and the timer's write.
struct Shared {
    saver: Arc<dyn DocumentSaver>,
    pending: Mutex<Pending>,
    /// Held for the whole write; holds the generation last written
    written: Mutex<u64>,
}

/// Coalescing writer for the canonical document.
///
/// Only one write runs at a time. A write that was already in progress when
/// an immediate save arrived finishes first, and a document older than the
/// last one written is never written.
pub struct SaveScheduler {
    shared: Arc<Shared>,
    task: DeferredTask,
}

impl std::fmt::Debug for SaveScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveScheduler")
            .field("pending", &self.has_pending())
            .field("task", &self.task)
            .finish()
    }
}

impl SaveScheduler {
    pub fn new(saver: Arc<dyn DocumentSaver>, debounce: Duration) -> Self {
        let shared = Arc::new(Shared {
            saver,
            pending: Mutex::new(Pending::default()),
            written: Mutex::new(0),
        });
        let task = {
            let shared = Arc::clone(&shared);
            DeferredTask::new(debounce, move || {
                if let Err(e) = shared.flush() {
                    log::error!("Failed to save sidebar document: {:#}", e);
                }
            })
        };
        Self { shared, task }
    }

    /// Record `document` as the next state to write.
    pub fn save(&self, document: SidebarDocument, immediate: bool) -> Result<()> {
        {
            let mut pending = self.shared.pending.lock();
            pending.next_generation += 1;
            pending.document = Some((pending.next_generation, document));
        }
        if immediate {
            self.flush_now()
        } else {
            self.task.arm();
            Ok(())
        }
    }

    /// Write the pending document, if any, right now.
    ///
    /// Waits for a debounced write that is already running.
    pub fn flush_now(&self) -> Result<()> {
        self.task.disarm();
        self.shared.flush()
    }

    pub fn has_pending(&self) -> bool {
        self.shared.pending.lock().document.is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.task.is_armed()
    }
}

impl Shared {
    fn flush(&self) -> Result<()> {
        let mut written = self.written.lock();
        let Some((generation, document)) = self.pending.lock().document.take() else {
            return Ok(());
        };
        if generation <= *written {
            log::debug!("Skipping stale sidebar document (generation {})", generation);
            return Ok(());
        }

        match self.saver.save_document(&document) {
            Ok(()) => {
                *written = generation;
                Ok(())
            }
            Err(e) => {
                // Keep the document for the next flush unless a newer one arrived
                let mut pending = self.pending.lock();
                if pending.document.is_none() {
                    pending.document = Some((generation, document));
                }
                Err(e)
            }
        }
    }
}
