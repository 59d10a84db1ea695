//! Cross-window sidebar manager.
//!
//! `WindowSyncManager` owns every window's item tree and wires the event
//! mirror, content transfers, the persistence engine and sync merging
//! together. Hosts report mutations through [`WindowSyncManager::on_mutation`]
//! and let [`WindowSyncManager::drain`] replay them.
//!
//! The implementation is split across sub-modules:
//! - `window_lifecycle`: window open, restore and coordinated close
//! - `mirroring`: admission and draining of mirrored mutations
//! - `content`: live content handoff between windows
//! - `persistence`: snapshot collection and saves
//! - `sync_actions`: external sync payloads and workspace propagation

mod content;
mod mirroring;
mod persistence;
mod sync_actions;
mod window_lifecycle;

pub use content::ContentOutcome;

use crate::mirror::{EventMirror, MirrorSettings};
use crate::model::ItemId;
use crate::session::{
    BackupPolicy, BackupRotator, ChangeNotifier, DocumentSource, NotifyingSaver, RotationTimer,
    SaveScheduler, SessionPaths, SessionStore, SidebarDocument,
};
use crate::sync::SyncMerge;
use crate::transfer::{CompanionSignal, CompanionWait, ContentId};
use crate::window::{ItemRegistry, WindowHandle, WindowId, WindowRegistry, WindowState};
use anyhow::Result;
use sidebar_sync_config::{Config, Preferences, keys};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{oneshot, watch};

/// Coordinates every window's sidebar and the canonical session document
pub struct WindowSyncManager {
    /// Per-window state indexed by window ID
    pub(crate) windows: HashMap<WindowId, WindowState>,
    /// Eligibility and focus order
    pub(crate) registry: WindowRegistry,
    /// `(window, item)` to handle lookup
    pub(crate) items: ItemRegistry,
    pub(crate) mirror: EventMirror,
    pub(crate) settings: MirrorSettings,
    /// Whether unsynced windows receive items on restore
    restore_unsynced: bool,
    /// Last collected (or loaded, or merged) canonical document
    pub(crate) document: SidebarDocument,
    pub(crate) sync: SyncMerge,
    /// Items closed this session; never carried forward again
    pub(crate) deleted: HashSet<ItemId>,
    store: Arc<SessionStore>,
    scheduler: SaveScheduler,
    rotation: RotationTimer,
    /// Raised by the scheduler after each successful write
    notifier: Arc<ChangeNotifier>,
    /// Pending companion signals of closing windows
    pub(crate) companions: HashMap<(WindowId, ItemId), oneshot::Receiver<()>>,
    pub(crate) companion_wait: CompanionWait,
    next_window_id: u64,
    pub(crate) next_content_id: ContentId,
    /// No usable document existed at startup
    first_run: bool,
    loaded_from: Option<DocumentSource>,
}

impl std::fmt::Debug for WindowSyncManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowSyncManager")
            .field("windows", &self.windows.len())
            .field("settings", &self.settings)
            .field("first_run", &self.first_run)
            .field("loaded_from", &self.loaded_from)
            .finish_non_exhaustive()
    }
}

impl WindowSyncManager {
    /// Create a manager storing its session under the configured directory.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_store(config, SessionStore::new(SessionPaths::from_config(config)))
    }

    /// Create a manager on an explicit store and load the canonical document.
    pub fn with_store(config: &Config, store: SessionStore) -> Result<Self> {
        let prefs: &dyn Preferences = config;
        let settings = MirrorSettings {
            enabled: prefs.bool_or(keys::WINDOW_SYNC_ENABLED, true),
            only_pinned: prefs.bool_or(keys::SYNC_ONLY_PINNED_TABS, false),
        };

        let (document, loaded_from) = match store.read()? {
            Some(loaded) => {
                log::info!("Loaded sidebar document from {}", loaded.source);
                (loaded.document, Some(loaded.source))
            }
            None => {
                log::info!("No sidebar document found, starting fresh");
                (SidebarDocument::default(), None)
            }
        };

        let store = Arc::new(store);
        let notifier = Arc::new(ChangeNotifier::new());
        let saver = NotifyingSaver::new(store.clone(), notifier.clone());
        let scheduler = SaveScheduler::new(Arc::new(saver), config.save_debounce());
        let rotator = BackupRotator::new(store.paths().clone(), BackupPolicy::from_prefs(prefs));
        let rotation = RotationTimer::new(rotator, config.backup_rotation_interval());

        Ok(Self {
            windows: HashMap::new(),
            registry: WindowRegistry::new(),
            items: ItemRegistry::new(),
            mirror: EventMirror::new(),
            settings,
            restore_unsynced: prefs.bool_or(keys::RESTORE_UNSYNCED_WINDOWS, true),
            first_run: loaded_from.is_none(),
            document,
            sync: SyncMerge::new(),
            deleted: HashSet::new(),
            store,
            scheduler,
            rotation,
            notifier,
            companions: HashMap::new(),
            companion_wait: CompanionWait::new(config.companion_timeout()),
            next_window_id: 1,
            next_content_id: 1,
            loaded_from,
        })
    }

    pub fn settings(&self) -> MirrorSettings {
        self.settings
    }

    /// Change the mirroring options at runtime; applies to later admissions.
    pub fn set_settings(&mut self, settings: MirrorSettings) {
        if settings != self.settings {
            log::info!(
                "Window sync {}, only pinned: {}",
                if settings.enabled { "enabled" } else { "disabled" },
                settings.only_pinned
            );
        }
        self.settings = settings;
    }

    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    /// Where the canonical document came from at startup
    pub fn loaded_from(&self) -> Option<&DocumentSource> {
        self.loaded_from.as_ref()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The canonical document as of the last collection or merge
    pub fn document(&self) -> &SidebarDocument {
        &self.document
    }

    pub fn window(&self, id: WindowId) -> Option<&WindowState> {
        self.windows.get(&id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut WindowState> {
        self.windows.get_mut(&id)
    }

    pub fn handle(&self, id: WindowId) -> Option<&WindowHandle> {
        self.registry.get(id)
    }

    /// Eligible windows, most recently focused first
    pub fn eligible_windows(&self) -> Vec<WindowId> {
        self.registry.eligible()
    }

    pub fn items(&self) -> &ItemRegistry {
        &self.items
    }

    pub fn is_idle(&self) -> bool {
        self.mirror.is_idle()
    }

    /// Receiver notified whenever the sync-relevant state hash changes
    pub fn subscribe_changes(&self) -> watch::Receiver<Option<String>> {
        self.notifier.subscribe()
    }

    /// Make a closing handoff of `item` from `window` wait for a companion
    /// signal. The returned half must be signalled by the donor side.
    pub fn register_companion(&mut self, window: WindowId, item: ItemId) -> CompanionSignal {
        let (signal, rx) = CompanionWait::channel();
        self.companions.insert((window, item), rx);
        signal
    }

    fn allocate_window_id(&mut self) -> WindowId {
        let id = WindowId(self.next_window_id);
        self.next_window_id += 1;
        id
    }
}
