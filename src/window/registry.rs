//! Window eligibility and focus order.

use super::WindowId;

/// Whether a window participates in syncing at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPrivacy {
    #[default]
    Synced,
    /// Private browsing window; never mirrored or persisted
    Private,
    /// Regular window the user opted out of syncing
    Unsynced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPhase {
    #[default]
    Open,
    /// Handing off its content; no longer eligible
    Closing,
    Closed,
}

/// Identity plus lifecycle state of one window.
///
/// The id never changes; only `phase` moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandle {
    pub id: WindowId,
    pub privacy: WindowPrivacy,
    pub phase: WindowPhase,
}

impl WindowHandle {
    pub fn is_eligible(&self) -> bool {
        self.phase == WindowPhase::Open && self.privacy == WindowPrivacy::Synced
    }
}

/// Windows in most-recently-focused-first order
#[derive(Debug, Default)]
pub struct WindowRegistry {
    handles: Vec<WindowHandle>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new window. It is not focused until `focus` is called,
    /// so it sorts behind every existing window.
    pub fn register(&mut self, id: WindowId, privacy: WindowPrivacy) {
        if self.get(id).is_some() {
            return;
        }
        self.handles.push(WindowHandle {
            id,
            privacy,
            phase: WindowPhase::Open,
        });
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowHandle> {
        self.handles.iter().find(|h| h.id == id)
    }

    /// Move a window to the front of the focus order
    pub fn focus(&mut self, id: WindowId) -> bool {
        let Some(idx) = self.handles.iter().position(|h| h.id == id) else {
            return false;
        };
        let handle = self.handles.remove(idx);
        self.handles.insert(0, handle);
        true
    }

    pub fn begin_closing(&mut self, id: WindowId) -> bool {
        match self.handles.iter_mut().find(|h| h.id == id) {
            Some(handle) if handle.phase == WindowPhase::Open => {
                handle.phase = WindowPhase::Closing;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: WindowId) -> Option<WindowHandle> {
        let idx = self.handles.iter().position(|h| h.id == id)?;
        let mut handle = self.handles.remove(idx);
        handle.phase = WindowPhase::Closed;
        Some(handle)
    }

    pub fn is_eligible(&self, id: WindowId) -> bool {
        self.get(id).is_some_and(WindowHandle::is_eligible)
    }

    /// Eligible windows in focus order
    pub fn eligible(&self) -> Vec<WindowId> {
        self.handles
            .iter()
            .filter(|h| h.is_eligible())
            .map(|h| h.id)
            .collect()
    }

    /// Most recently focused eligible window other than `id`
    pub fn next_eligible_except(&self, id: WindowId) -> Option<WindowId> {
        self.handles
            .iter()
            .find(|h| h.id != id && h.is_eligible())
            .map(|h| h.id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
