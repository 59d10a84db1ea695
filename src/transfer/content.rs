//! Live content slots bound to window-local item handles.
//!
//! Each handle holds exactly one [`ContentSlot`]. Only a `Live` slot counts
//! as content-visible; `Blank` and `Unloaded` are placeholders.

use chrono::{DateTime, Utc};

/// Identifier of one heavyweight rendering resource.
pub type ContentId = u64;

/// Process model a resource renders in. Exchanges require matching modes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ExecutionMode {
    #[default]
    InProcess,
    /// Out-of-process renderer of the given remote type
    Remote(String),
}

/// Still image of the last frame a resource rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCapture {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Continuity aid shown by the receiving handle while an exchange completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePreview {
    pub content_id: ContentId,
    pub frame: FrameCapture,
    pub captured_at: DateTime<Utc>,
}

/// A materialized rendering resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveContent {
    pub id: ContentId,
    pub mode: ExecutionMode,
    /// Progress/status observers are wired to this resource
    pub observers_attached: bool,
    pub last_frame: Option<FrameCapture>,
}

impl LiveContent {
    pub fn new(id: ContentId, mode: ExecutionMode) -> Self {
        Self {
            id,
            mode,
            observers_attached: true,
            last_frame: None,
        }
    }
}

/// What a handle currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSlot {
    /// Lightweight lazy placeholder; will load in `mode` when selected
    Unloaded { mode: ExecutionMode },
    /// Inert navigable placeholder
    Blank { mode: ExecutionMode },
    Live(LiveContent),
}

impl Default for ContentSlot {
    fn default() -> Self {
        ContentSlot::Unloaded {
            mode: ExecutionMode::default(),
        }
    }
}

impl ContentSlot {
    pub fn mode(&self) -> &ExecutionMode {
        match self {
            ContentSlot::Unloaded { mode } | ContentSlot::Blank { mode } => mode,
            ContentSlot::Live(live) => &live.mode,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, ContentSlot::Live(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, ContentSlot::Blank { .. })
    }

    pub fn live(&self) -> Option<&LiveContent> {
        match self {
            ContentSlot::Live(live) => Some(live),
            _ => None,
        }
    }

    pub fn live_mut(&mut self) -> Option<&mut LiveContent> {
        match self {
            ContentSlot::Live(live) => Some(live),
            _ => None,
        }
    }

    /// Same mode, inert.
    pub fn blanked(&self) -> ContentSlot {
        ContentSlot::Blank {
            mode: self.mode().clone(),
        }
    }
}
