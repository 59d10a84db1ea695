//! Content ownership transfer.
//!
//! Moves the one live rendering resource of an item from the handle that
//! holds it (the donor) to another handle of the same item (the receiver).
//! The exchange is a fixed sequence of steps; an incompatible pair aborts at
//! the mode check with both handles restored.

pub mod companion;
pub mod content;

pub use companion::{CompanionOutcome, CompanionSignal, CompanionWait};
pub use content::{
    ContentId, ContentSlot, ExecutionMode, FrameCapture, FramePreview, LiveContent,
};

use crate::error::SyncError;
use crate::tab::Tab;

/// What a completed transfer moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub content_id: ContentId,
    /// A still frame was shown on the receiver during the exchange
    pub preview_shown: bool,
}

/// Move `donor`'s live content onto `receiver`.
///
/// On success the receiver is content-visible with observers attached and
/// the donor holds a blank placeholder. The caller is responsible for
/// flushing durable state afterwards.
pub fn transfer(donor: &mut Tab, receiver: &mut Tab) -> Result<TransferReport, SyncError> {
    if donor.item_id != receiver.item_id {
        return Err(SyncError::incompatible(format!(
            "handles {} and {} belong to different items",
            donor.id, receiver.id
        )));
    }
    let content_id = match donor.content.live() {
        Some(live) => live.id,
        None => {
            return Err(SyncError::incompatible(format!(
                "handle {} has no live content to hand over",
                donor.id
            )));
        }
    };
    if receiver.content_visible() {
        return Err(SyncError::incompatible(format!(
            "handle {} already renders live content",
            receiver.id
        )));
    }

    let original = stage_receiver(receiver);
    suspend_observers(donor);
    let preview_shown = show_preview(donor, receiver);

    if let Err(e) = check_compatible(donor, receiver) {
        receiver.content = original;
        receiver.preview = None;
        reattach_observers(&mut donor.content);
        crate::debug_info!("TRANSFER", "Aborted {} -> {}: {}", donor.id, receiver.id, e);
        return Err(e);
    }

    std::mem::swap(&mut donor.content, &mut receiver.content);
    receiver.history = donor.history.clone();
    reattach_observers(&mut receiver.content);
    receiver.preview = None;

    crate::debug_info!(
        "TRANSFER",
        "Content {} moved from handle {} to {}",
        content_id,
        donor.id,
        receiver.id
    );
    Ok(TransferReport {
        content_id,
        preview_shown,
    })
}

/// Give the receiver a navigable blank placeholder in its own mode.
/// Returns the slot it held before so an abort can put it back.
fn stage_receiver(receiver: &mut Tab) -> ContentSlot {
    let blank = receiver.content.blanked();
    std::mem::replace(&mut receiver.content, blank)
}

fn suspend_observers(donor: &mut Tab) {
    if let Some(live) = donor.content.live_mut() {
        live.observers_attached = false;
    }
}

fn reattach_observers(slot: &mut ContentSlot) {
    if let Some(live) = slot.live_mut() {
        live.observers_attached = true;
    }
}

/// Best effort: a donor that never rendered a frame just shows nothing.
fn show_preview(donor: &Tab, receiver: &mut Tab) -> bool {
    receiver.preview = donor.content.live().and_then(capture_preview);
    receiver.preview.is_some()
}

pub fn capture_preview(live: &LiveContent) -> Option<FramePreview> {
    let frame = live.last_frame.clone()?;
    Some(FramePreview {
        content_id: live.id,
        frame,
        captured_at: chrono::Utc::now(),
    })
}

fn check_compatible(donor: &Tab, receiver: &Tab) -> Result<(), SyncError> {
    let donor_mode = donor.content.mode();
    let receiver_mode = receiver.content.mode();
    if donor_mode != receiver_mode {
        return Err(SyncError::incompatible(format!(
            "execution modes differ: {:?} vs {:?}",
            donor_mode, receiver_mode
        )));
    }
    Ok(())
}

/// Materialize fresh live content on a handle that has none anywhere.
pub fn load_fresh(tab: &mut Tab, content_id: ContentId) {
    let mode = tab.content.mode().clone();
    tab.content = ContentSlot::Live(LiveContent::new(content_id, mode));
    tab.preview = None;
}
