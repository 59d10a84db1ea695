//! Typed error types for sidebar-sync.
//!
//! Nothing in the core is fatal to a window: every variant degrades to
//! treating the affected item as unsynced or independent. File-boundary
//! helpers still return `anyhow::Result`; callers that care about the
//! category can `downcast_ref::<SyncError>()`.

use crate::model::ItemId;
use crate::window::WindowId;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure categories raised by the mirroring, transfer and persistence core.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The counterpart of an item is missing in a target window.
    #[error("item {item} not found in window {window}")]
    NotFound {
        /// Window that was searched.
        window: WindowId,
        /// Item that could not be resolved.
        item: ItemId,
    },

    /// A session document on disk is unreadable or structurally invalid.
    #[error("session document {path:?} is corrupt: {reason}")]
    Corruption {
        /// File that failed to load.
        path: PathBuf,
        /// Parse or validation failure.
        reason: String,
    },

    /// Live content could not be exchanged between two handles.
    #[error("content transfer incompatible: {reason}")]
    TransferIncompatible {
        /// Which side could not accept the exchange and why.
        reason: String,
    },

    /// A best-effort write (the clean backup copy) failed.
    #[error("write to {path:?} failed: {source}")]
    WriteFailure {
        /// Destination that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A companion signal did not arrive within the bounded wait.
    #[error("companion signal not received within {0:?}")]
    CompanionTimeout(Duration),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl SyncError {
    pub fn corruption(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SyncError::Corruption {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn incompatible(reason: impl Into<String>) -> Self {
        SyncError::TransferIncompatible {
            reason: reason.into(),
        }
    }
}
