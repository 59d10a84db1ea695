//! File I/O for the sidebar document
//!
//! Layout under the session directory:
//! - `sidebar-session.json.gz`: primary document
//! - `backups/clean-sidebar-session.json.gz`: copy of the primary taken right
//!   before it was last overwritten
//! - `backups/sidebar-session-YYYY-MM-DD-HH.json.gz`: dated backups

use super::SidebarDocument;
use crate::error::SyncError;
use anyhow::{Context, Result};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use sidebar_sync_config::Config;
use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const PRIMARY_FILE: &str = "sidebar-session.json.gz";
pub const CLEAN_FILE: &str = "clean-sidebar-session.json.gz";
pub const BACKUP_DIR: &str = "backups";
pub const BACKUP_PREFIX: &str = "sidebar-session-";
pub const BACKUP_SUFFIX: &str = ".json.gz";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Where the document and its backups live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    pub primary: PathBuf,
    pub backup_dir: PathBuf,
    pub clean: PathBuf,
}

impl SessionPaths {
    pub fn new(dir: &Path) -> Self {
        let backup_dir = dir.join(BACKUP_DIR);
        Self {
            primary: dir.join(PRIMARY_FILE),
            clean: backup_dir.join(CLEAN_FILE),
            backup_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.session_dir())
    }

    /// Dated backup files, oldest first by filename
    pub fn dated_backups(&self) -> Result<Vec<PathBuf>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.backup_dir)
            .with_context(|| format!("Failed to list backups in {:?}", self.backup_dir))?;

        let mut backups: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(is_dated_backup_name)
            })
            .collect();
        backups.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(backups)
    }
}

pub fn is_dated_backup_name(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX)
}

/// Which link of the fallback chain a document came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Primary,
    CleanBackup,
    DatedBackup(PathBuf),
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Primary => write!(f, "primary"),
            DocumentSource::CleanBackup => write!(f, "clean backup"),
            DocumentSource::DatedBackup(path) => write!(f, "dated backup {:?}", path),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub document: SidebarDocument,
    pub source: DocumentSource,
}

/// Load one document file.
///
/// Returns `None` if the file doesn't exist or is empty. Returns an error
/// wrapping `SyncError::Corruption` if it exists but cannot be parsed.
pub fn load_document_from(path: &Path) -> Result<Option<SidebarDocument>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read(path)
        .with_context(|| format!("Failed to read sidebar document from {:?}", path))?;
    if raw.is_empty() {
        return Ok(None);
    }

    let json = if raw.starts_with(&GZIP_MAGIC) {
        let mut decoded = String::new();
        GzDecoder::new(raw.as_slice())
            .read_to_string(&mut decoded)
            .map_err(|e| SyncError::corruption(path, e.to_string()))?;
        decoded
    } else {
        String::from_utf8(raw).map_err(|e| SyncError::corruption(path, e.to_string()))?
    };
    if json.trim().is_empty() {
        return Ok(None);
    }

    let document: SidebarDocument =
        serde_json::from_str(&json).map_err(|e| SyncError::corruption(path, e.to_string()))?;

    log::debug!(
        "Loaded sidebar document ({} spaces, {} tabs) from {:?}",
        document.spaces.len(),
        document.tabs.len(),
        path
    );
    Ok(Some(document))
}

/// Write a document atomically: temp file, then rename over `path`.
pub fn save_document_to(document: &SidebarDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create session directory {:?}", parent))?;
    }

    let json = serde_json::to_vec(document).context("Failed to serialize sidebar document")?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .context("Failed to compress sidebar document")?;
    let compressed = encoder
        .finish()
        .context("Failed to compress sidebar document")?;

    let tmp = path.with_extension("gz.tmp");
    std::fs::write(&tmp, compressed)
        .with_context(|| format!("Failed to write sidebar document to {:?}", tmp))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move sidebar document into place at {:?}", path))?;
    Ok(())
}

/// Reads and writes the canonical document with its crash-recovery chain.
#[derive(Debug, Clone)]
pub struct SessionStore {
    paths: SessionPaths,
}

impl SessionStore {
    pub fn new(paths: SessionPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &SessionPaths {
        &self.paths
    }

    /// Load the document, falling back from the primary to the clean copy
    /// and then to dated backups, newest first.
    ///
    /// `Ok(None)` means nothing usable exists; the caller runs first-run setup.
    pub fn read(&self) -> Result<Option<LoadedDocument>> {
        if let Some(document) = try_load(&self.paths.primary) {
            return Ok(Some(LoadedDocument {
                document,
                source: DocumentSource::Primary,
            }));
        }
        log::info!("Primary sidebar document unusable, trying clean backup");

        if let Some(document) = try_load(&self.paths.clean) {
            log::info!("Recovered sidebar document from clean backup");
            return Ok(Some(LoadedDocument {
                document,
                source: DocumentSource::CleanBackup,
            }));
        }

        for path in self.paths.dated_backups()?.into_iter().rev() {
            if let Some(document) = try_load(&path) {
                log::info!("Recovered sidebar document from {:?}", path);
                return Ok(Some(LoadedDocument {
                    document,
                    source: DocumentSource::DatedBackup(path),
                }));
            }
        }

        log::info!("No usable sidebar document found");
        Ok(None)
    }

    /// Keep a clean copy of the current primary, then overwrite it.
    ///
    /// The copy is best-effort: its failure is logged and does not stop the
    /// primary write.
    pub fn write(&self, document: &SidebarDocument) -> Result<()> {
        if let Err(e) = self.copy_clean() {
            log::warn!("{}", e);
        }
        save_document_to(document, &self.paths.primary)?;
        log::info!(
            "Saved sidebar document ({} spaces, {} tabs) to {:?}",
            document.spaces.len(),
            document.tabs.len(),
            self.paths.primary
        );
        Ok(())
    }

    fn copy_clean(&self) -> Result<(), SyncError> {
        if !self.paths.primary.exists() {
            return Ok(());
        }
        let fail = |source| SyncError::WriteFailure {
            path: self.paths.clean.clone(),
            source,
        };
        std::fs::create_dir_all(&self.paths.backup_dir).map_err(fail)?;
        std::fs::copy(&self.paths.primary, &self.paths.clean).map_err(fail)?;
        Ok(())
    }
}

/// Missing, empty and corrupt files all count as unusable here.
fn try_load(path: &Path) -> Option<SidebarDocument> {
    match load_document_from(path) {
        Ok(document) => document,
        Err(e) => {
            log::info!("{:#}", e);
            None
        }
    }
}
