//! Dated backup rotation.
//!
//! Each rotation copies the primary document into the bucket file for the
//! current day and hour span, thins older days down to their newest file,
//! then trims the oldest files until at most `max_backups` remain.

use super::scheduler::DeferredTask;
use super::storage::{BACKUP_PREFIX, BACKUP_SUFFIX, SessionPaths};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use sidebar_sync_config::config::config_struct::MAX_BACKUP_HOUR_SPAN;
use sidebar_sync_config::{Preferences, defaults, keys};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupPolicy {
    pub enabled: bool,
    pub max_backups: usize,
    /// Bucket width in hours
    pub hour_span: u32,
}

impl Default for BackupPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_backups: defaults::max_session_backups(),
            hour_span: defaults::backup_hour_span(),
        }
    }
}

impl BackupPolicy {
    pub fn from_prefs(prefs: &dyn Preferences) -> Self {
        let max = prefs.int_or(
            keys::MAX_SESSION_BACKUPS,
            defaults::max_session_backups() as u64,
        );
        let span = prefs.int_or(
            keys::BACKUP_HOUR_SPAN,
            u64::from(defaults::backup_hour_span()),
        );
        Self {
            enabled: prefs.bool_or(keys::SESSION_BACKUP_ENABLED, true),
            max_backups: usize::try_from(max.max(1)).unwrap_or(usize::MAX),
            hour_span: span.clamp(1, u64::from(MAX_BACKUP_HOUR_SPAN)) as u32,
        }
    }
}

/// Bucket file name for `now`: `sidebar-session-YYYY-MM-DD-HH.json.gz`,
/// where HH is the first hour of the bucket.
pub fn bucket_file_name(now: NaiveDateTime, hour_span: u32) -> String {
    let span = hour_span.clamp(1, MAX_BACKUP_HOUR_SPAN);
    let hour = now.hour() - now.hour() % span;
    format!(
        "{}{}-{:02}{}",
        BACKUP_PREFIX,
        now.format("%Y-%m-%d"),
        hour,
        BACKUP_SUFFIX
    )
}

/// Day a dated backup belongs to, parsed from its file name
fn backup_day(path: &std::path::Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    let stamp = name.strip_prefix(BACKUP_PREFIX)?.strip_suffix(BACKUP_SUFFIX)?;
    let (day, hour) = stamp.rsplit_once('-')?;
    hour.parse::<u32>().ok()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationReport {
    /// Bucket file written this rotation
    pub written: Option<PathBuf>,
    pub removed: Vec<PathBuf>,
    /// Dated backups left on disk
    pub kept: usize,
}

#[derive(Debug, Clone)]
pub struct BackupRotator {
    paths: SessionPaths,
    policy: BackupPolicy,
}

impl BackupRotator {
    pub fn new(paths: SessionPaths, policy: BackupPolicy) -> Self {
        Self { paths, policy }
    }

    pub fn policy(&self) -> BackupPolicy {
        self.policy
    }

    pub fn rotate_now(&self) -> Result<RotationReport> {
        self.rotate_backups(chrono::Local::now().naive_local())
    }

    pub fn rotate_backups(&self, now: NaiveDateTime) -> Result<RotationReport> {
        let mut report = RotationReport::default();
        if !self.policy.enabled {
            log::debug!("Session backups disabled, skipping rotation");
            return Ok(report);
        }

        if self.paths.primary.exists() {
            std::fs::create_dir_all(&self.paths.backup_dir).with_context(|| {
                format!("Failed to create backup directory {:?}", self.paths.backup_dir)
            })?;
            let target = self
                .paths
                .backup_dir
                .join(bucket_file_name(now, self.policy.hour_span));
            std::fs::copy(&self.paths.primary, &target)
                .with_context(|| format!("Failed to write backup {:?}", target))?;
            report.written = Some(target);
        }

        let today = now.date();
        let mut backups = self.paths.dated_backups()?;

        // Older days keep only their newest bucket
        let mut newest_per_day: BTreeMap<NaiveDate, PathBuf> = BTreeMap::new();
        let mut stale = Vec::new();
        for path in &backups {
            let Some(day) = backup_day(path) else {
                continue;
            };
            if day >= today {
                continue;
            }
            if let Some(previous) = newest_per_day.insert(day, path.clone()) {
                stale.push(previous);
            }
        }

        while backups.len() - stale.len() > self.policy.max_backups {
            let Some(oldest) = backups.iter().find(|p| !stale.contains(p)).cloned() else {
                break;
            };
            stale.push(oldest);
        }

        for path in stale {
            match std::fs::remove_file(&path) {
                Ok(()) => report.removed.push(path),
                Err(e) => log::warn!("Failed to remove old backup {:?}: {}", path, e),
            }
        }
        backups.retain(|p| !report.removed.contains(p));
        report.kept = backups.len();

        crate::debug_info!(
            "BACKUP",
            "Rotation wrote {:?}, removed {}, kept {}",
            report.written,
            report.removed.len(),
            report.kept
        );
        Ok(report)
    }
}

/// Runs a backup rotation on a long debounce after saves.
#[derive(Debug)]
pub struct RotationTimer {
    enabled: bool,
    task: DeferredTask,
}

impl RotationTimer {
    pub fn new(rotator: BackupRotator, interval: Duration) -> Self {
        let enabled = rotator.policy().enabled;
        let task = DeferredTask::new(interval, move || {
            if let Err(e) = rotator.rotate_now() {
                log::warn!("Backup rotation failed: {:#}", e);
            }
        });
        Self { enabled, task }
    }

    /// Arm the timer if it isn't already; no-op when backups are disabled.
    pub fn request(&self) {
        if self.enabled {
            self.task.arm();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_armed()
    }

    /// Rotate immediately if a rotation was pending.
    pub fn finalize(&self) {
        self.task.finalize();
    }
}
