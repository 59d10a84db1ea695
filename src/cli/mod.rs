//! Command-line interface for sidebar-sync.
//!
//! The binary inspects and maintains an on-disk session: print the recovered
//! document, run a backup rotation, verify the recovery chain and list
//! dated backups.

use crate::session::{
    BackupPolicy, BackupRotator, SessionPaths, SessionStore, content_hash,
};
use crate::sync::SyncPayload;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sidebar_sync_config::{Config, Preferences};
use std::path::PathBuf;

/// sidebar-sync - inspect and maintain the cross-window sidebar session
#[derive(Parser)]
#[command(name = "sidebar-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the session document (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    pub session_dir: Option<PathBuf>,

    /// Config file to read instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set debug log level (overrides SIDEBAR_SYNC_DEBUG_LEVEL)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Numeric level understood by `debug::init_log_bridge`
    pub fn as_debug_level(self) -> u8 {
        match self {
            LogLevelArg::Off => 0,
            LogLevelArg::Error => 1,
            LogLevelArg::Info => 2,
            LogLevelArg::Debug => 3,
            LogLevelArg::Trace => 4,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the recovered session document as JSON
    Show {
        /// Print the outgoing sync payload instead of the whole document
        #[arg(long)]
        payload: bool,
    },

    /// Run one dated backup rotation now
    Rotate,

    /// Report which file the document recovers from and its content hash
    Verify,

    /// List dated backups, oldest first
    Backups,
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Some(dir) = &self.session_dir {
            config.session_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

/// Run the selected subcommand, writing its report to stdout.
pub fn run(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let paths = SessionPaths::from_config(&config);
    log::info!("Using session directory {:?}", config.session_dir());

    match &cli.command {
        Commands::Show { payload } => {
            let store = SessionStore::new(paths);
            let Some(loaded) = store.read()? else {
                println!("No session document found");
                return Ok(());
            };
            let json = if *payload {
                serde_json::to_string_pretty(&SyncPayload::outgoing(&loaded.document))
            } else {
                serde_json::to_string_pretty(&loaded.document)
            }
            .context("Failed to serialize session document")?;
            eprintln!("Loaded from {}", loaded.source);
            println!("{}", json);
        }
        Commands::Rotate => {
            let prefs: &dyn Preferences = &config;
            let rotator = BackupRotator::new(paths, BackupPolicy::from_prefs(prefs));
            let report = rotator.rotate_now()?;
            match &report.written {
                Some(path) => println!("Wrote {}", path.display()),
                None => println!("Nothing to back up"),
            }
            for path in &report.removed {
                println!("Removed {}", path.display());
            }
            println!("{} backups kept", report.kept);
        }
        Commands::Verify => {
            let store = SessionStore::new(paths);
            match store.read()? {
                Some(loaded) => {
                    println!("source: {}", loaded.source);
                    println!("spaces: {}", loaded.document.spaces.len());
                    println!("tabs: {}", loaded.document.tabs.len());
                    println!("hash: {}", content_hash(&loaded.document));
                }
                None => {
                    println!("No usable session document; first run setup would start fresh");
                }
            }
        }
        Commands::Backups => {
            let backups = paths.dated_backups()?;
            if backups.is_empty() {
                println!("No dated backups in {}", paths.backup_dir.display());
            }
            for path in backups {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sidebar-sync",
            "show",
            "--payload",
            "--session-dir",
            "/tmp/session",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Show { payload: true }));
        assert_eq!(cli.session_dir, Some(PathBuf::from("/tmp/session")));
    }
}
