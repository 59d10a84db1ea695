//! Debug logging for sidebar-sync.
//!
//! Controlled by the `SIDEBAR_SYNC_DEBUG_LEVEL` environment variable:
//! - 0 or unset: No debugging
//! - 1: Errors only
//! - 2: Info level (window lifecycle, saves, sync payloads)
//! - 3: Debug level (per-window mirroring decisions, transfers)
//! - 4: Trace level (every admitted mutation)
//!
//! Output goes to `sidebar_sync_debug.log` in the system temp directory so it
//! never interleaves with a host application's stdout/stderr.
//! [`init_log_bridge`] additionally routes `log` crate records into the same
//! file.

use parking_lot::Mutex;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::OnceLock;

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl DebugLevel {
    fn from_env() -> Self {
        std::env::var("SIDEBAR_SYNC_DEBUG_LEVEL")
            .ok()
            .and_then(|val| val.trim().parse::<u8>().ok())
            .map(Self::from_u8)
            .unwrap_or(DebugLevel::Off)
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => DebugLevel::Off,
            1 => DebugLevel::Error,
            2 => DebugLevel::Info,
            3 => DebugLevel::Debug,
            _ => DebugLevel::Trace,
        }
    }

    fn label(self) -> &'static str {
        match self {
            DebugLevel::Off => "OFF  ",
            DebugLevel::Error => "ERROR",
            DebugLevel::Info => "INFO ",
            DebugLevel::Debug => "DEBUG",
            DebugLevel::Trace => "TRACE",
        }
    }

    fn to_filter(self) -> log::LevelFilter {
        match self {
            DebugLevel::Off => log::LevelFilter::Off,
            DebugLevel::Error => log::LevelFilter::Error,
            DebugLevel::Info => log::LevelFilter::Info,
            DebugLevel::Debug => log::LevelFilter::Debug,
            DebugLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl From<log::Level> for DebugLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error | log::Level::Warn => DebugLevel::Error,
            log::Level::Info => DebugLevel::Info,
            log::Level::Debug => DebugLevel::Debug,
            log::Level::Trace => DebugLevel::Trace,
        }
    }
}

struct DebugLogger {
    level: DebugLevel,
    file: Option<std::fs::File>,
}

impl DebugLogger {
    fn new(level: DebugLevel) -> Self {
        if level == DebugLevel::Off {
            return DebugLogger { level, file: None };
        }

        let log_path = std::env::temp_dir().join("sidebar_sync_debug.log");
        // A missing log file must never break the host, so open failures are ignored.
        let file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&log_path)
            .ok();

        let mut logger = DebugLogger { level, file };
        logger.write_raw(&format!(
            "{}\nsidebar-sync debug session started at {} (level={:?})\n{}\n",
            "=".repeat(80),
            timestamp(),
            level,
            "=".repeat(80)
        ));
        logger
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.file {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }

    fn log(&mut self, level: DebugLevel, category: &str, msg: &str) {
        if level == DebugLevel::Off || level > self.level {
            return;
        }
        self.write_raw(&format!(
            "[{}] [{}] [{}] {}\n",
            timestamp(),
            level.label(),
            category,
            msg
        ));
    }
}

static LOGGER: OnceLock<Mutex<DebugLogger>> = OnceLock::new();

fn logger_with(level: DebugLevel) -> &'static Mutex<DebugLogger> {
    LOGGER.get_or_init(|| Mutex::new(DebugLogger::new(level)))
}

fn get_logger() -> &'static Mutex<DebugLogger> {
    logger_with(DebugLevel::from_env())
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.6f").to_string()
}

/// Check if debugging is enabled at given level
pub fn is_enabled(level: DebugLevel) -> bool {
    level <= get_logger().lock().level
}

/// Log a message at specified level
pub fn log(level: DebugLevel, category: &str, msg: &str) {
    get_logger().lock().log(level, category, msg);
}

/// Log formatted message
pub fn logf(level: DebugLevel, category: &str, args: fmt::Arguments) {
    if is_enabled(level) {
        log(level, category, &format!("{}", args));
    }
}

/// `log` crate sink writing into the debug file, optionally mirrored to stderr.
struct LogBridge;

static BRIDGE: LogBridge = LogBridge;

/// Set once by the first `init_log_bridge` call
static MIRROR_STDERR: OnceLock<bool> = OnceLock::new();

fn mirrors_stderr() -> bool {
    MIRROR_STDERR.get().copied().unwrap_or(false)
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = format!("{}", record.args());
        get_logger()
            .lock()
            .log(record.level().into(), record.target(), &msg);
        if mirrors_stderr() {
            eprintln!("[{}] {}: {}", record.level(), record.target(), msg);
        }
    }

    fn flush(&self) {}
}

/// Install the `log` bridge.
///
/// `override_level` wins over `SIDEBAR_SYNC_DEBUG_LEVEL`. When `RUST_LOG` is
/// set, records are mirrored to stderr as well. Calling this twice is harmless;
/// the second call keeps the first logger.
pub fn init_log_bridge(override_level: Option<u8>) {
    let level = override_level
        .map(DebugLevel::from_u8)
        .unwrap_or_else(DebugLevel::from_env);
    let _ = logger_with(level);

    let mirror_stderr = *MIRROR_STDERR.get_or_init(|| std::env::var_os("RUST_LOG").is_some());
    let filter = if mirror_stderr {
        level.to_filter().max(log::LevelFilter::Warn)
    } else {
        level.to_filter()
    };

    if log::set_logger(&BRIDGE).is_ok() {
        log::set_max_level(filter);
    }
}

// Convenience macros for logging
#[macro_export]
macro_rules! debug_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Error, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Info, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Debug, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_trace {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Trace, $category, format_args!($($arg)*))
    };
}
