//! Logging setup for hosts of the autodoc wrappers.
//!
//! The library logs through the `log` facade and never installs a logger
//! itself. Hosts that want the classic `autodoc.log` file call
//! [`init_file_logger`] once at startup.

use anyhow::{anyhow, Context, Result};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Default log file name
pub const DEFAULT_LOG_FILE: &str = "autodoc.log";

/// How much the host wants to hear
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Debug,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Error,
            Verbosity::Normal => LevelFilter::Info,
            Verbosity::Verbose => LevelFilter::Debug,
            Verbosity::Debug => LevelFilter::Trace,
        }
    }
}

/// `log::Log` sink appending timestamped lines to a file
pub struct FileLogger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl FileLogger {
    pub fn open(path: &Path, verbosity: Verbosity) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(FileLogger {
            file: Mutex::new(file),
            level: verbosity.level_filter(),
        })
    }

    fn format(record: &Record) -> String {
        format!(
            "{} [{}] {}: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // A broken log sink must never reach the observed function
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(Self::format(record).as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Install a [`FileLogger`] as the process-wide logger
pub fn init_file_logger(path: impl AsRef<Path>, verbosity: Verbosity) -> Result<()> {
    let logger = FileLogger::open(path.as_ref(), verbosity)?;
    log::set_boxed_logger(Box::new(logger)).map_err(|e| anyhow!("Logger already set: {e}"))?;
    log::set_max_level(verbosity.level_filter());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use tempfile::TempDir;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(Verbosity::Quiet.level_filter(), LevelFilter::Error);
        assert_eq!(Verbosity::Normal.level_filter(), LevelFilter::Info);
        assert_eq!(Verbosity::Verbose.level_filter(), LevelFilter::Debug);
        assert_eq!(Verbosity::Debug.level_filter(), LevelFilter::Trace);
        assert!(Verbosity::Quiet < Verbosity::Debug);
    }

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Debug);
    }

    #[test]
    fn test_file_logger_filters_and_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_LOG_FILE);
        let logger = FileLogger::open(&path, Verbosity::Normal).unwrap();

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("autodoc::store")
                .args(format_args!("already documented"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .target("autodoc::store")
                .args(format_args!("hidden"))
                .build(),
        );
        logger.flush();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[INFO] autodoc::store: already documented"));
        assert!(!content.contains("hidden"));
    }
}
