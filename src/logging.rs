use std::path::PathBuf;
use std::sync::Mutex;

use color_eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

lazy_static::lazy_static! {
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Log verbosity accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Path of the log file: `custom` if given, else `sheetrx.log` in the working directory
pub fn log_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Ok(path)
        }
        None => Ok(std::env::current_dir()?.join(LOG_FILE.as_str())),
    }
}

/// Initialize logging with default settings (WARN level)
pub fn init() -> Result<()> {
    init_with(None, None)
}

/// An explicit `level` wins; otherwise `RUST_LOG`, defaulting to WARN
fn build_filter(level: Option<tracing::Level>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::builder().parse_lossy(level.to_string().to_lowercase()),
        None => EnvFilter::builder()
            .with_default_directive(tracing::Level::WARN.into())
            .from_env_lossy(),
    }
}

/// Initialize file logging; a CLI `level` overrides `RUST_LOG`
pub fn init_with(custom_log_path: Option<PathBuf>, level: Option<tracing::Level>) -> Result<()> {
    let path = log_path(custom_log_path)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    let env_filter = build_filter(level);

    let file_subscriber = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(Mutex::new(file))
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(tracing::Level::from(LogLevel::Debug), tracing::Level::DEBUG);
        assert_eq!(tracing::Level::from(LogLevel::Error), tracing::Level::ERROR);
    }

    #[test]
    fn test_custom_log_path_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("logs").join("run.log");
        let path = log_path(Some(target.clone())).unwrap();
        assert_eq!(path, target);
        assert!(dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_cli_level_sets_the_filter() {
        use tracing_subscriber::filter::LevelFilter;
        assert_eq!(
            build_filter(Some(tracing::Level::DEBUG)).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            build_filter(Some(tracing::Level::ERROR)).max_level_hint(),
            Some(LevelFilter::ERROR)
        );
    }

    #[test]
    fn test_default_log_file_name() {
        assert_eq!(LOG_FILE.as_str(), "sheetrx.log");
    }
}
