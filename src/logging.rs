//! Subscriber setup. Library crates only emit `tracing` events; this is the
//! one place they get written anywhere.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use filecat_config::{Config, LogLevel};
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Append run logs to `config.log_path`, and mirror them to stderr when
/// `config.debug` is set. `RUST_LOG` directives refine the configured level.
pub fn init(config: &Config) -> Result<()> {
    if let Some(parent) = config.log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).or_raise(|| ErrorKind::Logging)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .or_raise(|| ErrorKind::Logging)?;
    let level = config.effective_log_level();

    let stderr = config.debug.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter(level))
    });
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_filter(filter(level)),
        )
        .with(stderr)
        .try_init()
        .or_raise(|| ErrorKind::Logging)
}

fn filter(level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_filter(level).into())
        .from_env_lossy()
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::TRACE,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}
