use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE: &str = "pwr.log";

/// Filter directives, e.g. `PWR_LOG=debug` or `PWR_LOG=pwr::launcher=debug`.
pub const LOG_ENV: &str = "PWR_LOG";

/// Keep alive for the whole run; dropping it flushes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Route tracing to `<dir>/pwr.log`; log lines never reach the terminal.
/// Returns `None` when the log file cannot be set up and the program then
/// runs without logs.
pub fn init(dir: &Path) -> Option<LoggingGuard> {
    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("pwr: logging disabled, cannot create {}: {}", dir.display(), e);
        return None;
    }

    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(dir)
    {
        Ok(a) => a,
        Err(e) => {
            eprintln!("pwr: logging disabled: {}", e);
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    if tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_err()
    {
        return None;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pwr starting");
    Some(LoggingGuard { _file_guard: guard })
}
