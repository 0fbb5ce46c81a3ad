use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Variable holding the log filter, e.g. `RALT_LOG=ralt_core=debug`
pub const LOG_ENV: &str = "RALT_LOG";
const DEFAULT_FILTER: &str = "ralt_core=info,ralt_tui=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Where the TUI writes its log files
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("ralt")
        .join("logs")
}

/// Log to a daily-rolling file so the terminal UI is never drawn over.
/// Keep the returned guard alive until exit or buffered lines are lost.
/// Returns `None`, leaving logging off, when the log directory is unusable.
pub fn init_file_logger() -> Option<WorkerGuard> {
    init_file_logger_in(&log_dir())
}

fn init_file_logger_in(dir: &Path) -> Option<WorkerGuard> {
    let file_appender = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("ralt.log")
        .build(dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Logging disabled: cannot write to {}: {}", dir.display(), e);
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .try_init();

    Some(guard)
}

/// Log to stderr, for the one-shot subcommands
pub fn init_stderr_logger() {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(console_layer)
        .try_init();
}
