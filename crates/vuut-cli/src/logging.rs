//! File logging.
//!
//! The TUI owns stdout, so everything goes to a log file through a
//! non-blocking writer. Keep the returned guard alive until exit or buffered
//! lines are lost.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `VUUT_LOG=debug`.
pub const LOG_ENV: &str = "VUUT_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber writing to `path`.
///
/// Returns `None` when the log directory cannot be created or a subscriber
/// is already installed; vuut runs without file logs in that case.
pub fn init(path: &Path) -> Option<WorkerGuard> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path.file_name()?;
    if let Err(err) = fs::create_dir_all(dir) {
        eprintln!("vuut: cannot create log directory {}: {err}", dir.display());
        return None;
    }

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let appender = rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Someone else installed a subscriber; dropping the guard stops the writer.
        Err(_) => None,
    }
}
