use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "panchi_catalog=info,tower_http=info";

/// Initializes console logging and, when `log_dir` is given, a daily-rotated JSON log file.
///
/// The returned guard flushes the file writer on drop; keep it alive for the whole run.
pub fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let Some(dir) = log_dir else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stdout))
            .init();
        return None;
    };

    if let Err(e) = fs::create_dir_all(dir) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stdout))
            .init();
        tracing::warn!(dir = %dir.display(), error = %e, "log directory unavailable, console only");
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(dir, "catalog.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer().json().with_writer(writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();

    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_logging_creates_directory_and_keeps_guard() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let guard = init_logging(Some(&log_dir));
        tracing::info!("logging initialised");

        assert!(guard.is_some());
        assert!(log_dir.is_dir());
    }
}
