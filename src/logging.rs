use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Route `tracing` output to daily rolling files under `log_dir`.
///
/// The terminal belongs to the quiz UI, so nothing is logged to stdout.
/// `RUST_LOG` overrides `level` when set. Keep the returned guard alive for
/// the whole program or buffered lines are lost.
pub fn init(log_dir: &Path, level: &str, debug: bool) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let file_appender = rolling::daily(log_dir, "wordrush.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_names(true),
        )
        .try_init()
        .context("logging already initialised")?;

    let debug_flag = debug;
    tracing::info!(dir = %log_dir.display(), level, debug_flag, "logging initialised");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_log_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");

        // A second global subscriber in the same test binary is rejected,
        // but the directory is created either way.
        let _ = init(&log_dir, "info", false);
        assert!(log_dir.exists());
    }
}
