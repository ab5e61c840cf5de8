use std::{io, path::Path};

use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "autou.log";

static INIT: OnceCell<()> = OnceCell::new();
static GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// `RUST_LOG` wins over the configured level; an unparsable level means `info`.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Console output goes to stderr so it never interleaves with the view on
/// stdout. The file copy rolls daily under `logs_dir`.
pub fn init_tracing(level: &str, logs_dir: &Path) -> Result<()> {
    INIT.get_or_try_init::<_, anyhow::Error>(|| {
        let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        let _ = GUARD.set(guard);

        tracing_subscriber::registry()
            .with(build_filter(level))
            .with(fmt::layer().compact().with_writer(io::stderr))
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_thread_names(true)
                    .with_ansi(false),
            )
            .init();

        tracing::info!(logs = %logs_dir.display(), file = LOG_FILE_PREFIX, "tracing initialized");
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_is_used_without_rust_log() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert_eq!(build_filter("autou=debug").to_string(), "autou=debug");
    }
}
