use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bench_core::error::BenchError;

/// Logging configuration for the fixture server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log file path (optional, if None logs only to stdout)
    pub log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "bench_server=info,bench_core=info,tower_http=warn".to_string(),
            log_file: None,
        }
    }
}

/// Initialize logging. `RUST_LOG` wins over the configured level. Returns
/// the appender guard when a log file is configured; the caller must keep it
/// alive for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>, BenchError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.log_file {
        Some(log_file) => {
            let path = std::path::Path::new(log_file);
            let directory = path.parent().ok_or_else(|| BenchError::Configuration {
                reason: "Invalid log file path".to_string(),
            })?;
            let filename = path.file_name().ok_or_else(|| BenchError::Configuration {
                reason: "Invalid log file name".to_string(),
            })?;
            std::fs::create_dir_all(directory)?;

            let appender = tracing_appender::rolling::never(directory, filename);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            // Ignore double-initialization so tests can call this freely
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init();
            Ok(Some(guard))
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true))
                .try_init();
            Ok(None)
        }
    }
}
