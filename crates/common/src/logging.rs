//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level filter. When a log file is
/// configured it receives the output instead of the terminal; if the file
/// cannot be opened the subscriber falls back to the terminal and says so.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file = config.file.as_ref().and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(Arc::new(file)),
            Err(e) => {
                eprintln!("could not open log file {}: {e}", path.display());
                None
            }
        }
    });

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(file.is_none());

    let result = match (config.json, file) {
        (true, Some(file)) => {
            tracing::subscriber::set_global_default(builder.json().with_writer(file).finish())
        }
        (true, None) => tracing::subscriber::set_global_default(builder.json().finish()),
        (false, Some(file)) => {
            tracing::subscriber::set_global_default(builder.with_writer(file).finish())
        }
        (false, None) => tracing::subscriber::set_global_default(builder.finish()),
    };
    // A second init keeps the first subscriber.
    result.ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_receives_events() {
        let path = std::env::temp_dir().join("sweetspot-logging-test.log");
        let _ = std::fs::remove_file(&path);

        init_logging(&LoggingConfig {
            level: "info".to_string(),
            json: false,
            file: Some(path.clone()),
        });
        tracing::info!("file sink line");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("file sink line"));
        let _ = std::fs::remove_file(&path);
    }
}
