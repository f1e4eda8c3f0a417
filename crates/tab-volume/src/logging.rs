use crate::config::LoggingConfig;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt,
    util::SubscriberInitExt,
};

const LOG_FILE_PREFIX: &str = "tab-volume.log";

/// Install the global subscriber.
///
/// Stdout carries the browser bridge, so logs go to stderr or to daily files
/// under `config.directory`. Keep the returned guard alive for the life of
/// the process or buffered file output is lost.
pub(crate) fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let (writer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let layer: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
        fmt::layer().json().with_writer(writer).boxed()
    } else {
        fmt::layer()
            .with_ansi(config.directory.is_none())
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).with(filter).init();

    guard
}
