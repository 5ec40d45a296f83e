use super::{LogConfig, LOG_FILENAME};
use color_eyre::eyre::Result;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Filter used when `RUST_LOG` is not set.
pub(crate) fn default_filter(level: Level) -> String {
    format!("item_service={level}")
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)))
}

/// One layer for the rolling file and one for stdout.
///
/// The file layer never carries ANSI escapes.
pub(crate) fn output_layers(
    level: Level,
    json_format: bool,
    file: RollingFileAppender,
) -> Vec<BoxedLayer> {
    if json_format {
        vec![
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(file)
                .with_filter(env_filter(level))
                .boxed(),
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(std::io::stdout)
                .with_filter(env_filter(level))
                .boxed(),
        ]
    } else {
        vec![
            fmt::layer()
                .with_ansi(false)
                .with_writer(file)
                .with_filter(env_filter(level))
                .boxed(),
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(env_filter(level))
                .boxed(),
        ]
    }
}

/// Install the global subscriber: stdout plus a rolling file in
/// `config.log_dir`, with span traces captured for error reports.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let LogConfig {
        log_dir,
        log_level,
        json_format,
        rotation,
    } = config;

    std::fs::create_dir_all(&log_dir)?;
    let file = RollingFileAppender::new(rotation, &log_dir, LOG_FILENAME);

    tracing_subscriber::registry()
        .with(output_layers(log_level, json_format, file))
        .with(ErrorLayer::default())
        .try_init()?;
    Ok(())
}

/// Parse rotation period from string. Unknown values fall back to daily.
#[must_use]
pub fn parse_rotation(s: &str) -> Rotation {
    match s.to_lowercase().as_str() {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}
