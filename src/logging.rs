use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::Config;

/// Install the global subscriber.
///
/// Logs go to a daily-rotated file under the log directory. `verbose` also
/// echoes them to stderr. `RUST_LOG` overrides the configured filter. Keep
/// the returned guard alive until exit or buffered lines are lost.
pub fn init(config: &Config, verbose: bool) -> Result<WorkerGuard> {
  let log_dir = config.log_dir()?;
  std::fs::create_dir_all(&log_dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", log_dir.display(), e))?;

  let filter = match EnvFilter::try_from_default_env() {
    Ok(filter) => filter,
    Err(_) => EnvFilter::try_new(&config.log.filter)
      .map_err(|e| eyre!("Invalid log filter {:?}: {}", config.log.filter, e))?,
  };

  let appender = tracing_appender::rolling::daily(&log_dir, "dex.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
  let stderr_layer = verbose.then(|| fmt::layer().with_writer(std::io::stderr).compact().boxed());

  tracing_subscriber::registry()
    .with(filter)
    .with(file_layer)
    .with(stderr_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}
