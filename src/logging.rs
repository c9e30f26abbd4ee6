//! Tracing subscriber setup.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Map the number of `-v` flags to default filter directives.
/// `RUST_LOG` always wins when set.
pub fn default_directives(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info,scurve=info",
        2 => "debug,scurve=debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(verbosity: u8) -> AppResult<()> {
    LOGGER_INIT
        .get_or_try_init(|| {
            let env_filter = EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_directives(verbosity)))
                .map_err(|err| AppError::config(format!("invalid log filter: {err}")))?;

            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .without_time(),
                )
                .try_init()
                .map_err(|err| AppError::config(format!("logger already installed: {err}")))?;

            Ok(())
        })
        .map(|_| ())
}
