//! Tracing setup for the command-line tools.
//!
//! The library only emits `tracing` events; binaries call [`init`] once to
//! print them to stderr.  `RUST_LOG` takes precedence over the default level.
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

/// Failure to install the global subscriber.
#[derive(Debug, thiserror::Error)]
#[error("failed to install global tracing subscriber: {0}")]
pub struct LoggingError(#[from] tracing::subscriber::SetGlobalDefaultError);

/// Install a stderr subscriber.  `verbose` lowers the default level to `debug`.
pub fn init(verbose: bool) -> Result<(), LoggingError> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let subscriber = Registry::default().with(env_filter).with(stderr_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
