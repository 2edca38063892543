use tracing_subscriber::EnvFilter;

use crate::error::{Result, ToolError};

/// Installs the global tracing subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence; otherwise `verbosity` selects `warn`, `info`
/// or `debug`.
pub fn init(verbosity: u8) -> Result<()> {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}
