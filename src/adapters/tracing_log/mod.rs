// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::EnvFilter;

use crate::domain::errors::*;
use crate::ports::LogLevel;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level` when set. Logs go to stderr so graph text
/// printed on stdout stays machine-readable. Calling this again after a
/// subscriber is installed is a no-op.
pub fn init_tracing(level: &str, json: bool) -> Result<LogLevel, DomainError> {
    let level = LogLevel::parse(level)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // already installed by an earlier call or a test harness
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    Ok(level)
}
