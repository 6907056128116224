//! Tracing subscriber bootstrap driven by [`TelemetrySettings`].

use anyhow::anyhow;
use tracing_subscriber::{fmt, EnvFilter};

use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `settings.filter`. Fails if a global
/// subscriber is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(settings)?;
    let builder = fmt().with_env_filter(filter).with_target(true);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::info!(
        target: "bookshelf-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    resolve_filter(rust_log.as_deref(), settings)
}

/// A parseable `RUST_LOG` wins; otherwise `settings.filter` must parse.
fn resolve_filter(
    rust_log: Option<&str>,
    settings: &TelemetrySettings,
) -> anyhow::Result<EnvFilter> {
    if let Some(filter) = rust_log.and_then(|directives| EnvFilter::try_new(directives).ok()) {
        return Ok(filter);
    }

    EnvFilter::try_new(&settings.filter)
        .map_err(|e| anyhow!("invalid telemetry filter '{}': {e}", settings.filter))
}
