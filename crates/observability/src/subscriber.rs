//! Process-wide tracing subscriber.
//!
//! stdout always gets a layer (JSON by default); the remote stream gets a
//! second JSON layer when configured. Both share one `EnvFilter`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{DEFAULT_LEVEL, LoggerConfig};
use crate::remote::{self, HttpShipper, RemoteMakeWriter, ShipperHandle};
use crate::stdout::ServiceStamped;
use crate::{LoggerHandle, ObservabilityError};

/// Filter directive for `config`, given the current `RUST_LOG` value.
pub(crate) fn filter_directive(config: &LoggerConfig, rust_log: Option<String>) -> String {
    if config.muted {
        return "off".to_string();
    }

    rust_log
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| config.level.clone())
}

/// Build the `EnvFilter` for `config`, honoring `RUST_LOG`.
pub fn build_filter(config: &LoggerConfig) -> Result<EnvFilter, ObservabilityError> {
    filter_from(config, rust_log())
}

fn rust_log() -> Option<String> {
    std::env::var(EnvFilter::DEFAULT_ENV).ok()
}

fn filter_from(
    config: &LoggerConfig,
    rust_log: Option<String>,
) -> Result<EnvFilter, ObservabilityError> {
    let directive = filter_directive(config, rust_log);
    EnvFilter::try_new(&directive)
        .map_err(|source| ObservabilityError::InvalidFilter { directive, source })
}

/// `RUST_LOG`, then the configured level, then [`DEFAULT_LEVEL`]: the first
/// one that parses wins.
fn lenient_filter(config: &LoggerConfig, rust_log: Option<String>) -> EnvFilter {
    filter_from(config, rust_log)
        .or_else(|e| {
            eprintln!("{e}; using level '{}'", config.level);
            filter_from(config, None)
        })
        .unwrap_or_else(|e| {
            eprintln!("{e}; using level '{DEFAULT_LEVEL}'");
            EnvFilter::new(DEFAULT_LEVEL)
        })
}

type RemoteSink = (RemoteMakeWriter, ShipperHandle);

fn start_remote(config: &LoggerConfig) -> Result<Option<RemoteSink>, ObservabilityError> {
    // A muted logger emits nothing, so there is nothing to ship.
    match config.remote.as_ref().filter(|_| !config.muted) {
        Some(remote_config) => {
            let shipper = HttpShipper::new(remote_config)?;
            remote::spawn(remote_config, config.service_name(), shipper).map(Some)
        }
        None => Ok(None),
    }
}

/// Install the global subscriber described by `config`.
///
/// Fails on the first problem: a bad filter, a remote stream that cannot
/// start, or a subscriber that is already installed.
pub fn try_init(config: &LoggerConfig) -> Result<LoggerHandle, ObservabilityError> {
    let filter = build_filter(config)?;
    let remote = start_remote(config)?;
    install(config, filter, remote)
}

/// Install the global subscriber, degrading instead of failing.
///
/// A filter that doesn't parse falls back to the configured level, then to
/// `info`. A remote stream that cannot start is reported on stderr and skipped,
/// so stdout logging is always installed. The only error left is
/// [`ObservabilityError::AlreadyInitialized`].
pub fn init_with(config: &LoggerConfig) -> Result<LoggerHandle, ObservabilityError> {
    let filter = lenient_filter(config, rust_log());
    let remote = start_remote(config).unwrap_or_else(|e| {
        eprintln!("remote log stream disabled: {e}");
        None
    });
    install(config, filter, remote)
}

fn install(
    config: &LoggerConfig,
    filter: EnvFilter,
    remote: Option<RemoteSink>,
) -> Result<LoggerHandle, ObservabilityError> {
    let service = config.service_name();
    let (remote_writer, shipper) = match remote {
        Some((writer, handle)) => (Some(writer), Some(handle)),
        None => (None, None),
    };

    let json_stdout = config.json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_timer(SystemTime)
            .with_target(false)
            .with_writer(ServiceStamped::new(service, std::io::stdout))
    });
    let text_stdout = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_timer(SystemTime)
            .with_target(false)
    });
    let remote_layer = remote_writer.map(remote::layer);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(json_stdout)
        .with(text_stdout)
        .with(remote_layer)
        .try_init();

    if let Err(e) = installed {
        if let Some(handle) = shipper {
            handle.abort();
        }
        return Err(e.into());
    }

    tracing::info!(
        service = %service,
        remote = shipper.is_some(),
        "logger initialized"
    );

    Ok(LoggerHandle::new(shipper))
}
