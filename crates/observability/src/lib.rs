//! Tracing and structured logging (shared setup).
//!
//! Records go to stdout as JSON lines and, when configured, to a remote log
//! stream. Use the `tracing` macros for `info!`, `warn!` and `error!`; this
//! crate adds [`fatal!`].

pub mod config;
pub mod error;
pub mod remote;
mod stdout;
pub mod subscriber;

pub use config::{LoggerConfig, RemoteStreamConfig};
pub use error::ObservabilityError;
pub use remote::{HttpShipper, LogRecord, LogShipper};
pub use subscriber::{build_filter, init_with, try_init};

/// Initialize process-wide logging from `LOG_*` environment variables.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
/// An unreadable environment falls back to the defaults, and the rest of the
/// fallbacks are those of [`init_with`]: stdout logging is always installed.
pub fn init() {
    let config = LoggerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("ignoring logger environment: {e}");
        LoggerConfig::default()
    });

    // Remote shipping keeps running after the handle is dropped.
    let _ = init_with(&config);
}

/// Keeps track of the remote shipper installed by [`try_init`].
#[derive(Debug)]
pub struct LoggerHandle {
    shipper: Option<remote::ShipperHandle>,
}

impl LoggerHandle {
    pub(crate) fn new(shipper: Option<remote::ShipperHandle>) -> Self {
        Self { shipper }
    }

    pub fn is_shipping(&self) -> bool {
        self.shipper.is_some()
    }

    /// Records dropped because the remote queue was full.
    pub fn dropped_records(&self) -> u64 {
        self.shipper.as_ref().map_or(0, remote::ShipperHandle::dropped)
    }

    /// Flush queued records to the remote stream and stop shipping.
    pub async fn shutdown(self) {
        if let Some(shipper) = self.shipper {
            shipper.shutdown().await;
        }
    }
}

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}

/// Log at the highest severity: an `error` record tagged `fatal = true`.
///
/// ```ignore
/// crumbs_observability::fatal!(login_id = "3", "claims store unreachable");
/// ```
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {
        $crate::__private::tracing::error!(fatal = true, $($arg)+)
    };
}
