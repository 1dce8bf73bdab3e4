//! Logger configuration.
//!
//! Services either deserialize [`LoggerConfig`] out of their own config file or
//! build it from `LOG_*` environment variables with [`LoggerConfig::from_env`].

use serde::Deserialize;

use crate::ObservabilityError;

pub const DEFAULT_SERVICE_NAME: &str = "noname";
pub const DEFAULT_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Stamped on every JSON record, on stdout and on the remote stream.
    pub service_name: Option<String>,

    /// `EnvFilter` directive; `RUST_LOG` wins when set.
    pub level: String,

    /// JSON lines on stdout (plain text otherwise).
    pub json: bool,

    /// Suppress all output, including the remote stream.
    pub muted: bool,

    pub remote: Option<RemoteStreamConfig>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            service_name: None,
            level: DEFAULT_LEVEL.to_string(),
            json: true,
            muted: false,
            remote: None,
        }
    }
}

/// Remote log stream (HTTP ingestion endpoint) settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteStreamConfig {
    pub endpoint: String,
    pub stream_name: String,

    /// Defaults to the service name.
    #[serde(default)]
    pub partition_key: Option<String>,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Records queued beyond this are dropped.
    #[serde(default = "default_buffer")]
    pub buffer: usize,
}

fn default_batch_size() -> usize {
    50
}

fn default_flush_interval_ms() -> u64 {
    1000
}

fn default_buffer() -> usize {
    10_000
}

impl RemoteStreamConfig {
    pub fn new(endpoint: impl Into<String>, stream_name: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            stream_name: stream_name.into(),
            partition_key: None,
            batch_size: default_batch_size(),
            flush_interval_ms: default_flush_interval_ms(),
            buffer: default_buffer(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ObservabilityError> {
        if self.endpoint.trim().is_empty() {
            return Err(ObservabilityError::InvalidConfig(
                "remote endpoint cannot be empty".to_string(),
            ));
        }
        if self.stream_name.trim().is_empty() {
            return Err(ObservabilityError::InvalidConfig(
                "remote stream name cannot be empty".to_string(),
            ));
        }
        if self.batch_size == 0 || self.buffer == 0 || self.flush_interval_ms == 0 {
            return Err(ObservabilityError::InvalidConfig(
                "remote batch size, buffer and flush interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl LoggerConfig {
    pub fn service_name(&self) -> &str {
        self.service_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SERVICE_NAME)
    }

    /// Build configuration from the process environment.
    ///
    /// - `LOG_SERVICE_NAME`, `LOG_LEVEL`
    /// - `LOG_MUTE` silences the logger when it reads as the number 1
    ///   (`1`, `01`, `1.0`)
    /// - `LOG_FORMAT=text` switches stdout to plain text
    /// - `LOG_REMOTE_ENDPOINT` + `LOG_REMOTE_STREAM` enable remote shipping,
    ///   tuned by `LOG_REMOTE_PARTITION_KEY` and `LOG_REMOTE_BATCH_SIZE`
    pub fn from_env() -> Result<Self, ObservabilityError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ObservabilityError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = LoggerConfig::default();

        config.service_name = lookup("LOG_SERVICE_NAME");
        if let Some(level) = lookup("LOG_LEVEL").filter(|l| !l.trim().is_empty()) {
            config.level = level;
        }
        config.muted = lookup("LOG_MUTE").is_some_and(|v| is_one(&v));
        config.json = !lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("text"));

        match (lookup("LOG_REMOTE_ENDPOINT"), lookup("LOG_REMOTE_STREAM")) {
            (None, None) => {}
            (Some(endpoint), Some(stream)) => {
                let mut remote = RemoteStreamConfig::new(endpoint, stream);
                remote.partition_key = lookup("LOG_REMOTE_PARTITION_KEY");
                if let Some(raw) = lookup("LOG_REMOTE_BATCH_SIZE") {
                    remote.batch_size = raw.trim().parse().map_err(|_| {
                        ObservabilityError::InvalidConfig(format!(
                            "LOG_REMOTE_BATCH_SIZE must be a positive integer, got '{raw}'"
                        ))
                    })?;
                }
                remote.validate()?;
                config.remote = Some(remote);
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(ObservabilityError::InvalidConfig(
                    "LOG_REMOTE_ENDPOINT and LOG_REMOTE_STREAM must be set together".to_string(),
                ));
            }
        }

        Ok(config)
    }
}

fn is_one(raw: &str) -> bool {
    raw.trim().parse::<f64>().is_ok_and(|n| n == 1.0)
}
