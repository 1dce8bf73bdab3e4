use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;

#[derive(Debug, Error)]
pub enum ObservabilityError {
    #[error("invalid log filter '{directive}': {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error("invalid logger configuration: {0}")]
    InvalidConfig(String),

    #[error("remote log stream requires a running tokio runtime")]
    NoRuntime,

    #[error("global logger already initialized")]
    AlreadyInitialized(#[from] TryInitError),

    #[error("failed to build remote log stream client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
