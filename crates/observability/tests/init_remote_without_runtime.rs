//! A remote stream that cannot start must not take stdout logging down with it.

use crumbs_observability::{LoggerConfig, RemoteStreamConfig};
use tracing::Level;

#[test]
fn remote_outside_runtime_still_installs_stdout_logging() {
    // SAFETY: the only test in this binary, and nothing has spawned threads
    // that read the environment yet.
    unsafe {
        std::env::remove_var("RUST_LOG");
    }

    let config = LoggerConfig {
        service_name: Some("crumbs-api".to_string()),
        remote: Some(RemoteStreamConfig::new(
            "http://127.0.0.1:9/ingest",
            "crumbs-logs",
        )),
        ..LoggerConfig::default()
    };

    let handle = crumbs_observability::init_with(&config).expect("stdout logging installed");
    assert!(!handle.is_shipping());
    assert!(tracing::dispatcher::has_been_set());
    assert!(tracing::enabled!(Level::INFO));
    assert!(!tracing::enabled!(Level::DEBUG));
}
