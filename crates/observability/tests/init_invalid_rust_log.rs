//! `init()` with a `RUST_LOG` that doesn't parse.

use tracing::Level;

#[test]
fn invalid_rust_log_falls_back_to_log_level() {
    // SAFETY: the only test in this binary, and nothing has spawned threads
    // that read the environment yet.
    unsafe {
        std::env::set_var("RUST_LOG", "crumbs=loud");
        std::env::set_var("LOG_LEVEL", "warn");
        std::env::remove_var("LOG_MUTE");
        std::env::remove_var("LOG_REMOTE_ENDPOINT");
        std::env::remove_var("LOG_REMOTE_STREAM");
    }

    crumbs_observability::init();

    assert!(tracing::dispatcher::has_been_set());
    assert!(tracing::enabled!(Level::WARN));
    assert!(!tracing::enabled!(Level::INFO));

    // Calling again is a no-op.
    crumbs_observability::init();
    assert!(!tracing::enabled!(Level::INFO));
}
