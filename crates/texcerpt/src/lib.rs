pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod ui;

/// Install the stderr log subscriber. Safe to call more than once.
pub fn init(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
