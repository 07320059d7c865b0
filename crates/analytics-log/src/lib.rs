// ABOUTME: Shared logging setup for analytics binaries and tools.
// ABOUTME: init() for stderr, init_for() to focus on named crates, init_verbose() for debugging.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Crates that make up the analytics client stack.
pub const CLIENT_CRATES: &[&str] = &["analytics_client", "analytics_grpc", "analytics_cli"];

/// Standard logging to stderr. Default: INFO level, RUST_LOG override.
pub fn init() {
    install(EnvFilter::from_default_env().add_directive(Level::INFO.into()));
}

/// Crate-filtered logging to stderr. Default: INFO for the named crate, WARN for everything else.
pub fn init_for(crate_name: &str) {
    install(filter(Level::WARN, &[crate_name], Level::INFO));
}

/// DEBUG for the client crates, WARN for dependencies such as h2 and hyper.
pub fn init_verbose() {
    install(filter(Level::WARN, CLIENT_CRATES, Level::DEBUG));
}

/// Build a filter with `base` for everything and `level` for `crates`.
/// RUST_LOG directives are applied first.
pub fn filter(base: Level, crates: &[&str], level: Level) -> EnvFilter {
    crates.iter().fold(
        EnvFilter::from_default_env().add_directive(base.into()),
        |filter, name| {
            let directive = format!("{name}={}", level.as_str().to_lowercase());
            match directive.parse() {
                Ok(d) => filter.add_directive(d),
                Err(_) => filter,
            }
        },
    )
}

// A second subscriber (tests, embedding) is ignored.
fn install(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
