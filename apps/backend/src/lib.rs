//! Trut backend: real-time multi-mode trick-taking game server.

pub mod ai;
pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod health;
pub mod live;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod ws;

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
