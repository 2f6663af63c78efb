//! Environment-driven application configuration.

use std::env;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Tokens deducted per seat at game start.
    pub default_stake: i64,
    /// Delay before a bot's chosen card is shown on the table.
    pub bot_preview_delay: Duration,
    /// Delay before the previewed card is actually committed.
    pub bot_commit_delay: Duration,
    /// Thinking time before a bot answers a trut challenge.
    pub bot_think_delay: Duration,
    /// Pause before broadcasting a freshly dealt round.
    pub round_reveal_delay: Duration,
    /// Matchmaking sweep interval.
    pub matchmaking_interval: Duration,
    /// How long the oldest 2v2 request waits before matching short.
    pub matchmaking_fill_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            host: env::var("TRUT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("TRUT_PORT", 8080)?,
            default_stake: parse_var("TRUT_STAKE", 300)?,
            bot_preview_delay: Duration::from_millis(parse_var("TRUT_BOT_PREVIEW_MS", 200)?),
            bot_commit_delay: Duration::from_millis(parse_var("TRUT_BOT_COMMIT_MS", 1200)?),
            bot_think_delay: Duration::from_millis(parse_var("TRUT_BOT_THINK_MS", 1500)?),
            round_reveal_delay: Duration::from_millis(parse_var("TRUT_ROUND_REVEAL_MS", 200)?),
            matchmaking_interval: Duration::from_millis(parse_var("TRUT_MATCH_SWEEP_MS", 3000)?),
            matchmaking_fill_timeout: Duration::from_millis(parse_var(
                "TRUT_MATCH_FILL_TIMEOUT_MS",
                15_000,
            )?),
        })
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{name} has an unparsable value: {raw}"))),
        Err(_) => Ok(default),
    }
}
