//! Runtime configuration, loaded from the process environment.
//!
//! One env var per setting, parsed with a default when unset (spec §6.2).
//! Kept deliberately thin: the round's own `Config` only knows the four
//! values it needs, this module owns everything the process needs in
//! addition (port, logging).

use crate::round;
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("NUM_PLAYERS must be 4 or 5, got {0}")]
    InvalidNumPlayers(usize),
    #[error("{0} must be a valid integer, got {1:?}")]
    InvalidInteger(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub num_players: usize,
    pub trading_duration: Duration,
    pub starting_balance: i64,
    pub ante: i64,
    pub log_level: String,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_env_or("PORT", 5000)?;
        let num_players = parse_env_or("NUM_PLAYERS", 4usize)?;
        if num_players != 4 && num_players != 5 {
            return Err(ConfigError::InvalidNumPlayers(num_players));
        }
        let trading_duration = Duration::from_secs(parse_env_or("TRADING_DURATION", 240u64)?);
        let starting_balance = parse_env_or("STARTING_BALANCE", 350i64)?;
        let ante = parse_env_or("ANTE", 50i64)?;
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_json = env::var("LOG_JSON")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Config {
            port,
            num_players,
            trading_duration,
            starting_balance,
            ante,
            log_level,
            log_json,
        })
    }

    /// The subset of configuration the engine core actually depends on.
    pub fn round_config(&self) -> round::Config {
        round::Config {
            num_players: self.num_players,
            trading_duration: self.trading_duration,
            starting_balance: self.starting_balance,
            ante: self.ante,
        }
    }
}

fn parse_env_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidInteger(key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_config_carries_the_trading_fields_only() {
        let config = Config {
            port: 5000,
            num_players: 5,
            trading_duration: Duration::from_secs(60),
            starting_balance: 350,
            ante: 50,
            log_level: "debug".into(),
            log_json: true,
        };
        let round_config = config.round_config();
        assert_eq!(round_config.num_players, 5);
        assert_eq!(round_config.trading_duration, Duration::from_secs(60));
        assert_eq!(round_config.starting_balance, 350);
        assert_eq!(round_config.ante, 50);
    }
}
