//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

/// Map generation strategy selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapStrategy {
    /// Structured horizontal/vertical wall corridors (default)
    Corridors,
    /// Uniform random scatter of destructible tiles
    Scatter,
}

impl FromStr for MapStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "corridors" => Ok(Self::Corridors),
            "scatter" => Ok(Self::Scatter),
            other => Err(ConfigError::InvalidStrategy(other.to_string())),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS (comma-separated); unset = allow any
    pub client_origin: Option<String>,
    /// Fixed arena seed; unset = random seed per server start
    pub map_seed: Option<u64>,
    /// Arena generation strategy
    pub map_strategy: MapStrategy,
    /// Destructible tile probability for the scatter strategy (0.0..1.0)
    pub map_density: f32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        };

        let map_seed = match env::var("MAP_SEED") {
            Ok(raw) => Some(raw.parse().map_err(|_| ConfigError::InvalidSeed(raw))?),
            Err(_) => None,
        };

        let map_strategy = match env::var("MAP_STRATEGY") {
            Ok(raw) => raw.parse()?,
            Err(_) => MapStrategy::Corridors,
        };

        let map_density = match env::var("MAP_DENSITY") {
            Ok(raw) => {
                let density: f32 = raw
                    .parse()
                    .map_err(|_| ConfigError::InvalidDensity(raw.clone()))?;
                if !(0.0..=1.0).contains(&density) {
                    return Err(ConfigError::InvalidDensity(raw));
                }
                density
            }
            Err(_) => 0.2,
        };

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            client_origin: env::var("CLIENT_ORIGIN").ok(),
            map_seed,
            map_strategy,
            map_density,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address format")]
    InvalidAddress,

    #[error("Invalid map seed: {0}")]
    InvalidSeed(String),

    #[error("Unknown map strategy: {0} (expected 'corridors' or 'scatter')")]
    InvalidStrategy(String),

    #[error("Invalid map density: {0} (expected a value in 0.0..=1.0)")]
    InvalidDensity(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_known_names() {
        assert_eq!(
            "corridors".parse::<MapStrategy>().unwrap(),
            MapStrategy::Corridors
        );
        assert_eq!(
            "scatter".parse::<MapStrategy>().unwrap(),
            MapStrategy::Scatter
        );
        assert!("maze".parse::<MapStrategy>().is_err());
    }
}
