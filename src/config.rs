//! Runtime configuration.
//!
//! Values are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults (owner `0`, 1024 order slots per market, `info`)
//! 2. A configuration file, when loaded with [`ExchangeConfig::from_file`]
//! 3. `DEX_*` environment variables, e.g. `DEX_OWNER=7` or
//!    `DEX_BOOK_CAPACITY=4096`

use serde::{Deserialize, Serialize};

/// Exchange configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Account allowed to register tokens
    pub owner: u64,
    /// Order slots pre-allocated for each market's book
    pub book_capacity: usize,
    /// Fallback tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            owner: 0,
            book_capacity: 1024,
            log_filter: "info".to_string(),
        }
    }
}

impl ExchangeConfig {
    /// Load configuration from `DEX_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let cfg = Self::defaults()?
            .add_source(Self::environment())
            .build()?;

        cfg.try_deserialize()
    }

    /// Load configuration from file, overridden by the environment
    pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
        let cfg = Self::defaults()?
            .add_source(config::File::with_name(path))
            .add_source(Self::environment())
            .build()?;

        cfg.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("owner", defaults.owner.to_string())?
            .set_default("book_capacity", defaults.book_capacity.to_string())?
            .set_default("log_filter", defaults.log_filter)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("DEX").try_parsing(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ExchangeConfig::default();

        assert_eq!(config.owner, 0);
        assert_eq!(config.book_capacity, 1024);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("token-dex-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "owner = 42\nbook_capacity = 16").unwrap();

        let config = ExchangeConfig::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.owner, 42);
        assert_eq!(config.book_capacity, 16);
        assert_eq!(config.log_filter, "info");
    }
}
