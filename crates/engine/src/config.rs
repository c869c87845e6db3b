use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use common::Result;
use risk::StakeConfig;
use strategy::SignalConfig;

/// Everything the bot reads from its TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    pub signal: SignalConfig,
    pub stake: StakeConfig,
}

impl BotConfig {
    /// Parse a whole document. Only a syntax error fails; missing or
    /// malformed values fall back to their defaults.
    pub fn parse(content: &str) -> Result<Self> {
        let root = toml::Value::Table(toml::from_str::<toml::Table>(content)?);
        Ok(Self {
            signal: SignalConfig::from_toml(&root),
            stake: StakeConfig::from_toml(&root),
        })
    }
}

/// Load the bot config file. A missing or unparseable file yields the
/// defaults, so the bot always has something to run with.
pub fn load_bot_config(path: impl AsRef<Path>) -> BotConfig {
    let path = path.as_ref();
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Bot config not readable, using defaults");
            return BotConfig::default();
        }
    };

    match BotConfig::parse(&content) {
        Ok(cfg) => {
            info!(
                path = %path.display(),
                min_score = cfg.signal.min_score,
                base_stake = cfg.stake.base_stake,
                max_step = cfg.stake.max_step,
                "Bot config loaded"
            );
            cfg
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Bot config is not valid TOML, using defaults");
            BotConfig::default()
        }
    }
}
