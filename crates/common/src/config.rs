use std::str::FromStr;

use tracing::warn;

/// Process-level configuration loaded from environment variables at startup.
///
/// Strategy and stake parameters live in the TOML file at `bot_config_path`
/// and can be reloaded at runtime; everything here is fixed for the life of
/// the process. Malformed values fall back to their defaults with a warning.
#[derive(Debug, Clone)]
pub struct Config {
    /// TOML file holding `[signal]`, `[indicators.*]` and `[stake]`.
    pub bot_config_path: String,
    /// Directory for the session snapshot and the daily event logs.
    pub data_dir: String,
    pub tick_interval_secs: u64,

    // Simulation
    pub paper_equity: f64,
    pub feed_start_price: f64,
    /// Fixed seed for every random source; entropy when unset.
    pub rng_seed: Option<u64>,

    /// Start a session as soon as the engine is up.
    pub autostart: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_config_path: "config/bot.toml".to_string(),
            data_dir: "data".to_string(),
            tick_interval_secs: 5,
            paper_equity: 1_000.0,
            feed_start_price: 100.0,
            rng_seed: None,
            autostart: true,
        }
    }
}

impl Config {
    /// Load configuration from the environment. Loads `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let defaults = Config::default();
        Config {
            bot_config_path: optional_env("BOT_CONFIG_PATH").unwrap_or(defaults.bot_config_path),
            data_dir: optional_env("DATA_DIR").unwrap_or(defaults.data_dir),
            tick_interval_secs: parsed_env("TICK_INTERVAL_SECS")
                .filter(|&s: &u64| s > 0)
                .unwrap_or(defaults.tick_interval_secs),
            paper_equity: parsed_env("PAPER_EQUITY")
                .filter(|v: &f64| v.is_finite() && *v >= 0.0)
                .unwrap_or(defaults.paper_equity),
            feed_start_price: parsed_env("FEED_START_PRICE")
                .filter(|v: &f64| v.is_finite() && *v > 0.0)
                .unwrap_or(defaults.feed_start_price),
            rng_seed: parsed_env("RNG_SEED"),
            autostart: parsed_env("AUTOSTART").unwrap_or(defaults.autostart),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = optional_env(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring malformed environment value, using default");
            None
        }
    }
}
