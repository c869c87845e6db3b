pub mod bot;
pub mod config;
pub mod lifecycle;

pub use bot::{Bot, TickOutcome, TickReport};
pub use config::{load_bot_config, BotConfig};
pub use lifecycle::{Engine, EngineHandle};
