pub mod config;
pub mod error;
pub mod exchange;
pub mod params;
pub mod random;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use exchange::{Execution, MarketData};
pub use random::{RandomSource, SequenceRandom, StdRandom};
pub use types::*;
