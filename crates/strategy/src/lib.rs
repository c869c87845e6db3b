pub mod config;
pub mod evaluator;
pub mod indicators;
pub mod scorer;

pub use config::{IndicatorConfig, SignalConfig};
pub use evaluator::{evaluate, Evaluation, GateBlock, Vote, VoteDirection, MIN_SERIES_LEN};
pub use scorer::{decide, score};
