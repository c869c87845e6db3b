//! Simulated collaborators for dry runs: no venue is ever contacted.

pub mod execution;
pub mod feed;

pub use execution::{PaperExecution, DEFAULT_PAYOUT, LOSS_BELOW, WIN_BELOW};
pub use feed::RandomWalkFeed;
