pub mod config;
pub mod stake;

pub use config::StakeConfig;
pub use stake::{HaltReason, StakeController, StakeDecision, StakeState, StakeTicket};
