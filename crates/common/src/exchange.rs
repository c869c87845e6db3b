use async_trait::async_trait;

use crate::{PriceSeries, Result, StakeOrder, TradeFill};

/// Source of the price series the evaluator reads on every tick.
///
/// `RandomWalkFeed` in `crates/paper` implements this for simulation.
/// The series is expected to be time-aligned already; no format negotiation
/// happens here.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Return the latest series, oldest bar first.
    async fn series(&self) -> Result<PriceSeries>;
}

/// Abstraction over the venue that settles a staked decision.
///
/// `PaperExecution` implements this with the random-outcome model. Only the
/// orchestrator's `Bot` should hold a `dyn Execution`; every stake must come
/// out of the Stake Controller before it reaches `submit`.
#[async_trait]
pub trait Execution: Send + Sync {
    /// Place the stake and wait for its settlement.
    async fn submit(&self, order: &StakeOrder) -> Result<TradeFill>;
}
