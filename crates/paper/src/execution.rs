use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use common::{round2, Direction, Error, Execution, RandomSource, Result, StakeOrder, TradeFill, TradeResult};

/// Fraction of the stake paid out on a simulated win.
pub const DEFAULT_PAYOUT: f64 = 0.87;
/// Draws below this settle as a win.
pub const WIN_BELOW: f64 = 0.52;
/// Draws below this (and not a win) settle as a loss; the rest are draws.
pub const LOSS_BELOW: f64 = 0.92;

/// Simulated execution settling every order immediately from one uniform
/// draw: 52% win, 40% loss, 8% draw.
pub struct PaperExecution {
    rng: Mutex<Box<dyn RandomSource>>,
    payout_ratio: f64,
    fills: AtomicU64,
}

impl PaperExecution {
    pub fn new(rng: impl RandomSource + 'static) -> Self {
        Self::with_payout(rng, DEFAULT_PAYOUT)
    }

    pub fn with_payout(rng: impl RandomSource + 'static, payout_ratio: f64) -> Self {
        info!(payout_ratio, "PaperExecution initialized");
        Self {
            rng: Mutex::new(Box::new(rng)),
            payout_ratio,
            fills: AtomicU64::new(0),
        }
    }

    pub fn payout_ratio(&self) -> f64 {
        self.payout_ratio
    }

    /// Number of orders settled so far.
    pub fn fill_count(&self) -> u64 {
        self.fills.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Execution for PaperExecution {
    async fn submit(&self, order: &StakeOrder) -> Result<TradeFill> {
        if order.direction == Direction::Hold {
            return Err(Error::Execution(format!("order {} has no direction", order.id)));
        }
        if !order.stake.is_finite() || order.stake <= 0.0 {
            return Err(Error::Execution(format!(
                "order {} has invalid stake {}",
                order.id, order.stake
            )));
        }

        let r = self.rng.lock().await.next_f64();
        let (result, pnl) = if r < WIN_BELOW {
            (TradeResult::Win, round2(order.stake * self.payout_ratio))
        } else if r < LOSS_BELOW {
            (TradeResult::Loss, -order.stake)
        } else {
            (TradeResult::Draw, 0.0)
        };
        let n = self.fills.fetch_add(1, Ordering::Relaxed) + 1;

        debug!(
            order_id = %order.id,
            direction = %order.direction,
            stake = order.stake,
            draw = r,
            result = %result,
            pnl,
            "Paper order settled"
        );

        Ok(TradeFill {
            order_id: order.id.clone(),
            result,
            pnl,
            payout: self.payout_ratio,
            fill_info: format!("paper#{n} draw={r:.4} payout={}", self.payout_ratio),
            timestamp: Utc::now(),
        })
    }
}
