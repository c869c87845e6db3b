use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use common::{Decision, Execution, MarketData, RandomSource, StakeOrder, TradeFill, TradeResult};
use ledger::{SessionLedger, SessionSnapshot, TradeRecord};
use risk::{HaltReason, StakeController, StakeDecision, StakeState, StakeTicket};
use strategy::SignalConfig;

use crate::config::BotConfig;

/// What one tick ended with.
#[derive(Debug, Clone, Serialize)]
pub enum TickOutcome {
    NotRunning,
    MarketDataFailed(String),
    Hold,
    Halted(HaltReason),
    ExecutionFailed(String),
    Traded { ticket: StakeTicket, fill: TradeFill },
}

#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    /// `None` when the tick stopped before scoring.
    pub decision: Option<Decision>,
    pub outcome: TickOutcome,
}

impl TickReport {
    fn early(outcome: TickOutcome) -> Self {
        Self { decision: None, outcome }
    }

    pub fn traded(&self) -> bool {
        matches!(self.outcome, TickOutcome::Traded { .. })
    }
}

/// One trading bot: owns its stake controller and ledger and drives the
/// decide, size, execute, record cycle.
pub struct Bot {
    signal: SignalConfig,
    stake: StakeController,
    ledger: SessionLedger,
    market: Arc<dyn MarketData>,
    execution: Arc<dyn Execution>,
    rng: Box<dyn RandomSource>,
    /// Result of the last settled trade, fed to the controller on the next stake.
    last_outcome: Option<TradeResult>,
    equity: f64,
    /// A maxStep halt has already been written to the ledger.
    halt_noted: bool,
}

impl Bot {
    pub fn new(
        config: BotConfig,
        ledger: SessionLedger,
        market: Arc<dyn MarketData>,
        execution: Arc<dyn Execution>,
        rng: Box<dyn RandomSource>,
        equity: f64,
    ) -> Self {
        Self {
            signal: config.signal,
            stake: StakeController::new(config.stake),
            ledger,
            market,
            execution,
            rng,
            last_outcome: None,
            equity,
            halt_noted: false,
        }
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        self.ledger.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.ledger.is_running()
    }

    pub fn equity(&self) -> f64 {
        self.equity
    }

    pub fn stake_state(&self) -> StakeState {
        self.stake.state()
    }

    pub fn signal_config(&self) -> &SignalConfig {
        &self.signal
    }

    /// Start a fresh session. Starting an already running bot is a no-op.
    pub fn start(&mut self, note: Option<&str>) -> SessionSnapshot {
        if self.ledger.is_running() {
            info!("Bot already running");
            return self.ledger.snapshot().clone();
        }
        self.reset_stake();
        self.ledger.start_session(Some(self.equity), note)
    }

    pub fn stop(&mut self, note: Option<&str>) -> SessionSnapshot {
        self.ledger.stop_session(note)
    }

    pub fn reset_session(&mut self, note: Option<&str>) -> SessionSnapshot {
        self.ledger.reset_session(note)
    }

    pub fn reset_lifetime(&mut self, note: Option<&str>) -> SessionSnapshot {
        self.ledger.reset_lifetime(note)
    }

    /// Back to step 0 with a base stake on the next trade.
    pub fn reset_stake(&mut self) -> StakeState {
        self.last_outcome = None;
        self.halt_noted = false;
        self.stake.reset()
    }

    pub fn add_note(&mut self, text: &str) -> SessionSnapshot {
        self.ledger.add_note(text)
    }

    /// Swap signal and stake parameters; the stake progression is kept.
    pub fn reload(&mut self, config: BotConfig) {
        info!(min_score = config.signal.min_score, "Bot config reloaded");
        self.signal = config.signal;
        self.stake.set_config(config.stake);
    }

    /// Run one full decision-stake-outcome cycle.
    pub async fn tick(&mut self) -> TickReport {
        if !self.ledger.is_running() {
            return TickReport::early(TickOutcome::NotRunning);
        }

        let series = match self.market.series().await {
            Ok(s) => {
                self.ledger.set_connected(true);
                s
            }
            Err(e) => {
                error!(error = %e, "Market data unavailable, skipping tick");
                self.ledger.set_connected(false);
                return TickReport::early(TickOutcome::MarketDataFailed(e.to_string()));
            }
        };

        let eval = strategy::evaluate(&series, &self.signal.indicators, self.rng.as_mut());
        let decision = strategy::decide(&eval, &self.signal, self.rng.as_mut());
        if !decision.is_actionable() {
            debug!(reasons = ?decision.reasons, "Holding");
            return TickReport { decision: Some(decision), outcome: TickOutcome::Hold };
        }

        let ticket = match self.stake.next(self.last_outcome) {
            StakeDecision::Stake(ticket) => ticket,
            StakeDecision::Halt(reason) => {
                self.on_halt(reason);
                return TickReport { decision: Some(decision), outcome: TickOutcome::Halted(reason) };
            }
        };

        let order = StakeOrder::new(decision.direction, ticket.stake, ticket.step);
        let fill = match self.execution.submit(&order).await {
            Ok(fill) => fill,
            Err(e) => {
                error!(order_id = %order.id, error = %e, "Order failed");
                // The stake was consumed without a result: repeat it next time.
                self.last_outcome = Some(TradeResult::Draw);
                return TickReport {
                    decision: Some(decision),
                    outcome: TickOutcome::ExecutionFailed(e.to_string()),
                };
            }
        };

        self.equity += fill.pnl;
        self.last_outcome = Some(fill.result);
        let record = TradeRecord::new(fill.result, fill.pnl, ticket.step, ticket.stake)
            .with_payout(fill.payout)
            .with_equity(self.equity);
        self.ledger.on_trade(record);

        info!(
            direction = %decision.direction,
            score = decision.score,
            stake = ticket.stake,
            step = ticket.step,
            capped = ticket.capped,
            result = %fill.result,
            pnl = fill.pnl,
            equity = self.equity,
            "Trade settled"
        );

        TickReport {
            decision: Some(decision),
            outcome: TickOutcome::Traded { ticket, fill },
        }
    }

    fn on_halt(&mut self, reason: HaltReason) {
        match reason {
            HaltReason::Cooldown { remain_seconds } => {
                debug!(remain_seconds, "Stake cooldown, skipping tick");
            }
            HaltReason::MaxStep { step } => {
                if !self.halt_noted {
                    warn!(step, "Max step reached, staking halted until stake reset");
                    self.ledger
                        .add_note(&format!("Halted: maxStep reached at step {step}"));
                    self.halt_noted = true;
                }
            }
        }
    }
}
