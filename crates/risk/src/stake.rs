use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use common::{ceil2, TradeResult};

use crate::config::StakeConfig;

/// Mutable part of the progressive staking state machine.
///
/// `step == 0` is IDLE, `step >= 1` is STAKED after that many consecutive
/// losses. A step above `max_step` means the controller is frozen until
/// `reset()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StakeState {
    pub step: u32,
    pub previous_stake: f64,
    /// Unix seconds of the last stake handed out; 0 = never.
    pub last_timestamp: f64,
}

/// A stake the caller may place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakeTicket {
    pub step: u32,
    pub stake: f64,
    /// The progressive stake exceeded `max_stake` and was clamped to it.
    pub capped: bool,
}

impl StakeTicket {
    pub fn reason(&self) -> Option<&'static str> {
        self.capped.then_some("cap:maxStake")
    }
}

/// Why no stake may be placed right now.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HaltReason {
    /// Too soon after the previous stake.
    Cooldown { remain_seconds: u64 },
    /// The loss streak went past `max_step`; staking stops until `reset()`.
    MaxStep { step: u32 },
}

impl HaltReason {
    pub fn reason(&self) -> &'static str {
        match self {
            HaltReason::Cooldown { .. } => "cooldown",
            HaltReason::MaxStep { .. } => "maxStep",
        }
    }
}

impl std::fmt::Display for HaltReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HaltReason::Cooldown { remain_seconds } => write!(f, "cooldown ({remain_seconds}s left)"),
            HaltReason::MaxStep { step } => write!(f, "maxStep (step {step})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StakeDecision {
    Stake(StakeTicket),
    Halt(HaltReason),
}

impl StakeDecision {
    pub fn is_ok(&self) -> bool {
        matches!(self, StakeDecision::Stake(_))
    }

    pub fn is_halt(&self) -> bool {
        !self.is_ok()
    }

    pub fn ticket(&self) -> Option<StakeTicket> {
        match self {
            StakeDecision::Stake(t) => Some(*t),
            StakeDecision::Halt(_) => None,
        }
    }

    /// Short machine-readable reason: `cooldown`, `maxStep`, `cap:maxStake`.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            StakeDecision::Stake(t) => t.reason(),
            StakeDecision::Halt(h) => Some(h.reason()),
        }
    }
}

/// Sizes the next stake from the previous trade's outcome.
///
/// Not safe for concurrent mutation: the orchestrator owns one controller per
/// running bot and calls `next` at most once per tick.
#[derive(Debug, Clone)]
pub struct StakeController {
    config: StakeConfig,
    state: StakeState,
}

impl StakeController {
    pub fn new(config: StakeConfig) -> Self {
        Self::with_state(config, StakeState::default())
    }

    /// Resume from a previously saved state.
    pub fn with_state(config: StakeConfig, state: StakeState) -> Self {
        Self {
            config: config.sanitized(),
            state,
        }
    }

    pub fn config(&self) -> &StakeConfig {
        &self.config
    }

    pub fn state(&self) -> StakeState {
        self.state
    }

    /// Swap the configuration wholesale; applies from the next call.
    pub fn set_config(&mut self, config: StakeConfig) {
        self.config = config.sanitized();
    }

    pub fn reset(&mut self) -> StakeState {
        self.state = StakeState::default();
        info!("Stake controller reset");
        self.state
    }

    /// `next_at` with the wall clock.
    pub fn next(&mut self, last_outcome: Option<TradeResult>) -> StakeDecision {
        self.next_at(last_outcome, now_seconds())
    }

    /// Compute the next stake given the previous trade's outcome
    /// (`None` on the first call of a run) at time `now` in Unix seconds.
    pub fn next_at(&mut self, last_outcome: Option<TradeResult>, now: f64) -> StakeDecision {
        let cfg = &self.config;

        if cfg.cooldown_seconds > 0.0 && self.state.last_timestamp > 0.0 {
            let elapsed = now - self.state.last_timestamp;
            if elapsed < cfg.cooldown_seconds {
                let remain_seconds = (cfg.cooldown_seconds - elapsed).ceil().max(0.0) as u64;
                debug!(remain_seconds, "Stake cooldown active");
                return StakeDecision::Halt(HaltReason::Cooldown { remain_seconds });
            }
        }

        if self.state.step > cfg.max_step {
            return StakeDecision::Halt(HaltReason::MaxStep { step: self.state.step });
        }

        let (step, raw) = match last_outcome {
            None | Some(TradeResult::Win) => (0, cfg.base_stake),
            Some(TradeResult::Loss) => {
                let step = self.state.step + 1;
                if step > cfg.max_step {
                    self.state.step = step;
                    warn!(step, max_step = cfg.max_step, "Loss streak exceeded max step, staking halted");
                    return StakeDecision::Halt(HaltReason::MaxStep { step });
                }
                (step, ceil2(self.previous_or_base() * cfg.multiplier))
            }
            Some(TradeResult::Draw) => (self.state.step, self.previous_or_base()),
        };

        let capped = raw > cfg.max_stake;
        let stake = if capped { cfg.max_stake } else { raw };
        if capped {
            debug!(raw, max_stake = cfg.max_stake, "Stake clamped to max");
        }

        self.state = StakeState {
            step,
            previous_stake: stake,
            last_timestamp: now,
        };
        StakeDecision::Stake(StakeTicket { step, stake, capped })
    }

    fn previous_or_base(&self) -> f64 {
        if self.state.previous_stake > 0.0 {
            self.state.previous_stake
        } else {
            self.config.base_stake
        }
    }
}

fn now_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const T0: f64 = 1_700_000_000.0;

    fn controller(base: f64, multiplier: f64, max_step: u32, max_stake: f64) -> StakeController {
        StakeController::new(StakeConfig {
            base_stake: base,
            multiplier,
            max_step,
            max_stake,
            ..StakeConfig::default()
        })
    }

    fn stake(d: StakeDecision) -> f64 {
        d.ticket().expect("expected a stake").stake
    }

    #[test]
    fn first_call_stakes_base() {
        let mut c = controller(1.0, 2.0, 3, 50.0);
        let d = c.next_at(None, T0);
        assert_eq!(d, StakeDecision::Stake(StakeTicket { step: 0, stake: 1.0, capped: false }));
        assert_eq!(c.state(), StakeState { step: 0, previous_stake: 1.0, last_timestamp: T0 });
    }

    #[test]
    fn loss_streak_doubles_then_halts() {
        let mut c = controller(1.0, 2.0, 3, 50.0);
        let loss = Some(TradeResult::Loss);
        assert_eq!(stake(c.next_at(loss, T0)), 2.0);
        assert_eq!(stake(c.next_at(loss, T0 + 1.0)), 4.0);
        assert_eq!(stake(c.next_at(loss, T0 + 2.0)), 8.0);

        let halt = c.next_at(loss, T0 + 3.0);
        assert_eq!(halt, StakeDecision::Halt(HaltReason::MaxStep { step: 4 }));
        assert_eq!(halt.reason(), Some("maxStep"));
        assert_eq!(c.state().step, 4);
    }

    #[test]
    fn max_step_halt_is_frozen_until_reset() {
        let mut c = controller(1.0, 2.0, 0, 50.0);
        assert!(c.next_at(Some(TradeResult::Loss), T0).is_halt());
        let before = c.state();
        assert!(c.next_at(Some(TradeResult::Win), T0 + 1.0).is_halt());
        assert!(c.next_at(None, T0 + 2.0).is_halt());
        assert_eq!(c.state(), before);

        assert_eq!(c.reset(), StakeState::default());
        assert_eq!(stake(c.next_at(None, T0 + 3.0)), 1.0);
    }

    #[test]
    fn win_resets_to_base() {
        let mut c = controller(1.0, 2.0, 5, 50.0);
        c.next_at(Some(TradeResult::Loss), T0);
        c.next_at(Some(TradeResult::Loss), T0);
        let d = c.next_at(Some(TradeResult::Win), T0);
        assert_eq!(d.ticket().unwrap().step, 0);
        assert_eq!(stake(d), 1.0);
    }

    #[test]
    fn cap_clamps_without_halting() {
        let mut c = StakeController::with_state(
            StakeConfig {
                base_stake: 10.0,
                multiplier: 3.0,
                max_stake: 25.0,
                ..StakeConfig::default()
            },
            StakeState { step: 0, previous_stake: 10.0, last_timestamp: 0.0 },
        );
        let d = c.next_at(Some(TradeResult::Loss), T0);
        assert_eq!(d, StakeDecision::Stake(StakeTicket { step: 1, stake: 25.0, capped: true }));
        assert_eq!(d.reason(), Some("cap:maxStake"));
        assert!(d.is_ok());
        assert_eq!(c.state().previous_stake, 25.0);
    }

    #[test]
    fn zero_previous_stake_falls_back_to_base() {
        let mut c = StakeController::with_state(
            StakeConfig { base_stake: 5.0, multiplier: 2.0, ..StakeConfig::default() },
            StakeState { step: 1, previous_stake: 0.0, last_timestamp: 0.0 },
        );
        assert_eq!(stake(c.next_at(Some(TradeResult::Loss), T0)), 10.0);
    }

    #[test]
    fn stake_rounds_up_to_the_cent() {
        let mut c = controller(0.67, 1.5, 5, 100.0);
        // 0.67 * 1.5 = 1.005
        assert_eq!(stake(c.next_at(Some(TradeResult::Loss), T0)), 1.01);
        // 1.01 * 1.5 = 1.515
        assert_eq!(stake(c.next_at(Some(TradeResult::Loss), T0)), 1.52);
    }

    #[test]
    fn draw_repeats_the_previous_stake() {
        let mut c = controller(1.0, 2.0, 5, 50.0);
        c.next_at(Some(TradeResult::Loss), T0);
        let d = c.next_at(Some(TradeResult::Draw), T0);
        assert_eq!(d, StakeDecision::Stake(StakeTicket { step: 1, stake: 2.0, capped: false }));
    }

    #[test]
    fn cooldown_blocks_without_mutating() {
        let mut c = StakeController::new(StakeConfig { cooldown_seconds: 30.0, ..StakeConfig::default() });
        assert!(c.next_at(None, T0).is_ok());
        let before = c.state();

        let d = c.next_at(Some(TradeResult::Loss), T0 + 10.5);
        assert_eq!(d, StakeDecision::Halt(HaltReason::Cooldown { remain_seconds: 20 }));
        assert_eq!(d.reason(), Some("cooldown"));
        assert_eq!(c.state(), before);

        let d = c.next_at(Some(TradeResult::Loss), T0 + 30.0);
        assert_eq!(stake(d), 2.0);
    }

    #[test]
    fn cooldown_checked_before_max_step() {
        let mut c = StakeController::new(StakeConfig {
            cooldown_seconds: 10.0,
            max_step: 0,
            ..StakeConfig::default()
        });
        c.next_at(None, T0);
        let d = c.next_at(Some(TradeResult::Loss), T0 + 1.0);
        assert!(matches!(d, StakeDecision::Halt(HaltReason::Cooldown { .. })));
        assert_eq!(c.state().step, 0);
    }

    #[test]
    fn config_swap_applies_on_next_call() {
        let mut c = controller(1.0, 2.0, 5, 50.0);
        c.next_at(None, T0);
        c.set_config(StakeConfig { base_stake: 3.0, multiplier: 3.0, ..StakeConfig::default() });
        assert_eq!(stake(c.next_at(Some(TradeResult::Loss), T0)), 3.0);
        assert_eq!(stake(c.next_at(Some(TradeResult::Win), T0)), 3.0);
    }
}
