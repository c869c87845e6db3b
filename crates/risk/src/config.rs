use serde::{Deserialize, Serialize};
use tracing::warn;

use common::params::{param_count, param_f64};

/// Progressive staking parameters, `[stake]` in the bot config file.
///
/// ```toml
/// [stake]
/// base_stake = 1.0
/// multiplier = 2.0
/// max_step = 5
/// max_stake = 100.0
/// cooldown_seconds = 0
/// payout_ratio = 0.87
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakeConfig {
    /// Stake placed at step 0 and after every win.
    pub base_stake: f64,
    /// Factor applied to the previous stake after a loss.
    pub multiplier: f64,
    /// Highest loss step that may still be staked.
    pub max_step: u32,
    /// Hard ceiling on a single stake; larger stakes are clamped.
    pub max_stake: f64,
    /// Minimum spacing between two stakes. 0 disables the cooldown.
    pub cooldown_seconds: f64,
    /// Fraction of the stake paid out on a win.
    pub payout_ratio: f64,
}

impl Default for StakeConfig {
    fn default() -> Self {
        Self {
            base_stake: 1.0,
            multiplier: 2.0,
            max_step: 5,
            max_stake: 100.0,
            cooldown_seconds: 0.0,
            payout_ratio: 0.87,
        }
    }
}

impl StakeConfig {
    /// Replace every out-of-range field with its default.
    pub fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            base_stake: checked(self.base_stake, d.base_stake, "base_stake", |v| v > 0.0),
            multiplier: checked(self.multiplier, d.multiplier, "multiplier", |v| v > 0.0),
            max_step: self.max_step,
            max_stake: checked(self.max_stake, d.max_stake, "max_stake", |v| v > 0.0),
            cooldown_seconds: checked(self.cooldown_seconds, d.cooldown_seconds, "cooldown_seconds", |v| {
                v >= 0.0
            }),
            payout_ratio: checked(self.payout_ratio, d.payout_ratio, "payout_ratio", |v| v >= 0.0),
        }
    }

    /// Build from the root table of the bot config file, reading `[stake]`.
    pub fn from_toml(root: &toml::Value) -> Self {
        let d = Self::default();
        let t = root.get("stake");
        let max_step = param_count(t, "max_step", u64::from(d.max_step));
        Self {
            base_stake: param_f64(t, "base_stake", d.base_stake),
            multiplier: param_f64(t, "multiplier", d.multiplier),
            max_step: u32::try_from(max_step).unwrap_or(d.max_step),
            max_stake: param_f64(t, "max_stake", d.max_stake),
            cooldown_seconds: param_f64(t, "cooldown_seconds", d.cooldown_seconds),
            payout_ratio: param_f64(t, "payout_ratio", d.payout_ratio),
        }
        .sanitized()
    }
}

fn checked(value: f64, default: f64, key: &str, ok: impl Fn(f64) -> bool) -> f64 {
    if value.is_finite() && ok(value) {
        value
    } else {
        warn!(key, value, default, "Stake parameter out of range, using default");
        default
    }
}
