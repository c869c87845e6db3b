use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Bars aligned in time, index 0 = oldest.
///
/// All five columns always have the same length; `PriceSeries::new` rejects
/// anything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    volume: Vec<f64>,
}

impl PriceSeries {
    pub fn new(
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        volume: Vec<f64>,
    ) -> Result<Self> {
        let n = close.len();
        if open.len() != n || high.len() != n || low.len() != n || volume.len() != n {
            return Err(Error::InvalidSeries(format!(
                "column lengths differ: open={} high={} low={} close={} volume={}",
                open.len(),
                high.len(),
                low.len(),
                n,
                volume.len()
            )));
        }
        Ok(Self { open, high, low, close, volume })
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn volume(&self) -> &[f64] {
        &self.volume
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }
}

/// Direction of a decision produced by the confluence scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
    Hold,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
            Direction::Hold => write!(f, "HOLD"),
        }
    }
}

/// Output of the confluence scorer for one tick. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub direction: Direction,
    pub score: f64,
    /// Labels of the votes that contributed, in evaluation order.
    pub reasons: Vec<String>,
}

impl Decision {
    pub fn hold(reason: impl Into<String>) -> Self {
        Self {
            direction: Direction::Hold,
            score: 0.0,
            reasons: vec![reason.into()],
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.direction != Direction::Hold
    }
}

/// Settlement result of one staked trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeResult {
    Win,
    #[serde(alias = "LOSE")]
    Loss,
    Draw,
}

impl TradeResult {
    /// Case-insensitive parse; `LOSE` and `LOSS` both map to a loss and
    /// anything unrecognized counts as a draw.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WIN" => TradeResult::Win,
            "LOSS" | "LOSE" => TradeResult::Loss,
            _ => TradeResult::Draw,
        }
    }
}

impl std::fmt::Display for TradeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeResult::Win => write!(f, "WIN"),
            TradeResult::Loss => write!(f, "LOSS"),
            TradeResult::Draw => write!(f, "DRAW"),
        }
    }
}

/// A sized decision handed to the execution collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeOrder {
    pub id: String,
    pub direction: Direction,
    pub stake: f64,
    pub step: u32,
}

impl StakeOrder {
    pub fn new(direction: Direction, stake: f64, step: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            direction,
            stake,
            step,
        }
    }
}

/// Settlement returned by the execution collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeFill {
    pub order_id: String,
    pub result: TradeResult,
    /// Signed profit of the trade in account currency.
    pub pnl: f64,
    /// Payout ratio the venue settled a win at.
    pub payout: f64,
    /// Free-form venue detail (simulated ids, quotes) for the audit log.
    pub fill_info: String,
    pub timestamp: DateTime<Utc>,
}

/// Control commands accepted by the engine task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineCommand {
    /// Begin a fresh session; also resets the stake progression.
    Start,
    Stop,
    ResetSession,
    ResetLifetime,
    ResetStake,
    AddNote(String),
    /// Re-read the bot config file; applies from the next tick.
    Reload,
    Shutdown,
}

/// Round up to the next cent, away from zero.
///
/// The value is first snapped to a micro-cent grid so representation noise
/// (`0.1 * 3 = 0.30000000000000004`) does not push it into the next cent,
/// while a genuine half cent (`1.005`) still rounds up.
pub fn ceil2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let cents = (value.abs() * 100.0 * 1e6).round() / 1e6;
    value.signum() * cents.ceil() / 100.0
}

/// Round half away from zero to the nearest cent.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let cents = (value.abs() * 100.0 * 1e6).round() / 1e6;
    value.signum() * cents.round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_rejects_mismatched_columns() {
        let err = PriceSeries::new(vec![1.0], vec![1.0], vec![1.0], vec![1.0, 2.0], vec![1.0]);
        assert!(matches!(err, Err(Error::InvalidSeries(_))));
    }

    #[test]
    fn series_exposes_columns() {
        let s = PriceSeries::new(
            vec![1.0, 2.0],
            vec![1.5, 2.5],
            vec![0.5, 1.5],
            vec![1.2, 2.2],
            vec![10.0, 20.0],
        )
        .unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.last_close(), Some(2.2));
        assert_eq!(s.volume(), &[10.0, 20.0]);
    }

    #[test]
    fn ceil2_rounds_half_cent_up() {
        assert_eq!(ceil2(1.005), 1.01);
        assert_eq!(ceil2(2.0), 2.0);
        assert_eq!(ceil2(1.001), 1.01);
    }

    #[test]
    fn ceil2_ignores_representation_noise() {
        assert_eq!(ceil2(0.1 * 3.0), 0.3);
        assert_eq!(ceil2(1.1 * 1.1), 1.21);
    }

    #[test]
    fn ceil2_rounds_negative_away_from_zero() {
        assert_eq!(ceil2(-1.001), -1.01);
    }

    #[test]
    fn round2_is_nearest_cent() {
        assert_eq!(round2(0.87 * 3.0), 2.61);
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235), 1.24);
    }

    #[test]
    fn trade_result_parses_leniently() {
        assert_eq!(TradeResult::parse_lenient("win"), TradeResult::Win);
        assert_eq!(TradeResult::parse_lenient("Lose"), TradeResult::Loss);
        assert_eq!(TradeResult::parse_lenient("LOSS"), TradeResult::Loss);
        assert_eq!(TradeResult::parse_lenient("push"), TradeResult::Draw);
    }

    #[test]
    fn trade_result_accepts_lose_alias() {
        let r: TradeResult = serde_json::from_str("\"LOSE\"").unwrap();
        assert_eq!(r, TradeResult::Loss);
    }
}
