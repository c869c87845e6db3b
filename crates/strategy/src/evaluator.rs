use serde::{Deserialize, Serialize};
use tracing::debug;

use common::{PriceSeries, RandomSource};

use crate::config::IndicatorConfig;
use crate::indicators::{
    AtrIndicator, BollingerIndicator, CloudPosition, EmaTrend, IchimokuIndicator, MacdIndicator,
    MacdSignal, ObvIndicator, RsiIndicator, RsiZone, StochasticCross, StochasticIndicator, Trend,
};

/// Bars required before any indicator is consulted.
pub const MIN_SERIES_LEN: usize = 60;

/// Weight of a primary signal vote.
pub const FULL_WEIGHT: f64 = 1.0;
/// Weight of a confirmation-only vote (OBV, Ichimoku).
pub const HALF_WEIGHT: f64 = 0.5;

pub const FORCED_LABEL: &str = "forced";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteDirection {
    Long,
    Short,
    Neutral,
}

/// One indicator's opinion on the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    /// Indicator key as used in the config file.
    pub name: String,
    /// Human-readable fact behind the vote, e.g. `MACD>signal`.
    pub label: String,
    pub direction: VoteDirection,
    pub weight: f64,
}

impl Vote {
    fn new(name: &str, label: impl Into<String>, direction: VoteDirection, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            label: label.into(),
            direction,
            weight,
        }
    }

    /// Signed contribution to the confluence score.
    pub fn signed_weight(&self) -> f64 {
        match self.direction {
            VoteDirection::Long => self.weight,
            VoteDirection::Short => -self.weight,
            VoteDirection::Neutral => 0.0,
        }
    }
}

/// Hard precondition that overrides every vote for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GateBlock {
    /// Series shorter than `MIN_SERIES_LEN`.
    Warmup { len: usize },
    /// ATR below the configured minimum.
    LowVolatility { atr: f64, min_atr: f64 },
}

impl GateBlock {
    pub fn reason(&self) -> &'static str {
        match self {
            GateBlock::Warmup { .. } => "warmup",
            GateBlock::LowVolatility { .. } => "low-volatility",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub votes: Vec<Vote>,
    pub gate: Option<GateBlock>,
    /// Every indicator was disabled; `votes` holds the single coin-flip vote.
    pub forced: bool,
}

impl Evaluation {
    fn gated(gate: GateBlock) -> Self {
        Self { votes: Vec::new(), gate: Some(gate), forced: false }
    }

    pub fn is_gate_blocked(&self) -> bool {
        self.gate.is_some()
    }
}

/// A 50/50 LONG/SHORT vote with zero weight.
pub fn forced_vote(rng: &mut dyn RandomSource) -> Vote {
    let direction = if rng.coin() { VoteDirection::Long } else { VoteDirection::Short };
    Vote::new(FORCED_LABEL, FORCED_LABEL, direction, 0.0)
}

/// Run every enabled indicator against `series`.
///
/// The evaluator owns no state; `rng` is only drawn from in forced mode.
/// Indicators that cannot produce a value are skipped without a vote.
pub fn evaluate(series: &PriceSeries, cfg: &IndicatorConfig, rng: &mut dyn RandomSource) -> Evaluation {
    if cfg.all_disabled() {
        let vote = forced_vote(rng);
        debug!(direction = ?vote.direction, "All indicators disabled, forced signal");
        return Evaluation { votes: vec![vote], gate: None, forced: true };
    }

    if series.len() < MIN_SERIES_LEN {
        return Evaluation::gated(GateBlock::Warmup { len: series.len() });
    }

    let (high, low, close, volume) = (series.high(), series.low(), series.close(), series.volume());
    let mut votes = Vec::new();

    if cfg.ma.enabled {
        if let Some(trend) = EmaTrend::new(cfg.ma.length).compute(close) {
            votes.push(match trend {
                Trend::Up => Vote::new("ma", "EMA up", VoteDirection::Long, FULL_WEIGHT),
                Trend::Down => Vote::new("ma", "EMA down", VoteDirection::Short, FULL_WEIGHT),
                Trend::Flat => Vote::new("ma", "EMA flat", VoteDirection::Neutral, FULL_WEIGHT),
            });
        }
    }

    if cfg.macd.enabled {
        let p = &cfg.macd;
        if let Some(signal) = MacdIndicator::new(p.fast, p.slow, p.signal).compute(close) {
            votes.push(match signal {
                MacdSignal::Bullish => Vote::new("macd", "MACD>signal", VoteDirection::Long, FULL_WEIGHT),
                MacdSignal::Bearish => Vote::new("macd", "MACD<signal", VoteDirection::Short, FULL_WEIGHT),
                MacdSignal::Neutral => Vote::new("macd", "MACD=signal", VoteDirection::Neutral, FULL_WEIGHT),
            });
        }
    }

    if cfg.rsi.enabled {
        let p = &cfg.rsi;
        if let Some(zone) = RsiIndicator::new(p.length, p.oversold, p.overbought).compute(close) {
            debug!(rsi = zone.value(), "RSI computed");
            votes.push(match zone {
                RsiZone::Oversold(_) => {
                    Vote::new("rsi", format!("RSI<={}", p.oversold), VoteDirection::Long, FULL_WEIGHT)
                }
                RsiZone::Overbought(_) => {
                    Vote::new("rsi", format!("RSI>={}", p.overbought), VoteDirection::Short, FULL_WEIGHT)
                }
                RsiZone::Between(v) => Vote::new("rsi", format!("RSI {v:.1}"), VoteDirection::Neutral, FULL_WEIGHT),
            });
        }
    }

    if cfg.stochastic.enabled {
        let p = &cfg.stochastic;
        let stoch = StochasticIndicator::new(p.k_period, p.k_smooth, p.d_period, p.lower, p.upper);
        if let Some(cross) = stoch.compute(high, low, close) {
            votes.push(match cross {
                StochasticCross::BullishInBand { .. } => Vote::new(
                    "stochastic",
                    format!("Stoch cross up <={}", p.lower),
                    VoteDirection::Long,
                    FULL_WEIGHT,
                ),
                StochasticCross::BearishInBand { .. } => Vote::new(
                    "stochastic",
                    format!("Stoch cross down >={}", p.upper),
                    VoteDirection::Short,
                    FULL_WEIGHT,
                ),
                StochasticCross::None => {
                    Vote::new("stochastic", "Stoch no cross", VoteDirection::Neutral, FULL_WEIGHT)
                }
            });
        }
    }

    if cfg.bollinger.enabled {
        let p = &cfg.bollinger;
        if let (Some(bands), Some(price)) =
            (BollingerIndicator::new(p.period, p.std_dev).compute(close), series.last_close())
        {
            votes.push(if price <= bands.lower {
                Vote::new("bollinger", "BB lower", VoteDirection::Long, FULL_WEIGHT)
            } else if price >= bands.upper {
                Vote::new("bollinger", "BB upper", VoteDirection::Short, FULL_WEIGHT)
            } else {
                Vote::new("bollinger", "BB inside", VoteDirection::Neutral, FULL_WEIGHT)
            });
        }
    }

    if cfg.atr.enabled {
        if let Some(atr) = AtrIndicator::new(cfg.atr.period).compute(high, low, close) {
            if atr < cfg.atr.min_atr {
                debug!(atr, min_atr = cfg.atr.min_atr, discarded = votes.len(), "ATR gate closed");
                return Evaluation::gated(GateBlock::LowVolatility { atr, min_atr: cfg.atr.min_atr });
            }
        }
    }

    if cfg.obv.enabled {
        if let Some(trend) = ObvIndicator::new(cfg.obv.lookback).compute(close, volume) {
            votes.push(match trend {
                Trend::Up => Vote::new("obv", "OBV up", VoteDirection::Long, HALF_WEIGHT),
                Trend::Down => Vote::new("obv", "OBV down", VoteDirection::Short, HALF_WEIGHT),
                Trend::Flat => Vote::new("obv", "OBV flat", VoteDirection::Neutral, HALF_WEIGHT),
            });
        }
    }

    if cfg.ichimoku.enabled {
        let p = &cfg.ichimoku;
        if let Some(pos) = IchimokuIndicator::new(p.tenkan, p.kijun, p.senkou_b).compute(high, low, close) {
            votes.push(match pos {
                CloudPosition::Above => {
                    Vote::new("ichimoku", "Ichimoku above cloud", VoteDirection::Long, HALF_WEIGHT)
                }
                CloudPosition::Below => {
                    Vote::new("ichimoku", "Ichimoku below cloud", VoteDirection::Short, HALF_WEIGHT)
                }
                CloudPosition::Inside => {
                    Vote::new("ichimoku", "Ichimoku in cloud", VoteDirection::Neutral, HALF_WEIGHT)
                }
            });
        }
    }

    debug!(votes = votes.len(), "Evaluation complete");
    Evaluation { votes, gate: None, forced: false }
}
