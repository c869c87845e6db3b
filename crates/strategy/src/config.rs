use serde::{Deserialize, Serialize};
use tracing::warn;

use common::params::{non_negative_f64, param_bool, param_f64, param_usize, positive_f64};

/// Signal section of the bot config file (TOML).
///
/// Example `config/bot.toml`:
/// ```toml
/// [signal]
/// min_score = 2.0
///
/// [indicators.rsi]
/// enabled = true
/// length = 14
/// oversold = 30.0
/// overbought = 70.0
///
/// [indicators.atr]
/// min_atr = 1.5
/// ```
///
/// Parsing is lenient: a missing or malformed value is replaced by its
/// documented default and never fails the load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Absolute confluence score needed for LONG/SHORT. `<= 0` turns on forced mode.
    pub min_score: f64,
    pub indicators: IndicatorConfig,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_score: 2.0,
            indicators: IndicatorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub ma: MaParams,
    pub macd: MacdParams,
    pub rsi: RsiParams,
    pub stochastic: StochasticParams,
    pub bollinger: BollingerParams,
    pub atr: AtrParams,
    pub obv: ObvParams,
    pub ichimoku: IchimokuParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaParams {
    pub enabled: bool,
    pub length: usize,
}

impl Default for MaParams {
    fn default() -> Self {
        Self { enabled: true, length: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdParams {
    pub enabled: bool,
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self { enabled: true, fast: 12, slow: 26, signal: 9 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiParams {
    pub enabled: bool,
    pub length: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { enabled: true, length: 14, oversold: 30.0, overbought: 70.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticParams {
    pub enabled: bool,
    pub k_period: usize,
    pub k_smooth: usize,
    pub d_period: usize,
    pub lower: f64,
    pub upper: f64,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            enabled: true,
            k_period: 14,
            k_smooth: 3,
            d_period: 3,
            lower: 20.0,
            upper: 80.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerParams {
    pub enabled: bool,
    pub period: usize,
    pub std_dev: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self { enabled: true, period: 20, std_dev: 2.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtrParams {
    pub enabled: bool,
    pub period: usize,
    /// Below this ATR the whole evaluation is gated as low volatility.
    pub min_atr: f64,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { enabled: true, period: 14, min_atr: 1.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObvParams {
    pub enabled: bool,
    pub lookback: usize,
}

impl Default for ObvParams {
    fn default() -> Self {
        Self { enabled: true, lookback: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IchimokuParams {
    pub enabled: bool,
    pub tenkan: usize,
    pub kijun: usize,
    pub senkou_b: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self { enabled: true, tenkan: 9, kijun: 26, senkou_b: 52 }
    }
}

impl IndicatorConfig {
    /// Every indicator switched off: the evaluator falls back to forced mode.
    pub fn all_disabled(&self) -> bool {
        !(self.ma.enabled
            || self.macd.enabled
            || self.rsi.enabled
            || self.stochastic.enabled
            || self.bollinger.enabled
            || self.atr.enabled
            || self.obv.enabled
            || self.ichimoku.enabled)
    }

    /// Copy with every indicator disabled.
    pub fn disabled() -> Self {
        let mut cfg = Self::default();
        cfg.set_all_enabled(false);
        cfg
    }

    pub fn set_all_enabled(&mut self, enabled: bool) {
        self.ma.enabled = enabled;
        self.macd.enabled = enabled;
        self.rsi.enabled = enabled;
        self.stochastic.enabled = enabled;
        self.bollinger.enabled = enabled;
        self.atr.enabled = enabled;
        self.obv.enabled = enabled;
        self.ichimoku.enabled = enabled;
    }
}

// ─── Lenient TOML loading ─────────────────────────────────────────────────────

impl SignalConfig {
    /// Build from the root table of the bot config file.
    /// Reads `[signal]` and `[indicators.*]`; anything else is ignored.
    pub fn from_toml(root: &toml::Value) -> Self {
        let defaults = Self::default();
        let signal = root.get("signal");
        let min_score = param_f64(signal, "min_score", defaults.min_score);
        let indicators = IndicatorConfig::from_toml(root.get("indicators"));
        Self { min_score, indicators }
    }

    /// Parse a TOML document; an unparseable document yields the defaults.
    pub fn from_toml_str(content: &str) -> Self {
        match toml::from_str::<toml::Table>(content) {
            Ok(root) => Self::from_toml(&toml::Value::Table(root)),
            Err(e) => {
                warn!(error = %e, "Signal config is not valid TOML, using defaults");
                Self::default()
            }
        }
    }
}

impl IndicatorConfig {
    pub fn from_toml(table: Option<&toml::Value>) -> Self {
        let d = Self::default();
        let section = |name: &str| table.and_then(|t| t.get(name));

        let ma = {
            let t = section("ma");
            MaParams {
                enabled: param_bool(t, "enabled", d.ma.enabled),
                length: param_usize(t, "length", d.ma.length),
            }
        };

        let macd = {
            let t = section("macd");
            let parsed = MacdParams {
                enabled: param_bool(t, "enabled", d.macd.enabled),
                fast: param_usize(t, "fast", d.macd.fast),
                slow: param_usize(t, "slow", d.macd.slow),
                signal: param_usize(t, "signal", d.macd.signal),
            };
            if parsed.fast < parsed.slow {
                parsed
            } else {
                warn!(fast = parsed.fast, slow = parsed.slow, "MACD fast must be below slow, using default periods");
                MacdParams { enabled: parsed.enabled, ..d.macd.clone() }
            }
        };

        let rsi = {
            let t = section("rsi");
            let parsed = RsiParams {
                enabled: param_bool(t, "enabled", d.rsi.enabled),
                length: param_usize(t, "length", d.rsi.length),
                oversold: param_f64(t, "oversold", d.rsi.oversold),
                overbought: param_f64(t, "overbought", d.rsi.overbought),
            };
            if parsed.oversold < parsed.overbought {
                parsed
            } else {
                warn!("RSI oversold must be below overbought, using default bands");
                RsiParams {
                    oversold: d.rsi.oversold,
                    overbought: d.rsi.overbought,
                    ..parsed
                }
            }
        };

        let stochastic = {
            let t = section("stochastic");
            let parsed = StochasticParams {
                enabled: param_bool(t, "enabled", d.stochastic.enabled),
                k_period: param_usize(t, "k_period", d.stochastic.k_period),
                k_smooth: param_usize(t, "k_smooth", d.stochastic.k_smooth),
                d_period: param_usize(t, "d_period", d.stochastic.d_period),
                lower: param_f64(t, "lower", d.stochastic.lower),
                upper: param_f64(t, "upper", d.stochastic.upper),
            };
            if parsed.lower < parsed.upper {
                parsed
            } else {
                warn!("Stochastic lower band must be below upper, using default bands");
                StochasticParams {
                    lower: d.stochastic.lower,
                    upper: d.stochastic.upper,
                    ..parsed
                }
            }
        };

        let bollinger = {
            let t = section("bollinger");
            BollingerParams {
                enabled: param_bool(t, "enabled", d.bollinger.enabled),
                period: param_usize(t, "period", d.bollinger.period),
                std_dev: positive_f64(t, "std_dev", d.bollinger.std_dev),
            }
        };

        let atr = {
            let t = section("atr");
            AtrParams {
                enabled: param_bool(t, "enabled", d.atr.enabled),
                period: param_usize(t, "period", d.atr.period),
                min_atr: non_negative_f64(t, "min_atr", d.atr.min_atr),
            }
        };

        let obv = {
            let t = section("obv");
            ObvParams {
                enabled: param_bool(t, "enabled", d.obv.enabled),
                lookback: param_usize(t, "lookback", d.obv.lookback),
            }
        };

        let ichimoku = {
            let t = section("ichimoku");
            IchimokuParams {
                enabled: param_bool(t, "enabled", d.ichimoku.enabled),
                tenkan: param_usize(t, "tenkan", d.ichimoku.tenkan),
                kijun: param_usize(t, "kijun", d.ichimoku.kijun),
                senkou_b: param_usize(t, "senkou_b", d.ichimoku.senkou_b),
            }
        };

        Self { ma, macd, rsi, stochastic, bollinger, atr, obv, ichimoku }
    }
}
