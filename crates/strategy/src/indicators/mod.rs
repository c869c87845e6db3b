pub mod atr;
pub mod bollinger;
pub mod ichimoku;
pub mod ma;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod stochastic;

pub use atr::AtrIndicator;
pub use bollinger::{BollingerBands, BollingerIndicator};
pub use ichimoku::{CloudPosition, IchimokuIndicator};
pub use ma::{ema_series, sma_series, EmaTrend, Trend};
pub use macd::{MacdIndicator, MacdSignal};
pub use obv::ObvIndicator;
pub use rsi::{RsiIndicator, RsiZone};
pub use stochastic::{StochasticCross, StochasticIndicator};
