use super::ma::ema_series;

/// MACD (Moving Average Convergence/Divergence) indicator.
///
/// Computes: MACD line = EMA(fast) − EMA(slow), Signal = EMA(macd_line, signal_period).
/// The vote follows where the MACD line sits relative to the signal line on
/// the latest bar.
#[derive(Debug, Clone)]
pub struct MacdIndicator {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

/// The result of a MACD computation.
#[derive(Debug, Clone, PartialEq)]
pub enum MacdSignal {
    Bullish, // MACD line above signal line
    Bearish, // MACD line below signal line
    Neutral, // Lines equal on the latest bar
}

impl MacdIndicator {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self { fast, slow, signal }
    }

    /// Latest `(macd_line, signal_line)` from close prices (oldest first).
    /// Returns `None` if there isn't enough data or the periods are unusable.
    /// Needs at least `slow + signal - 1` prices.
    pub fn lines(&self, closes: &[f64]) -> Option<(f64, f64)> {
        if self.fast == 0 || self.signal == 0 || self.fast >= self.slow {
            return None;
        }
        if closes.len() < self.slow + self.signal - 1 {
            return None;
        }

        let fast_ema = ema_series(closes, self.fast);
        let slow_ema = ema_series(closes, self.slow);
        // fast_ema starts `slow - fast` bars earlier than slow_ema
        let offset = self.slow - self.fast;
        let macd_line: Vec<f64> = slow_ema
            .iter()
            .enumerate()
            .map(|(i, slow)| fast_ema[i + offset] - slow)
            .collect();

        let signal_line = ema_series(&macd_line, self.signal);
        let macd = *macd_line.last()?;
        let signal = *signal_line.last()?;
        if !macd.is_finite() || !signal.is_finite() {
            return None;
        }
        Some((macd, signal))
    }

    pub fn compute(&self, closes: &[f64]) -> Option<MacdSignal> {
        let (macd, signal) = self.lines(closes)?;
        Some(if macd > signal {
            MacdSignal::Bullish
        } else if macd < signal {
            MacdSignal::Bearish
        } else {
            MacdSignal::Neutral
        })
    }
}
