use super::ma::Trend;

/// On-Balance Volume slope over `lookback` bars. Confirmation only.
#[derive(Debug, Clone)]
pub struct ObvIndicator {
    pub lookback: usize,
}

impl ObvIndicator {
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }

    /// Running OBV, starting at 0 on the first bar.
    pub fn series(close: &[f64], volume: &[f64]) -> Vec<f64> {
        if close.is_empty() || close.len() != volume.len() {
            return Vec::new();
        }
        let mut obv = 0.0;
        let mut out = Vec::with_capacity(close.len());
        out.push(obv);
        for i in 1..close.len() {
            if close[i] > close[i - 1] {
                obv += volume[i];
            } else if close[i] < close[i - 1] {
                obv -= volume[i];
            }
            out.push(obv);
        }
        out
    }

    pub fn compute(&self, close: &[f64], volume: &[f64]) -> Option<Trend> {
        let obv = Self::series(close, volume);
        if self.lookback == 0 || obv.len() <= self.lookback {
            return None;
        }
        let now = obv[obv.len() - 1];
        let then = obv[obv.len() - 1 - self.lookback];
        if !now.is_finite() || !then.is_finite() {
            return None;
        }
        Some(if now > then {
            Trend::Up
        } else if now < then {
            Trend::Down
        } else {
            Trend::Flat
        })
    }
}
