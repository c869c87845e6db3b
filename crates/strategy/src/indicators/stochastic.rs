use super::ma::sma_series;

/// Slow stochastic oscillator (%K smoothed, %D = SMA of smoothed %K).
///
/// A vote is only produced when %K crosses %D inside one of the bands:
/// upward while %K sits at or below `lower`, downward while at or above `upper`.
#[derive(Debug, Clone)]
pub struct StochasticIndicator {
    pub k_period: usize,
    pub k_smooth: usize,
    pub d_period: usize,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StochasticCross {
    /// %K crossed above %D in the oversold band.
    BullishInBand { k: f64 },
    /// %K crossed below %D in the overbought band.
    BearishInBand { k: f64 },
    None,
}

impl StochasticIndicator {
    pub fn new(k_period: usize, k_smooth: usize, d_period: usize, lower: f64, upper: f64) -> Self {
        Self { k_period, k_smooth, d_period, lower, upper }
    }

    /// `(%K, %D)` pairs, oldest first. A flat high/low window reads as 50.
    pub fn lines(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<(f64, f64)> {
        let n = close.len();
        if self.k_period == 0 || n < self.k_period || high.len() != n || low.len() != n {
            return Vec::new();
        }

        let raw: Vec<f64> = (self.k_period - 1..n)
            .map(|i| {
                let start = i + 1 - self.k_period;
                let hh = high[start..=i].iter().copied().fold(f64::MIN, f64::max);
                let ll = low[start..=i].iter().copied().fold(f64::MAX, f64::min);
                if hh == ll {
                    50.0
                } else {
                    100.0 * (close[i] - ll) / (hh - ll)
                }
            })
            .collect();

        let k = sma_series(&raw, self.k_smooth);
        let d = sma_series(&k, self.d_period);
        // d[j] lines up with k[j + d_period - 1]
        let offset = self.d_period.saturating_sub(1);
        d.iter().enumerate().map(|(j, &dv)| (k[j + offset], dv)).collect()
    }

    pub fn compute(&self, high: &[f64], low: &[f64], close: &[f64]) -> Option<StochasticCross> {
        let lines = self.lines(high, low, close);
        if lines.len() < 2 {
            return None;
        }
        let (prev_k, prev_d) = lines[lines.len() - 2];
        let (k, d) = lines[lines.len() - 1];
        if ![prev_k, prev_d, k, d].iter().all(|v| v.is_finite()) {
            return None;
        }

        Some(if prev_k <= prev_d && k > d && k <= self.lower {
            StochasticCross::BullishInBand { k }
        } else if prev_k >= prev_d && k < d && k >= self.upper {
            StochasticCross::BearishInBand { k }
        } else {
            StochasticCross::None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hlc(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
        (
            closes.iter().map(|c| c + 1.0).collect(),
            closes.iter().map(|c| c - 1.0).collect(),
        )
    }

    #[test]
    fn stochastic_none_with_insufficient_data() {
        let st = StochasticIndicator::new(14, 3, 3, 20.0, 80.0);
        let closes = vec![100.0; 18];
        let (h, l) = hlc(&closes);
        assert!(st.compute(&h, &l, &closes).is_none());
    }

    #[test]
    fn stochastic_flat_window_reads_fifty() {
        let st = StochasticIndicator::new(5, 3, 3, 20.0, 80.0);
        let closes = vec![100.0; 20];
        let lines = st.lines(&closes, &closes, &closes);
        assert!(lines.iter().all(|&(k, d)| k == 50.0 && d == 50.0));
    }

    #[test]
    fn stochastic_bullish_cross_in_lower_band() {
        let st = StochasticIndicator::new(5, 1, 3, 20.0, 80.0);
        // Long slide keeps %K low, then a small uptick lifts %K above %D
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        closes.push(80.8);
        let (h, l) = hlc(&closes);
        assert!(matches!(
            st.compute(&h, &l, &closes),
            Some(StochasticCross::BullishInBand { .. })
        ));
    }

    #[test]
    fn stochastic_bearish_cross_in_upper_band() {
        let st = StochasticIndicator::new(5, 1, 3, 20.0, 80.0);
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        closes.push(119.2);
        let (h, l) = hlc(&closes);
        assert!(matches!(
            st.compute(&h, &l, &closes),
            Some(StochasticCross::BearishInBand { .. })
        ));
    }

    #[test]
    fn stochastic_mismatched_columns_yield_nothing() {
        let st = StochasticIndicator::new(5, 3, 3, 20.0, 80.0);
        assert!(st.lines(&[1.0; 10], &[1.0; 9], &[1.0; 10]).is_empty());
    }
}
