/// Average True Range (ATR) indicator.
///
/// True Range is the greatest of:
/// - Current High - Current Low
/// - Abs(Current High - Previous Close)
/// - Abs(Current Low - Previous Close)
///
/// Uses Wilder's smoothing (same as RSI). Only used as a volatility gate.
#[derive(Debug, Clone)]
pub struct AtrIndicator {
    pub period: usize,
}

impl AtrIndicator {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Current ATR, or `None` with fewer than `period + 1` bars.
    pub fn compute(&self, high: &[f64], low: &[f64], close: &[f64]) -> Option<f64> {
        let n = close.len();
        if self.period == 0 || n < self.period + 1 || high.len() != n || low.len() != n {
            return None;
        }

        let true_ranges: Vec<f64> = (1..n)
            .map(|i| {
                (high[i] - low[i])
                    .max((high[i] - close[i - 1]).abs())
                    .max((low[i] - close[i - 1]).abs())
            })
            .collect();

        // First ATR is simple average of first 'period' true ranges
        let period = self.period as f64;
        let mut atr = true_ranges[..self.period].iter().sum::<f64>() / period;
        for &tr in &true_ranges[self.period..] {
            atr = (atr * (period - 1.0) + tr) / period;
        }

        atr.is_finite().then_some(atr)
    }
}
