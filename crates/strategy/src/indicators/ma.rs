/// Exponential moving average over the whole of `data`.
///
/// Seeded with the SMA of the first `period` values; the first element of the
/// result lines up with `data[period - 1]`. Empty when there is not enough
/// data or `period == 0`.
pub fn ema_series(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return Vec::new();
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema_val = data[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(data.len() - period + 1);
    out.push(ema_val);
    for &price in &data[period..] {
        ema_val = price * k + ema_val * (1.0 - k);
        out.push(ema_val);
    }
    out
}

/// Simple moving average; the first element lines up with `data[period - 1]`.
pub fn sma_series(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return Vec::new();
    }
    data.windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Trend filter: last close against the EMA of `length` closes.
#[derive(Debug, Clone)]
pub struct EmaTrend {
    pub length: usize,
}

impl EmaTrend {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// `None` until `length` closes are available.
    pub fn compute(&self, closes: &[f64]) -> Option<Trend> {
        let ema = *ema_series(closes, self.length).last()?;
        let price = *closes.last()?;
        if !ema.is_finite() || !price.is_finite() {
            return None;
        }
        Some(if price > ema {
            Trend::Up
        } else if price < ema {
            Trend::Down
        } else {
            Trend::Flat
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_seeds_with_sma() {
        let out = ema_series(&[1.0, 2.0, 3.0], 3);
        assert_eq!(out, vec![2.0]);
    }

    #[test]
    fn ema_empty_on_short_input() {
        assert!(ema_series(&[1.0, 2.0], 3).is_empty());
        assert!(ema_series(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn ema_follows_constant_series() {
        let out = ema_series(&[5.0; 20], 4);
        assert_eq!(out.len(), 17);
        assert!(out.iter().all(|v| (v - 5.0).abs() < 1e-12));
    }

    #[test]
    fn sma_windows() {
        assert_eq!(sma_series(&[1.0, 2.0, 3.0, 4.0], 2), vec![1.5, 2.5, 3.5]);
    }

    #[test]
    fn trend_up_on_rising_prices() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        assert_eq!(EmaTrend::new(50).compute(&prices), Some(Trend::Up));
    }

    #[test]
    fn trend_down_on_falling_prices() {
        let prices: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        assert_eq!(EmaTrend::new(50).compute(&prices), Some(Trend::Down));
    }

    #[test]
    fn trend_none_with_insufficient_data() {
        assert_eq!(EmaTrend::new(50).compute(&[1.0; 49]), None);
    }
}
