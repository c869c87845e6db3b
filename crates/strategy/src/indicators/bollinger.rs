/// Bollinger Bands: SMA(period) ± std_mult × population standard deviation.
#[derive(Debug, Clone)]
pub struct BollingerIndicator {
    pub period: usize,
    pub std_mult: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerIndicator {
    pub fn new(period: usize, std_mult: f64) -> Self {
        Self { period, std_mult }
    }

    /// Bands over the trailing `period` closes. `None` with insufficient data.
    pub fn compute(&self, closes: &[f64]) -> Option<BollingerBands> {
        if self.period == 0 || closes.len() < self.period {
            return None;
        }
        let window = &closes[closes.len() - self.period..];
        let n = self.period as f64;
        let middle = window.iter().sum::<f64>() / n;
        let variance = window.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();
        if !middle.is_finite() || !std_dev.is_finite() {
            return None;
        }
        Some(BollingerBands {
            upper: middle + self.std_mult * std_dev,
            middle,
            lower: middle - self.std_mult * std_dev,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_collapse_on_flat_prices() {
        let bb = BollingerIndicator::new(20, 2.0).compute(&[10.0; 25]).unwrap();
        assert_eq!(bb.upper, 10.0);
        assert_eq!(bb.middle, 10.0);
        assert_eq!(bb.lower, 10.0);
    }

    #[test]
    fn bands_none_with_insufficient_data() {
        assert!(BollingerIndicator::new(20, 2.0).compute(&[10.0; 19]).is_none());
    }

    #[test]
    fn bands_are_symmetric() {
        let closes: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 9.0 } else { 11.0 }).collect();
        let bb = BollingerIndicator::new(20, 2.0).compute(&closes).unwrap();
        assert!((bb.middle - 10.0).abs() < 1e-12);
        assert!((bb.upper - 12.0).abs() < 1e-12);
        assert!((bb.lower - 8.0).abs() < 1e-12);
    }
}
