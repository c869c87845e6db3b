/// Where an RSI value sits relative to the configured bands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RsiZone {
    /// At or below the oversold band.
    Oversold(f64),
    /// At or above the overbought band.
    Overbought(f64),
    Between(f64),
}

impl RsiZone {
    pub fn value(&self) -> f64 {
        match *self {
            RsiZone::Oversold(v) | RsiZone::Overbought(v) | RsiZone::Between(v) => v,
        }
    }
}

/// Wilder RSI over closes, oldest first.
///
/// Needs `length + 1` closes. A window without any down move reads 100.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub length: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl RsiIndicator {
    pub fn new(length: usize, oversold: f64, overbought: f64) -> Self {
        Self { length, oversold, overbought }
    }

    pub fn value(&self, closes: &[f64]) -> Option<f64> {
        let n = self.length;
        if n == 0 || closes.len() <= n {
            return None;
        }
        let len = n as f64;

        let mut moves = closes.windows(2).map(|w| w[1] - w[0]);
        let (seed_gain, seed_loss) = moves
            .by_ref()
            .take(n)
            .fold((0.0, 0.0), |(g, l), d| (g + d.max(0.0), l + (-d).max(0.0)));

        let (gain, loss) = moves.fold((seed_gain / len, seed_loss / len), |(g, l), d| {
            (
                (g * (len - 1.0) + d.max(0.0)) / len,
                (l * (len - 1.0) + (-d).max(0.0)) / len,
            )
        });

        if !(gain.is_finite() && loss.is_finite()) {
            return None;
        }
        if loss == 0.0 {
            return Some(100.0);
        }
        Some(100.0 - 100.0 / (1.0 + gain / loss))
    }

    /// Classify the latest RSI against the bands. Both bands are inclusive.
    pub fn compute(&self, closes: &[f64]) -> Option<RsiZone> {
        let v = self.value(closes)?;
        Some(if v <= self.oversold {
            RsiZone::Oversold(v)
        } else if v >= self.overbought {
            RsiZone::Overbought(v)
        } else {
            RsiZone::Between(v)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rsi(length: usize) -> RsiIndicator {
        RsiIndicator::new(length, 30.0, 70.0)
    }

    #[test]
    fn needs_one_more_close_than_length() {
        assert!(rsi(14).value(&[100.0; 14]).is_none());
        let rising: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert!(rsi(14).value(&rising).is_some());
        assert!(rsi(0).value(&[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn one_way_markets_hit_the_extremes() {
        assert_eq!(rsi(3).compute(&[10.0, 11.0, 12.0, 13.0, 14.0]), Some(RsiZone::Overbought(100.0)));
        let down = rsi(3).compute(&[14.0, 13.0, 12.0, 11.0, 10.0]).unwrap();
        assert!(matches!(down, RsiZone::Oversold(_)));
        assert!(down.value().abs() < 1e-9);
    }

    #[test]
    fn wilder_smoothing_matches_hand_computation() {
        // moves: +2, -1 | +1 ; seed g=1.0 l=0.5 ; then g=1.0 l=0.25 ; rs=4
        let v = rsi(2).value(&[10.0, 12.0, 11.0, 12.0]).unwrap();
        assert!((v - 80.0).abs() < 1e-9, "got {v}");
    }

    #[test]
    fn flat_series_reads_100() {
        assert_eq!(rsi(5).value(&[7.0; 10]), Some(100.0));
    }

    #[test]
    fn bands_are_inclusive() {
        let ind = RsiIndicator::new(2, 80.0, 90.0);
        assert_eq!(ind.compute(&[10.0, 12.0, 11.0, 12.0]), Some(RsiZone::Oversold(80.0)));
        let ind = RsiIndicator::new(2, 10.0, 80.0);
        assert!(matches!(ind.compute(&[10.0, 12.0, 11.0, 12.0]), Some(RsiZone::Overbought(_))));
    }
}
