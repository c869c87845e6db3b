/// Ichimoku cloud position of the latest close.
///
/// Tenkan/Kijun/Senkou B are midpoints of the high-low range over their
/// periods; Senkou A is the midpoint of Tenkan and Kijun. The cloud is taken
/// on the current bar (no forward displacement).
#[derive(Debug, Clone)]
pub struct IchimokuIndicator {
    pub tenkan: usize,
    pub kijun: usize,
    pub senkou_b: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudPosition {
    Above,
    Below,
    Inside,
}

impl IchimokuIndicator {
    pub fn new(tenkan: usize, kijun: usize, senkou_b: usize) -> Self {
        Self { tenkan, kijun, senkou_b }
    }

    pub fn compute(&self, high: &[f64], low: &[f64], close: &[f64]) -> Option<CloudPosition> {
        let n = close.len();
        let longest = self.tenkan.max(self.kijun).max(self.senkou_b);
        if self.tenkan == 0 || self.kijun == 0 || self.senkou_b == 0 {
            return None;
        }
        if n < longest || high.len() != n || low.len() != n {
            return None;
        }

        let midpoint = |period: usize| {
            let hh = high[n - period..].iter().copied().fold(f64::MIN, f64::max);
            let ll = low[n - period..].iter().copied().fold(f64::MAX, f64::min);
            (hh + ll) / 2.0
        };

        let tenkan = midpoint(self.tenkan);
        let kijun = midpoint(self.kijun);
        let span_a = (tenkan + kijun) / 2.0;
        let span_b = midpoint(self.senkou_b);
        let top = span_a.max(span_b);
        let bottom = span_a.min(span_b);
        let price = close[n - 1];
        if !top.is_finite() || !bottom.is_finite() || !price.is_finite() {
            return None;
        }

        Some(if price > top {
            CloudPosition::Above
        } else if price < bottom {
            CloudPosition::Below
        } else {
            CloudPosition::Inside
        })
    }
}
