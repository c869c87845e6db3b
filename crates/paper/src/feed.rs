use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use common::{Error, MarketData, PriceSeries, RandomSource, Result};

/// Default number of bars returned per call.
pub const DEFAULT_WINDOW: usize = 120;
/// Largest move of one bar as a fraction of the start price. Keeps ATR(14)
/// near 2.5% of the start price (about 2.5 at a start of 100).
const MAX_STEP_PCT: f64 = 0.025;
/// Prices stay within `start / BOUND ..= start * BOUND`.
const BOUND: f64 = 10.0;

#[derive(Debug, Clone, Copy)]
struct Bar {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

struct FeedState {
    rng: Box<dyn RandomSource>,
    bars: VecDeque<Bar>,
}

/// Simulated market data: a rolling window of bars from a bounded random
/// walk. Each `series()` call advances the walk by one bar.
///
/// Bar sizes are fixed in price units (scaled from the start price), so the
/// volatility the ATR gate sees does not shrink as the walk drifts down.
pub struct RandomWalkFeed {
    state: Mutex<FeedState>,
    window: usize,
    walk: Walk,
}

#[derive(Debug, Clone, Copy)]
struct Walk {
    step: f64,
    floor: f64,
    ceiling: f64,
}

impl RandomWalkFeed {
    pub fn new(start_price: f64, rng: impl RandomSource + 'static) -> Self {
        Self::with_window(start_price, DEFAULT_WINDOW, rng)
    }

    /// Pre-fills `window` bars so the first call already returns a full series.
    pub fn with_window(start_price: f64, window: usize, rng: impl RandomSource + 'static) -> Self {
        let start = if start_price.is_finite() && start_price > 0.0 { start_price } else { 100.0 };
        let window = window.max(1);
        let walk = Walk {
            step: start * MAX_STEP_PCT,
            floor: start / BOUND,
            ceiling: start * BOUND,
        };

        let mut rng: Box<dyn RandomSource> = Box::new(rng);
        let mut bars = VecDeque::with_capacity(window + 1);
        let mut last = start;
        for _ in 0..window {
            let bar = walk.next_bar(rng.as_mut(), last);
            last = bar.close;
            bars.push_back(bar);
        }

        Self {
            state: Mutex::new(FeedState { rng, bars }),
            window,
            walk,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Walk {
    fn next_bar(&self, rng: &mut dyn RandomSource, prev_close: f64) -> Bar {
        let open = prev_close;
        let close = (open + self.step * (2.0 * rng.next_f64() - 1.0)).clamp(self.floor, self.ceiling);
        let wick = self.step * 0.5 * rng.next_f64();
        let high = open.max(close) + wick;
        let low = (open.min(close) - wick).max(self.floor * 0.5);
        let volume = 500.0 + 1000.0 * rng.next_f64();
        Bar { open, high, low, close, volume }
    }
}

#[async_trait]
impl MarketData for RandomWalkFeed {
    async fn series(&self) -> Result<PriceSeries> {
        let mut state = self.state.lock().await;
        let FeedState { rng, bars } = &mut *state;

        let last = bars
            .back()
            .map(|b| b.close)
            .ok_or_else(|| Error::MarketData("random walk has no bars".into()))?;
        bars.push_back(self.walk.next_bar(rng.as_mut(), last));
        while bars.len() > self.window {
            bars.pop_front();
        }

        let n = bars.len();
        let (mut open, mut high, mut low, mut close, mut volume) = (
            Vec::with_capacity(n),
            Vec::with_capacity(n),
            Vec::with_capacity(n),
            Vec::with_capacity(n),
            Vec::with_capacity(n),
        );
        for b in bars.iter() {
            open.push(b.open);
            high.push(b.high);
            low.push(b.low);
            close.push(b.close);
            volume.push(b.volume);
        }
        debug!(bars = n, last_close = close.last().copied().unwrap_or_default(), "Random walk advanced");

        PriceSeries::new(open, high, low, close, volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{SequenceRandom, StdRandom};

    #[tokio::test]
    async fn returns_a_full_window() {
        let feed = RandomWalkFeed::with_window(100.0, 60, StdRandom::seeded(1));
        let s = feed.series().await.unwrap();
        assert_eq!(s.len(), 60);
        assert_eq!(feed.series().await.unwrap().len(), 60);
    }

    #[tokio::test]
    async fn each_call_advances_one_bar() {
        let feed = RandomWalkFeed::with_window(100.0, 10, StdRandom::seeded(2));
        let a = feed.series().await.unwrap();
        let b = feed.series().await.unwrap();
        assert_eq!(&a.close()[1..], &b.close()[..9]);
    }

    #[tokio::test]
    async fn bars_are_well_formed_and_bounded() {
        let feed = RandomWalkFeed::with_window(50.0, 200, StdRandom::seeded(3));
        let s = feed.series().await.unwrap();
        for i in 0..s.len() {
            assert!(s.high()[i] >= s.open()[i].max(s.close()[i]));
            assert!(s.low()[i] <= s.open()[i].min(s.close()[i]));
            assert!(s.close()[i] >= 5.0 && s.close()[i] <= 500.0);
            assert!(s.volume()[i] >= 500.0);
        }
    }

    #[tokio::test]
    async fn bar_ranges_clear_the_default_volatility_gate() {
        for seed in 0..4 {
            let feed = RandomWalkFeed::new(100.0, StdRandom::seeded(seed));
            let s = feed.series().await.unwrap();
            let mean_range =
                s.high().iter().zip(s.low()).map(|(h, l)| h - l).sum::<f64>() / s.len() as f64;
            assert!(mean_range > 2.0, "seed {seed}: mean range {mean_range}");
        }
    }

    #[tokio::test]
    async fn constant_upward_draws_trend_up() {
        // 1.0 is outside [0, 1) but pins every step at the maximum.
        let feed = RandomWalkFeed::with_window(100.0, 5, SequenceRandom::new(vec![1.0]));
        let s = feed.series().await.unwrap();
        assert!(s.close().windows(2).all(|w| (w[1] - w[0] - 2.5).abs() < 1e-9));
        assert!((s.open()[0] - 102.5).abs() < 1e-9);
    }
}
