use proptest::prelude::*;

use common::{Direction, PriceSeries, SequenceRandom};
use strategy::{decide, evaluate, score, IndicatorConfig, SignalConfig, Vote, VoteDirection};

fn vote_strategy() -> impl Strategy<Value = Vote> {
    (
        prop_oneof![
            Just(VoteDirection::Long),
            Just(VoteDirection::Short),
            Just(VoteDirection::Neutral)
        ],
        prop_oneof![Just(0.5f64), Just(1.0f64)],
    )
        .prop_map(|(direction, weight)| Vote {
            name: "test".into(),
            label: "test".into(),
            direction,
            weight,
        })
}

fn closes_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-3.0f64..3.0, 0..120).prop_map(|steps| {
        let mut price = 100.0;
        steps
            .into_iter()
            .map(|s| {
                price = (price + s).max(1.0);
                price
            })
            .collect()
    })
}

fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new(
        closes.to_vec(),
        closes.iter().map(|c| c + 1.0).collect(),
        closes.iter().map(|c| c - 1.0).collect(),
        closes.to_vec(),
        vec![500.0; closes.len()],
    )
    .unwrap()
}

proptest! {
    /// Direction is a pure function of the summed score and the threshold.
    #[test]
    fn direction_matches_thresholds(
        votes in prop::collection::vec(vote_strategy(), 0..10),
        min_score in 0.5f64..4.0,
    ) {
        let d = score(&votes, min_score);
        let expected = if d.score >= min_score {
            Direction::Long
        } else if d.score <= -min_score {
            Direction::Short
        } else {
            Direction::Hold
        };
        prop_assert_eq!(d.direction, expected);
        prop_assert!(d.reasons.len() <= votes.len());
    }

    /// Forced mode must never block trading.
    #[test]
    fn forced_mode_never_holds(
        closes in closes_strategy(),
        draws in prop::collection::vec(0.0f64..1.0, 1..8),
        disable_all in any::<bool>(),
        min_score in -3.0f64..0.0,
    ) {
        let cfg = if disable_all {
            SignalConfig { indicators: IndicatorConfig::disabled(), ..SignalConfig::default() }
        } else {
            SignalConfig { min_score, ..SignalConfig::default() }
        };
        let mut rng = SequenceRandom::new(draws);
        let eval = evaluate(&series(&closes), &cfg.indicators, &mut rng);
        let d = decide(&eval, &cfg, &mut rng);
        prop_assert_ne!(d.direction, Direction::Hold);
    }

    /// Arbitrary walks never panic the evaluator and gated results carry no votes.
    #[test]
    fn evaluation_is_total(closes in closes_strategy()) {
        let mut rng = SequenceRandom::new(vec![0.3]);
        let eval = evaluate(&series(&closes), &IndicatorConfig::default(), &mut rng);
        if eval.gate.is_some() {
            prop_assert!(eval.votes.is_empty());
        }
        prop_assert!(eval.votes.iter().all(|v| v.weight == 1.0 || v.weight == 0.5));
    }
}
