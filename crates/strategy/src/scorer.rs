use tracing::debug;

use common::{Decision, Direction, RandomSource};

use crate::config::SignalConfig;
use crate::evaluator::{forced_vote, Evaluation, Vote, VoteDirection, FORCED_LABEL};

/// Fold votes into a signed confluence score and a direction.
///
/// `score >= min_score` is LONG, `score <= -min_score` is SHORT, anything
/// strictly between is HOLD. Callers wanting the `min_score <= 0` escape
/// hatch go through [`decide`].
pub fn score(votes: &[Vote], min_score: f64) -> Decision {
    let total: f64 = votes.iter().map(Vote::signed_weight).sum();
    let reasons: Vec<String> = votes
        .iter()
        .filter(|v| v.direction != VoteDirection::Neutral)
        .map(|v| v.label.clone())
        .collect();

    let direction = if total >= min_score {
        Direction::Long
    } else if total <= -min_score {
        Direction::Short
    } else {
        Direction::Hold
    };

    Decision { direction, score: total, reasons }
}

/// Turn an evaluation into this tick's decision.
///
/// Order of precedence: forced mode (`min_score <= 0` or every indicator
/// disabled), then gate blocks, then regular scoring.
pub fn decide(eval: &Evaluation, cfg: &SignalConfig, rng: &mut dyn RandomSource) -> Decision {
    if cfg.min_score <= 0.0 {
        let vote = match eval.votes.first() {
            Some(v) if eval.forced => v.clone(),
            _ => forced_vote(rng),
        };
        return forced_decision(&vote);
    }

    if eval.forced {
        if let Some(vote) = eval.votes.first() {
            return forced_decision(vote);
        }
    }

    if let Some(gate) = eval.gate {
        debug!(reason = gate.reason(), "Gate blocked, holding");
        return Decision::hold(gate.reason());
    }

    let decision = score(&eval.votes, cfg.min_score);
    debug!(
        direction = %decision.direction,
        score = decision.score,
        min_score = cfg.min_score,
        "Confluence scored"
    );
    decision
}

fn forced_decision(vote: &Vote) -> Decision {
    let direction = match vote.direction {
        VoteDirection::Short => Direction::Short,
        _ => Direction::Long,
    };
    Decision {
        direction,
        score: 0.0,
        reasons: vec![FORCED_LABEL.to_string()],
    }
}
