use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Oldest notes are dropped past this many.
pub const MAX_NOTES: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub at: DateTime<Utc>,
    pub text: String,
}

/// Session and lifetime statistics of one bot.
///
/// `orders == wins + losses + draws` at all times. Session counters are
/// zeroed by a session start or reset; `lifetime_pnl` only by a lifetime
/// reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    pub running: bool,
    pub connected: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub last_action_at: Option<DateTime<Utc>>,

    pub orders: u64,
    pub wins: u64,
    pub losses: u64,
    pub draws: u64,
    pub pnl: f64,
    pub lifetime_pnl: f64,
    pub max_step_seen: u32,
    pub max_stake_seen: f64,
    /// Payout ratio reported by the most recent trade.
    pub payout: f64,

    pub equity_start: Option<f64>,
    pub equity_now: Option<f64>,
    /// Largest `equity_start - equity_now` observed, never negative.
    pub max_drawdown: f64,

    /// Newest first.
    pub notes: Vec<Note>,
}

impl SessionSnapshot {
    /// Wins over decided trades (draws excluded), 0 when nothing is decided.
    pub fn win_rate(&self) -> f64 {
        let decided = self.wins + self.losses;
        if decided == 0 {
            0.0
        } else {
            self.wins as f64 / decided as f64
        }
    }

    pub(crate) fn clear_session_counters(&mut self) {
        self.orders = 0;
        self.wins = 0;
        self.losses = 0;
        self.draws = 0;
        self.pnl = 0.0;
        self.max_step_seen = 0;
        self.max_stake_seen = 0.0;
        self.payout = 0.0;
    }

    pub(crate) fn push_note(&mut self, at: DateTime<Utc>, text: impl Into<String>) {
        self.notes.insert(0, Note { at, text: text.into() });
        self.notes.truncate(MAX_NOTES);
    }
}
