use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::TradeResult;

/// Outcome of one staked trade as reported to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub result: TradeResult,
    pub pnl: f64,
    /// Stake controller step the trade was placed at.
    pub step: u32,
    /// Highest step the caller has seen, when it tracks one separately.
    #[serde(default)]
    pub max_step_seen: Option<u32>,
    pub stake: f64,
    #[serde(default)]
    pub payout: Option<f64>,
    /// Account equity after settlement, when known.
    #[serde(default)]
    pub equity: Option<f64>,
}

impl TradeRecord {
    pub fn new(result: TradeResult, pnl: f64, step: u32, stake: f64) -> Self {
        Self {
            result,
            pnl,
            step,
            max_step_seen: None,
            stake,
            payout: None,
            equity: None,
        }
    }

    /// Build from a venue's free-form result string (`win`, `LOSE`, ...).
    pub fn from_raw_result(raw: &str, pnl: f64, step: u32, stake: f64) -> Self {
        Self::new(TradeResult::parse_lenient(raw), pnl, step, stake)
    }

    pub fn with_payout(mut self, payout: f64) -> Self {
        self.payout = Some(payout);
        self
    }

    pub fn with_equity(mut self, equity: f64) -> Self {
        self.equity = Some(equity);
        self
    }

    pub fn with_max_step_seen(mut self, step: u32) -> Self {
        self.max_step_seen = Some(step);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    SessionStarted { equity_start: Option<f64> },
    SessionStopped,
    SessionReset,
    LifetimeReset,
    Trade(TradeRecord),
    Note,
    Connection { connected: bool },
}

/// One immutable line of the append-only event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub id: String,
    pub at: DateTime<Utc>,
    pub event: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LedgerEvent {
    pub fn new(at: DateTime<Utc>, event: EventKind, note: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            at,
            event,
            note,
        }
    }

    /// UTC calendar day the event belongs to, `YYYY-MM-DD`.
    pub fn day(&self) -> String {
        self.at.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn trade_event_serializes_with_kind_tag() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
        let record = TradeRecord::new(TradeResult::Win, 0.87, 0, 1.0).with_payout(0.87);
        let event = LedgerEvent::new(at, EventKind::Trade(record.clone()), None);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"]["kind"], "trade");
        assert_eq!(json["event"]["result"], "WIN");
        assert_eq!(json["event"]["payout"], 0.87);
        assert!(json.get("note").is_none());
        assert_eq!(event.day(), "2024-03-09");

        let back: LedgerEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.event, EventKind::Trade(record));
    }

    #[test]
    fn raw_results_parse_leniently() {
        assert_eq!(TradeRecord::from_raw_result("lose", -1.0, 1, 1.0).result, TradeResult::Loss);
        assert_eq!(TradeRecord::from_raw_result("Win", 0.87, 0, 1.0).result, TradeResult::Win);
        assert_eq!(TradeRecord::from_raw_result("void", 0.0, 0, 1.0).result, TradeResult::Draw);
    }
}
