use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use common::TradeResult;

use crate::event::{EventKind, LedgerEvent, TradeRecord};
use crate::snapshot::SessionSnapshot;
use crate::store::LedgerStore;

/// Durable session and lifetime statistics.
///
/// Every mutating call updates the in-memory snapshot, appends one event,
/// saves the snapshot and returns a copy of it. Store failures are logged and
/// swallowed: the in-memory snapshot stays authoritative.
pub struct SessionLedger {
    snapshot: SessionSnapshot,
    store: Box<dyn LedgerStore>,
}

impl SessionLedger {
    /// Restore the last saved snapshot from `store`, or start empty.
    ///
    /// `running` and `connected` describe the live process and are cleared.
    pub fn open(store: impl LedgerStore + 'static) -> Self {
        let mut snapshot = match store.load_snapshot() {
            Ok(Some(snapshot)) => {
                info!(
                    orders = snapshot.orders,
                    pnl = snapshot.pnl,
                    lifetime_pnl = snapshot.lifetime_pnl,
                    "Session ledger restored"
                );
                snapshot
            }
            Ok(None) => SessionSnapshot::default(),
            Err(e) => {
                warn!(error = %e, "Could not restore session ledger, starting empty");
                SessionSnapshot::default()
            }
        };
        snapshot.running = false;
        snapshot.connected = false;

        Self {
            snapshot,
            store: Box::new(store),
        }
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    pub fn is_running(&self) -> bool {
        self.snapshot.running
    }

    /// Begin a fresh session. Session counters go back to zero; lifetime PnL
    /// is untouched. A supplied equity re-bases the drawdown tracking.
    pub fn start_session(&mut self, equity_start: Option<f64>, note: Option<&str>) -> SessionSnapshot {
        let now = Utc::now();
        let s = &mut self.snapshot;
        s.running = true;
        s.clear_session_counters();
        s.started_at = Some(now);
        if let Some(equity) = equity_start {
            s.equity_start = Some(equity);
            s.equity_now = Some(equity);
            s.max_drawdown = 0.0;
        }
        info!(equity_start = ?equity_start, "Session started");
        self.commit(now, EventKind::SessionStarted { equity_start }, note)
    }

    pub fn stop_session(&mut self, note: Option<&str>) -> SessionSnapshot {
        let now = Utc::now();
        self.snapshot.running = false;
        info!(orders = self.snapshot.orders, pnl = self.snapshot.pnl, "Session stopped");
        self.commit(now, EventKind::SessionStopped, note)
    }

    /// Zero the session counters without touching `running`.
    pub fn reset_session(&mut self, note: Option<&str>) -> SessionSnapshot {
        let now = Utc::now();
        self.snapshot.clear_session_counters();
        self.snapshot.started_at = Some(now);
        info!("Session counters reset");
        self.commit(now, EventKind::SessionReset, note)
    }

    pub fn reset_lifetime(&mut self, note: Option<&str>) -> SessionSnapshot {
        let now = Utc::now();
        self.snapshot.lifetime_pnl = 0.0;
        info!("Lifetime PnL reset");
        self.commit(now, EventKind::LifetimeReset, note)
    }

    /// Fold one settled trade into the statistics.
    pub fn on_trade(&mut self, record: TradeRecord) -> SessionSnapshot {
        let now = Utc::now();
        let s = &mut self.snapshot;

        s.orders += 1;
        match record.result {
            TradeResult::Win => s.wins += 1,
            TradeResult::Loss => s.losses += 1,
            TradeResult::Draw => s.draws += 1,
        }
        s.pnl += record.pnl;
        s.lifetime_pnl += record.pnl;
        s.max_step_seen = s
            .max_step_seen
            .max(record.step)
            .max(record.max_step_seen.unwrap_or(0));
        s.max_stake_seen = s.max_stake_seen.max(record.stake);
        if let Some(payout) = record.payout {
            s.payout = payout;
        }
        if let Some(equity) = record.equity {
            let start = *s.equity_start.get_or_insert(equity);
            s.equity_now = Some(equity);
            s.max_drawdown = s.max_drawdown.max((start - equity).max(0.0));
        }

        info!(
            result = %record.result,
            pnl = record.pnl,
            step = record.step,
            stake = record.stake,
            session_pnl = s.pnl,
            "Trade recorded"
        );
        self.commit(now, EventKind::Trade(record), None)
    }

    /// Prepend a timestamped note.
    pub fn add_note(&mut self, text: &str) -> SessionSnapshot {
        let now = Utc::now();
        self.commit(now, EventKind::Note, Some(text))
    }

    /// Track collaborator connectivity. No event is written when unchanged.
    pub fn set_connected(&mut self, connected: bool) -> SessionSnapshot {
        if self.snapshot.connected == connected {
            return self.snapshot.clone();
        }
        let now = Utc::now();
        self.snapshot.connected = connected;
        if connected {
            info!("Collaborators connected");
        } else {
            warn!("Collaborators disconnected");
        }
        self.commit(now, EventKind::Connection { connected }, None)
    }

    fn commit(&mut self, at: DateTime<Utc>, kind: EventKind, note: Option<&str>) -> SessionSnapshot {
        self.snapshot.last_action_at = Some(at);
        if let Some(text) = note {
            self.snapshot.push_note(at, text);
        }

        let event = LedgerEvent::new(at, kind, note.map(str::to_string));
        if let Err(e) = self.store.append_event(&event) {
            error!(error = %e, "Failed to append ledger event");
        }
        if let Err(e) = self.store.save_snapshot(&self.snapshot) {
            error!(error = %e, "Failed to save session snapshot");
        }
        self.snapshot.clone()
    }
}
