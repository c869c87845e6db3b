//! Durable storage behind the session ledger.
//!
//! The snapshot is a single JSON document overwritten on every mutation; the
//! event log is JSON Lines, one file per UTC day, append only.

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::warn;

use common::{Error, Result};

use crate::event::LedgerEvent;
use crate::snapshot::SessionSnapshot;

const SNAPSHOT_FILE: &str = "session.json";
const EVENTS_DIR: &str = "events";

pub trait LedgerStore: Send {
    /// `Ok(None)` when nothing has been saved yet.
    fn load_snapshot(&self) -> Result<Option<SessionSnapshot>>;
    fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<()>;
    fn append_event(&self, event: &LedgerEvent) -> Result<()>;
}

impl<S: LedgerStore + ?Sized> LedgerStore for Box<S> {
    fn load_snapshot(&self) -> Result<Option<SessionSnapshot>> {
        (**self).load_snapshot()
    }

    fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<()> {
        (**self).save_snapshot(snapshot)
    }

    fn append_event(&self, event: &LedgerEvent) -> Result<()> {
        (**self).append_event(event)
    }
}

// ─── File store ───────────────────────────────────────────────────────────────

/// `<dir>/session.json` plus `<dir>/events/YYYY-MM-DD.jsonl`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    /// Event log file for a `YYYY-MM-DD` day.
    pub fn events_path(&self, day: &str) -> PathBuf {
        self.dir.join(EVENTS_DIR).join(format!("{day}.jsonl"))
    }

    /// Read back one day of events. Malformed lines are skipped.
    pub fn read_events(&self, day: &str) -> Result<Vec<LedgerEvent>> {
        let path = self.events_path(day);
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut events = Vec::new();
        for line in io::BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<LedgerEvent>(&line) {
                Ok(event) => events.push(event),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping malformed ledger event"),
            }
        }
        Ok(events)
    }
}

impl LedgerStore for FileStore {
    fn load_snapshot(&self) -> Result<Option<SessionSnapshot>> {
        match fs::read_to_string(self.snapshot_path()) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(snapshot)?;

        // Write next to the target and rename so readers never see a torn file.
        let tmp = self.dir.join(format!("{SNAPSHOT_FILE}.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.snapshot_path())?;
        Ok(())
    }

    fn append_event(&self, event: &LedgerEvent) -> Result<()> {
        let path = self.events_path(&event.day());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(event)?;

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{json}")?;
        file.flush()?;
        Ok(())
    }
}

// ─── Memory store ─────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryInner {
    snapshot: Option<SessionSnapshot>,
    events: Vec<LedgerEvent>,
    failing: bool,
}

/// In-process store for tests and dry runs. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write, for exercising failure paths.
    pub fn failing() -> Self {
        let store = Self::default();
        if let Ok(mut inner) = store.inner.lock() {
            inner.failing = true;
        }
        store
    }

    /// Pre-seed the stored snapshot.
    pub fn with_snapshot(snapshot: SessionSnapshot) -> Self {
        let store = Self::default();
        if let Ok(mut inner) = store.inner.lock() {
            inner.snapshot = Some(snapshot);
        }
        store
    }

    pub fn saved_snapshot(&self) -> Option<SessionSnapshot> {
        self.inner.lock().ok().and_then(|inner| inner.snapshot.clone())
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.inner
            .lock()
            .map(|inner| inner.events.clone())
            .unwrap_or_default()
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut MemoryInner) -> Result<T>) -> Result<T> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| Error::Persistence("memory store lock poisoned".into()))?;
        f(&mut inner)
    }
}

impl LedgerStore for MemoryStore {
    fn load_snapshot(&self) -> Result<Option<SessionSnapshot>> {
        self.with_inner(|inner| Ok(inner.snapshot.clone()))
    }

    fn save_snapshot(&self, snapshot: &SessionSnapshot) -> Result<()> {
        self.with_inner(|inner| {
            if inner.failing {
                return Err(Error::Persistence("memory store is read-only".into()));
            }
            inner.snapshot = Some(snapshot.clone());
            Ok(())
        })
    }

    fn append_event(&self, event: &LedgerEvent) -> Result<()> {
        self.with_inner(|inner| {
            if inner.failing {
                return Err(Error::Persistence("memory store is read-only".into()));
            }
            inner.events.push(event.clone());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn file_store_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("data"));
        assert!(store.load_snapshot().unwrap().is_none());
        assert!(store.read_events("2024-01-01").unwrap().is_empty());
    }

    #[test]
    fn file_store_overwrites_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        let mut snap = SessionSnapshot { orders: 1, wins: 1, pnl: 0.87, ..SessionSnapshot::default() };
        store.save_snapshot(&snap).unwrap();
        snap.orders = 2;
        snap.losses = 1;
        store.save_snapshot(&snap).unwrap();

        assert_eq!(store.load_snapshot().unwrap(), Some(snap));
        assert!(!dir.path().join("session.json.tmp").exists());
    }

    #[test]
    fn file_store_partitions_events_by_day() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let late = Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 1).unwrap();

        store.append_event(&LedgerEvent::new(late, EventKind::SessionStopped, None)).unwrap();
        store
            .append_event(&LedgerEvent::new(early, EventKind::Note, Some("hello".into())))
            .unwrap();
        store.append_event(&LedgerEvent::new(early, EventKind::LifetimeReset, None)).unwrap();

        let first = store.read_events("2024-05-01").unwrap();
        let second = store.read_events("2024-05-02").unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].event, EventKind::SessionStopped);
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].note.as_deref(), Some("hello"));
        assert_eq!(second[1].event, EventKind::LifetimeReset);
    }

    #[test]
    fn file_store_skips_malformed_event_lines() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        store.append_event(&LedgerEvent::new(at, EventKind::Note, None)).unwrap();

        let path = store.events_path("2024-05-01");
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();

        assert_eq!(store.read_events("2024-05-01").unwrap().len(), 1);
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SNAPSHOT_FILE), "{{{").unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(store.load_snapshot(), Err(Error::Json(_))));
    }

    #[test]
    fn memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let probe = store.clone();
        store.save_snapshot(&SessionSnapshot { orders: 3, draws: 3, ..SessionSnapshot::default() }).unwrap();
        store.append_event(&LedgerEvent::new(Utc::now(), EventKind::SessionReset, None)).unwrap();

        assert_eq!(probe.saved_snapshot().map(|s| s.orders), Some(3));
        assert_eq!(probe.events().len(), 1);
    }

    #[test]
    fn failing_memory_store_rejects_writes() {
        let store = MemoryStore::failing();
        assert!(matches!(
            store.save_snapshot(&SessionSnapshot::default()),
            Err(Error::Persistence(_))
        ));
        assert!(store.load_snapshot().unwrap().is_none());
    }
}
