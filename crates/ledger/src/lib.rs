pub mod event;
pub mod session;
pub mod snapshot;
pub mod store;

pub use event::{EventKind, LedgerEvent, TradeRecord};
pub use session::SessionLedger;
pub use snapshot::{Note, SessionSnapshot, MAX_NOTES};
pub use store::{FileStore, LedgerStore, MemoryStore};
