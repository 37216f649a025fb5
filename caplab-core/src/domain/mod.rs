//! Domain types for CapLab

pub mod collection;
pub mod ledger;
pub mod limits;
pub mod trade;

pub use collection::TradeCollection;
pub use ledger::{DailyLedgerEntry, TradeOutcome, TradeStatus};
pub use limits::{check_limit, LimitError, LimitKind, LimitPair};
pub use trade::{Direction, Trade, TradeError};
