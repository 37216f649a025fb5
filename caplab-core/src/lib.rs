//! CapLab Core — trade domain types, daily-cap simulation engine, result model.
//!
//! This crate contains everything needed to replay a trade history under one
//! pair of daily caps:
//! - Domain types (trades, the ordered trade collection, limit pairs, ledgers)
//! - The daily-cap replay engine behind the `Simulator` trait
//! - Equity-curve statistics (drawdown)
//! - The immutable `OptimizationResult` value object
//! - A seeded synthetic trade generator

pub mod domain;
pub mod engine;
pub mod metrics;
pub mod result;
pub mod synthetic;

pub use domain::{
    check_limit, DailyLedgerEntry, Direction, LimitError, LimitKind, LimitPair, Trade,
    TradeCollection, TradeError, TradeOutcome, TradeStatus,
};
pub use engine::{simulate, DailyLimitEngine, SimulationError, Simulator};
pub use result::OptimizationResult;
