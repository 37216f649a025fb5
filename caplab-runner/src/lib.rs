//! CapLab Runner — sweep orchestration, configuration, loading and export.
//!
//! This crate builds on `caplab-core` to provide:
//! - The parameter sweep optimizer on a bounded rayon worker pool
//! - Progress/status observers for sweeps
//! - TOML sweep configuration with range expansion
//! - CSV trade history loading
//! - CSV, JSON and Markdown export of results

pub mod config;
pub mod export;
pub mod progress;
pub mod sweep;
pub mod trade_loader;

pub use config::{ConfigError, LimitSpec, SweepConfig};
pub use progress::{LogObserver, NullObserver, SweepObserver};
pub use sweep::{
    optimize, LimitGrid, Optimizer, PairFailure, SweepError, SweepResults, DEFAULT_WORKERS,
    NO_TRADE_DATA,
};
pub use trade_loader::{load_trades, read_trades, LoadError};
