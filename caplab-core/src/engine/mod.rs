//! Simulation engine: replays a trade history under a pair of daily caps.

pub mod daily_limits;

use std::sync::Arc;

use thiserror::Error;

use crate::domain::{LimitError, LimitPair, TradeCollection};
use crate::result::OptimizationResult;

pub use daily_limits::simulate;

/// Errors from a single simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid limit: {0}")]
    InvalidLimit(#[from] LimitError),

    #[error("trade collection is empty")]
    EmptyCollection,
}

/// Anything that can turn a trade history and a limit pair into a result.
///
/// The sweep only talks to this trait, so alternative cap policies can be
/// plugged in without touching the worker pool.
pub trait Simulator: Send + Sync {
    fn name(&self) -> &str;

    fn simulate(
        &self,
        trades: &Arc<TradeCollection>,
        limits: LimitPair,
    ) -> Result<OptimizationResult, SimulationError>;
}

/// The stock daily profit-cap / loss-cap replay.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyLimitEngine;

impl Simulator for DailyLimitEngine {
    fn name(&self) -> &str {
        "daily_limits"
    }

    fn simulate(
        &self,
        trades: &Arc<TradeCollection>,
        limits: LimitPair,
    ) -> Result<OptimizationResult, SimulationError> {
        daily_limits::simulate(trades, limits)
    }
}
