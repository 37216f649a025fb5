//! LimitPair — one (daily profit cap, daily loss cap) candidate.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which side of the daily cap a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitKind {
    Profit,
    Loss,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::Profit => write!(f, "daily profit limit"),
            LimitKind::Loss => write!(f, "daily loss limit"),
        }
    }
}

/// Rejected limit values.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LimitError {
    #[error("{kind} must be strictly positive, got {value}")]
    NonPositive { kind: LimitKind, value: f64 },

    #[error("{kind} must be a finite number, got {value}")]
    NonFinite { kind: LimitKind, value: f64 },
}

/// A daily profit cap and a daily loss cap, both positive dollar amounts.
///
/// The loss cap is stored as a magnitude: a day stops once its cumulative
/// P&L reaches `-loss_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitPair {
    pub profit_limit: f64,
    pub loss_limit: f64,
}

impl LimitPair {
    pub fn new(profit_limit: f64, loss_limit: f64) -> Self {
        Self {
            profit_limit,
            loss_limit,
        }
    }

    /// Deterministic identity key, e.g. `PL100_LL50` or `PL100.5_LL50`.
    pub fn id(&self) -> String {
        format!("PL{}_LL{}", self.profit_limit, self.loss_limit)
    }

    pub fn validate(&self) -> Result<(), LimitError> {
        check_limit(LimitKind::Profit, self.profit_limit)?;
        check_limit(LimitKind::Loss, self.loss_limit)
    }
}

/// Validate a single candidate limit value.
pub fn check_limit(kind: LimitKind, value: f64) -> Result<(), LimitError> {
    if !value.is_finite() {
        return Err(LimitError::NonFinite { kind, value });
    }
    if value <= 0.0 {
        return Err(LimitError::NonPositive { kind, value });
    }
    Ok(())
}

impl fmt::Display for LimitPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "profit cap ${:.2} / loss cap ${:.2}",
            self.profit_limit, self.loss_limit
        )
    }
}
