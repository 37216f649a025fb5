//! Trade — a single completed round-trip position.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Position direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "Long", alias = "LONG", alias = "buy")]
    Long,
    #[serde(alias = "Short", alias = "SHORT", alias = "sell")]
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Validation failures for a single trade record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradeError {
    #[error("trade #{trade_id}: exit time {exit} precedes entry time {entry}")]
    ExitBeforeEntry {
        trade_id: i64,
        entry: NaiveDateTime,
        exit: NaiveDateTime,
    },

    #[error("trade #{trade_id}: quantity must be positive, got {quantity}")]
    NonPositiveQuantity { trade_id: i64, quantity: f64 },

    #[error("trade #{trade_id}: {field} must be non-negative, got {value}")]
    NegativeValue {
        trade_id: i64,
        field: &'static str,
        value: f64,
    },

    #[error("trade #{trade_id}: {field} is not a finite number")]
    NonFinite { trade_id: i64, field: &'static str },
}

/// A completed round-trip trade as delivered by the trade source.
///
/// `profit_usd` is the realized P&L. The excursion fields record the best and
/// worst unrealized P&L seen while the position was open, both as magnitudes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: i64,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub profit_usd: f64,
    pub max_favorable_usd: f64,
    pub max_adverse_usd: f64,
}

impl Trade {
    /// Calendar day the trade belongs to (entry time truncated to the day).
    pub fn trade_date(&self) -> NaiveDate {
        self.entry_time.date()
    }

    pub fn is_profitable(&self) -> bool {
        self.profit_usd > 0.0
    }

    /// Copy of this trade with a different realized profit.
    ///
    /// Used by the engine to record the clamped profit of a cap-triggering trade.
    pub fn with_profit(&self, profit_usd: f64) -> Self {
        Self {
            profit_usd,
            ..self.clone()
        }
    }

    /// Check the record-level invariants.
    pub fn validate(&self) -> Result<(), TradeError> {
        let id = self.trade_id;
        let numeric = [
            ("entry_price", self.entry_price),
            ("exit_price", self.exit_price),
            ("quantity", self.quantity),
            ("profit_usd", self.profit_usd),
            ("max_favorable_usd", self.max_favorable_usd),
            ("max_adverse_usd", self.max_adverse_usd),
        ];
        for (field, value) in numeric {
            if !value.is_finite() {
                return Err(TradeError::NonFinite { trade_id: id, field });
            }
        }

        if self.exit_time < self.entry_time {
            return Err(TradeError::ExitBeforeEntry {
                trade_id: id,
                entry: self.entry_time,
                exit: self.exit_time,
            });
        }

        if self.quantity <= 0.0 {
            return Err(TradeError::NonPositiveQuantity {
                trade_id: id,
                quantity: self.quantity,
            });
        }

        let non_negative = [
            ("entry_price", self.entry_price),
            ("exit_price", self.exit_price),
            ("max_favorable_usd", self.max_favorable_usd),
            ("max_adverse_usd", self.max_adverse_usd),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(TradeError::NegativeValue {
                    trade_id: id,
                    field,
                    value,
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trade #{}: {} {} @ {} -> {}, profit ${:.2}",
            self.trade_id,
            self.direction,
            self.quantity,
            self.entry_price,
            self.exit_price,
            self.profit_usd
        )
    }
}
