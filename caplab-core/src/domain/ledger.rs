//! Per-day and per-trade simulation records.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// How a single trade was treated by the daily caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    /// Counted at its full realized profit.
    Counted,
    /// Pushed the day to the profit cap; counted at the clamped amount.
    ProfitCapTrigger,
    /// Pushed the day to the loss cap; counted at the clamped amount.
    LossCapTrigger,
    /// Not counted: the profit cap was already hit earlier that day.
    SkippedAfterProfitCap,
    /// Not counted: the loss cap was already hit earlier that day.
    SkippedAfterLossCap,
}

impl TradeStatus {
    pub fn is_counted(self) -> bool {
        matches!(
            self,
            TradeStatus::Counted | TradeStatus::ProfitCapTrigger | TradeStatus::LossCapTrigger
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            TradeStatus::Counted => "counted",
            TradeStatus::ProfitCapTrigger => "profit cap trigger",
            TradeStatus::LossCapTrigger => "loss cap trigger",
            TradeStatus::SkippedAfterProfitCap => "skipped after profit cap",
            TradeStatus::SkippedAfterLossCap => "skipped after loss cap",
        }
    }
}

/// One trade's row in the day ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub trade_id: i64,
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    /// Realized profit as recorded by the trade source.
    pub original_profit: f64,
    /// Profit counted toward the day (0.0 for skipped trades).
    pub counted_profit: f64,
    pub status: TradeStatus,
}

/// One trading day's outcome under a given pair of caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLedgerEntry {
    pub date: NaiveDate,
    /// Day P&L after cap truncation.
    pub realized_profit: f64,
    /// Equity after this day (sum of realized profit up to and including it).
    pub cumulative_profit: f64,
    pub trade_count_included: usize,
    pub trade_count_total: usize,
    pub hit_profit_limit: bool,
    pub hit_loss_limit: bool,
    pub trades: Vec<TradeOutcome>,
}

impl DailyLedgerEntry {
    pub fn hit_any_limit(&self) -> bool {
        self.hit_profit_limit || self.hit_loss_limit
    }

    pub fn skipped_count(&self) -> usize {
        self.trade_count_total - self.trade_count_included
    }
}
