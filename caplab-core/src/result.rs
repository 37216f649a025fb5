//! OptimizationResult — everything one (profit cap, loss cap) simulation produced.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{DailyLedgerEntry, LimitPair, TradeCollection};
use crate::metrics::{drawdown_curve, DrawdownPoint};

/// Output of a single daily-cap simulation.
///
/// Built once by the engine and never mutated afterwards. The original
/// collection is shared, not copied, across every result of a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub limits: LimitPair,

    /// Trades actually counted, cap triggers carrying their clamped profit.
    pub trades: TradeCollection,
    /// The untruncated input.
    #[serde(skip)]
    pub original_trades: Arc<TradeCollection>,

    // ── Totals ──
    pub total_profit: f64,
    pub profit_factor: f64,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub trade_count: usize,
    pub original_trade_count: usize,
    pub excluded_trade_count: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,

    // ── Day counts ──
    pub total_trade_days: usize,
    pub profit_days: usize,
    pub loss_days: usize,
    pub hit_profit_limit_days: usize,
    pub hit_loss_limit_days: usize,

    /// Cumulative profit: a leading zero, then one sample per trading day.
    pub equity_curve: Vec<f64>,
    pub daily_metrics: BTreeMap<NaiveDate, DailyLedgerEntry>,
}

impl OptimizationResult {
    /// Identity key derived from the limits, e.g. `PL100_LL50`.
    pub fn id(&self) -> String {
        self.limits.id()
    }

    pub fn daily_profit_limit(&self) -> f64 {
        self.limits.profit_limit
    }

    pub fn daily_loss_limit(&self) -> f64 {
        self.limits.loss_limit
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DailyLedgerEntry> {
        self.daily_metrics.get(&date)
    }

    /// Ledger entries in date order.
    pub fn ledger(&self) -> impl Iterator<Item = &DailyLedgerEntry> {
        self.daily_metrics.values()
    }

    pub fn drawdown_curve(&self) -> Vec<DrawdownPoint> {
        drawdown_curve(&self.equity_curve)
    }

    /// Profit the same trades made with no caps at all.
    pub fn uncapped_profit(&self) -> f64 {
        self.original_trades.total_profit()
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: profit ${:.2}, profit factor {:.2}, win rate {:.1}%, trades {}, max drawdown ${:.2}",
            self.id(),
            self.total_profit,
            self.profit_factor,
            self.win_rate * 100.0,
            self.trade_count,
            self.max_drawdown
        )
    }
}
