//! Daily-cap replay: one (profit cap, loss cap) pair over a trade history.
//!
//! Per trading day, trades are replayed in entry-time order and their profit
//! accumulated. The first trade that takes the running day total to
//! `>= profit_limit` or `<= -loss_limit` is the trigger: the day total is
//! clamped to exactly that limit, the trigger is counted at the clamped
//! amount, and every later trade that day is skipped.
//!
//! The profit check runs before the loss check, so a step satisfying both
//! is classified as a profit-cap hit.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::{
    DailyLedgerEntry, LimitPair, Trade, TradeCollection, TradeOutcome, TradeStatus,
};
use crate::metrics::max_drawdown;
use crate::result::OptimizationResult;

use super::SimulationError;

/// Which cap stopped a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CapHit {
    Profit,
    Loss,
}

/// Replay `original` under `limits` and compute the full result.
pub fn simulate(
    original: &Arc<TradeCollection>,
    limits: LimitPair,
) -> Result<OptimizationResult, SimulationError> {
    limits.validate()?;
    if original.is_empty() {
        return Err(SimulationError::EmptyCollection);
    }
    debug_assert!(original.is_sorted(), "input collection lost entry-time order");

    let days = original.by_date();
    let mut included: Vec<Trade> = Vec::with_capacity(original.len());
    let mut daily_metrics = BTreeMap::new();
    let mut equity_curve = Vec::with_capacity(days.len() + 1);
    equity_curve.push(0.0);

    let mut running_total = 0.0;
    let mut profit_days = 0;
    let mut loss_days = 0;
    let mut hit_profit_limit_days = 0;
    let mut hit_loss_limit_days = 0;

    for (date, day_trades) in days {
        let mut entry = replay_day(date, day_trades, limits, &mut included);

        running_total += entry.realized_profit;
        entry.cumulative_profit = running_total;
        equity_curve.push(running_total);

        if entry.realized_profit > 0.0 {
            profit_days += 1;
        } else if entry.realized_profit < 0.0 {
            loss_days += 1;
        }
        if entry.hit_profit_limit {
            hit_profit_limit_days += 1;
        }
        if entry.hit_loss_limit {
            hit_loss_limit_days += 1;
        }

        daily_metrics.insert(date, entry);
    }

    let trades = TradeCollection::from_ordered(included);
    let trade_count = trades.len();
    log::debug!(
        "{}: {}/{} trades counted over {} days, profit {:.2}",
        limits.id(),
        trade_count,
        original.len(),
        daily_metrics.len(),
        running_total
    );

    Ok(OptimizationResult {
        limits,
        profit_factor: trades.profit_factor(),
        win_rate: trades.win_rate(),
        winning_trades: trades.winning_count(),
        losing_trades: trades.losing_count(),
        max_drawdown: max_drawdown(&equity_curve),
        total_profit: running_total,
        trade_count,
        original_trade_count: original.len(),
        excluded_trade_count: original.len() - trade_count,
        total_trade_days: daily_metrics.len(),
        profit_days,
        loss_days,
        hit_profit_limit_days,
        hit_loss_limit_days,
        equity_curve,
        daily_metrics,
        trades,
        original_trades: Arc::clone(original),
    })
}

/// Replay one day's trades, pushing counted trades onto `included`.
///
/// The returned entry's `cumulative_profit` is filled in by the caller.
fn replay_day(
    date: NaiveDate,
    day_trades: &[Trade],
    limits: LimitPair,
    included: &mut Vec<Trade>,
) -> DailyLedgerEntry {
    let mut day_profit = 0.0;
    let mut hit: Option<CapHit> = None;
    let mut counted = 0;
    let mut outcomes = Vec::with_capacity(day_trades.len());

    for trade in day_trades {
        let (counted_profit, status) = match hit {
            Some(CapHit::Profit) => (0.0, TradeStatus::SkippedAfterProfitCap),
            Some(CapHit::Loss) => (0.0, TradeStatus::SkippedAfterLossCap),
            None => {
                let before = day_profit;
                let tentative = before + trade.profit_usd;
                if tentative >= limits.profit_limit {
                    day_profit = limits.profit_limit;
                    hit = Some(CapHit::Profit);
                    (limits.profit_limit - before, TradeStatus::ProfitCapTrigger)
                } else if tentative <= -limits.loss_limit {
                    day_profit = -limits.loss_limit;
                    hit = Some(CapHit::Loss);
                    (-limits.loss_limit - before, TradeStatus::LossCapTrigger)
                } else {
                    day_profit = tentative;
                    (trade.profit_usd, TradeStatus::Counted)
                }
            }
        };

        match status {
            TradeStatus::Counted => included.push(trade.clone()),
            TradeStatus::ProfitCapTrigger | TradeStatus::LossCapTrigger => {
                included.push(trade.with_profit(counted_profit))
            }
            _ => {}
        }
        if status.is_counted() {
            counted += 1;
        }

        outcomes.push(TradeOutcome {
            trade_id: trade.trade_id,
            entry_time: trade.entry_time,
            exit_time: trade.exit_time,
            original_profit: trade.profit_usd,
            counted_profit,
            status,
        });
    }

    DailyLedgerEntry {
        date,
        realized_profit: day_profit,
        cumulative_profit: 0.0,
        trade_count_included: counted,
        trade_count_total: day_trades.len(),
        hit_profit_limit: hit == Some(CapHit::Profit),
        hit_loss_limit: hit == Some(CapHit::Loss),
        trades: outcomes,
    }
}
