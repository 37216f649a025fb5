//! TradeCollection — time-ordered, validated set of trades.
//!
//! The collection is the read-only input shared by every simulation in a
//! sweep. Trades are kept in ascending `entry_time` order at all times, so
//! trades of one calendar day form a contiguous run and can be handed out as
//! slices without copying.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::trade::{Trade, TradeError};

/// Ordered collection of validated trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Trade>", into = "Vec<Trade>")]
pub struct TradeCollection {
    trades: Vec<Trade>,
}

impl TradeCollection {
    /// Build a collection, validating every trade and sorting by entry time.
    ///
    /// The sort is stable: trades sharing an entry time keep their input order.
    pub fn new(trades: Vec<Trade>) -> Result<Self, TradeError> {
        for trade in &trades {
            trade.validate()?;
        }
        let mut collection = Self { trades };
        collection.sort();
        Ok(collection)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from trades already in canonical order (engine output).
    pub(crate) fn from_ordered(trades: Vec<Trade>) -> Self {
        let collection = Self { trades };
        debug_assert!(collection.is_sorted(), "trades must be in entry-time order");
        collection
    }

    /// Append a trade and restore entry-time order.
    ///
    /// Intended for load time only; sweeps never mutate their input.
    pub fn add(&mut self, trade: Trade) -> Result<(), TradeError> {
        trade.validate()?;
        self.trades.push(trade);
        self.sort();
        Ok(())
    }

    fn sort(&mut self) {
        self.trades.sort_by_key(|t| t.entry_time);
    }

    pub fn is_sorted(&self) -> bool {
        self.trades
            .windows(2)
            .all(|w| w[0].entry_time <= w[1].entry_time)
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trade> {
        self.trades.iter()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    // ── Date grouping ──

    /// Trades whose trade date equals `date`, in entry-time order.
    pub fn trades_on_date(&self, date: NaiveDate) -> &[Trade] {
        let start = self.trades.partition_point(|t| t.trade_date() < date);
        let end = self.trades.partition_point(|t| t.trade_date() <= date);
        &self.trades[start..end]
    }

    /// Distinct trade dates, ascending.
    pub fn unique_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.trades.iter().map(Trade::trade_date).collect();
        dates.dedup();
        dates
    }

    /// Trades grouped by trade date, ascending, in a single pass.
    pub fn by_date(&self) -> Vec<(NaiveDate, &[Trade])> {
        let mut groups = Vec::new();
        let mut start = 0;
        while start < self.trades.len() {
            let date = self.trades[start].trade_date();
            let len = self.trades[start..]
                .iter()
                .take_while(|t| t.trade_date() == date)
                .count();
            groups.push((date, &self.trades[start..start + len]));
            start += len;
        }
        groups
    }

    /// First and last trade date, `(None, None)` when empty.
    pub fn date_range(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (
            self.trades.first().map(Trade::trade_date),
            self.trades.last().map(Trade::trade_date),
        )
    }

    /// Sub-collection of trades dated within `[start, end]` inclusive.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let trades = self
            .trades
            .iter()
            .filter(|t| {
                let d = t.trade_date();
                d >= start && d <= end
            })
            .cloned()
            .collect();
        Self { trades }
    }

    // ── Aggregates ──

    pub fn total_profit(&self) -> f64 {
        self.trades.iter().map(|t| t.profit_usd).sum()
    }

    pub fn winning_count(&self) -> usize {
        self.trades.iter().filter(|t| t.is_profitable()).count()
    }

    pub fn losing_count(&self) -> usize {
        self.trades.iter().filter(|t| t.profit_usd < 0.0).count()
    }

    /// Fraction of profitable trades; 0.0 for an empty collection.
    pub fn win_rate(&self) -> f64 {
        if self.trades.is_empty() {
            return 0.0;
        }
        self.winning_count() as f64 / self.trades.len() as f64
    }

    /// Gross profit over gross loss magnitude.
    ///
    /// `f64::INFINITY` when there are winners and no losses, 0.0 when there
    /// are no winners.
    pub fn profit_factor(&self) -> f64 {
        let gross_profit: f64 = self
            .trades
            .iter()
            .filter(|t| t.profit_usd > 0.0)
            .map(|t| t.profit_usd)
            .sum();
        let gross_loss: f64 = self
            .trades
            .iter()
            .filter(|t| t.profit_usd < 0.0)
            .map(|t| t.profit_usd)
            .sum::<f64>()
            .abs();

        if gross_loss == 0.0 {
            return if gross_profit > 0.0 { f64::INFINITY } else { 0.0 };
        }
        gross_profit / gross_loss
    }

    /// Deterministic BLAKE3 hash over the trade contents.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for t in &self.trades {
            hasher.update(&t.trade_id.to_le_bytes());
            hasher.update(t.entry_time.to_string().as_bytes());
            hasher.update(t.exit_time.to_string().as_bytes());
            hasher.update(t.direction.to_string().as_bytes());
            hasher.update(&t.entry_price.to_le_bytes());
            hasher.update(&t.exit_price.to_le_bytes());
            hasher.update(&t.quantity.to_le_bytes());
            hasher.update(&t.profit_usd.to_le_bytes());
            hasher.update(&t.max_favorable_usd.to_le_bytes());
            hasher.update(&t.max_adverse_usd.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl TryFrom<Vec<Trade>> for TradeCollection {
    type Error = TradeError;

    fn try_from(trades: Vec<Trade>) -> Result<Self, Self::Error> {
        Self::new(trades)
    }
}

impl From<TradeCollection> for Vec<Trade> {
    fn from(collection: TradeCollection) -> Self {
        collection.trades
    }
}

impl<'a> IntoIterator for &'a TradeCollection {
    type Item = &'a Trade;
    type IntoIter = std::slice::Iter<'a, Trade>;

    fn into_iter(self) -> Self::IntoIter {
        self.trades.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::Direction;
    use chrono::NaiveDateTime;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn trade(id: i64, day: u32, hour: u32, profit: f64) -> Trade {
        Trade {
            trade_id: id,
            entry_time: at(day, hour),
            exit_time: at(day, hour),
            direction: Direction::Long,
            entry_price: 100.0,
            exit_price: 100.0,
            quantity: 1.0,
            profit_usd: profit,
            max_favorable_usd: profit.max(0.0),
            max_adverse_usd: (-profit).max(0.0),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn new_sorts_by_entry_time() {
        let c = TradeCollection::new(vec![
            trade(3, 7, 10, 1.0),
            trade(1, 6, 9, 1.0),
            trade(2, 6, 14, 1.0),
        ])
        .unwrap();
        let ids: Vec<i64> = c.iter().map(|t| t.trade_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(c.is_sorted());
    }

    #[test]
    fn new_rejects_invalid_trade() {
        let mut bad = trade(1, 6, 9, 1.0);
        bad.quantity = -1.0;
        assert!(TradeCollection::new(vec![bad]).is_err());
    }

    #[test]
    fn add_keeps_order() {
        let mut c = TradeCollection::new(vec![trade(2, 6, 14, 1.0)]).unwrap();
        c.add(trade(1, 6, 9, 1.0)).unwrap();
        c.add(trade(3, 8, 9, 1.0)).unwrap();
        let ids: Vec<i64> = c.iter().map(|t| t.trade_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn add_rejects_invalid_without_mutating() {
        let mut c = TradeCollection::new(vec![trade(1, 6, 9, 1.0)]).unwrap();
        let mut bad = trade(2, 6, 10, 1.0);
        bad.exit_time = at(5, 10);
        assert!(c.add(bad).is_err());
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn trades_on_date_returns_only_that_day() {
        let c = TradeCollection::new(vec![
            trade(1, 6, 9, 1.0),
            trade(2, 7, 9, 2.0),
            trade(3, 7, 15, 3.0),
            trade(4, 9, 9, 4.0),
        ])
        .unwrap();
        let day = c.trades_on_date(date(7));
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].trade_id, 2);
        assert_eq!(day[1].trade_id, 3);
        assert!(c.trades_on_date(date(8)).is_empty());
    }

    #[test]
    fn unique_dates_ascending_and_distinct() {
        let c = TradeCollection::new(vec![
            trade(1, 9, 9, 1.0),
            trade(2, 6, 9, 1.0),
            trade(3, 6, 11, 1.0),
            trade(4, 7, 9, 1.0),
        ])
        .unwrap();
        assert_eq!(c.unique_dates(), vec![date(6), date(7), date(9)]);
    }

    #[test]
    fn by_date_matches_trades_on_date() {
        let c = TradeCollection::new(vec![
            trade(1, 6, 9, 1.0),
            trade(2, 6, 11, 1.0),
            trade(3, 7, 9, 1.0),
        ])
        .unwrap();
        let groups = c.by_date();
        assert_eq!(groups.len(), 2);
        for (d, trades) in groups {
            assert_eq!(trades, c.trades_on_date(d));
        }
    }

    #[test]
    fn date_range_empty_and_populated() {
        assert_eq!(TradeCollection::empty().date_range(), (None, None));
        let c = TradeCollection::new(vec![trade(1, 9, 9, 1.0), trade(2, 6, 9, 1.0)]).unwrap();
        assert_eq!(c.date_range(), (Some(date(6)), Some(date(9))));
    }

    #[test]
    fn between_is_inclusive() {
        let c = TradeCollection::new(vec![
            trade(1, 6, 9, 1.0),
            trade(2, 7, 9, 1.0),
            trade(3, 8, 9, 1.0),
            trade(4, 9, 9, 1.0),
        ])
        .unwrap();
        let sub = c.between(date(7), date(8));
        let ids: Vec<i64> = sub.iter().map(|t| t.trade_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn aggregates_on_empty_collection() {
        let c = TradeCollection::empty();
        assert_eq!(c.total_profit(), 0.0);
        assert_eq!(c.win_rate(), 0.0);
        assert_eq!(c.profit_factor(), 0.0);
        assert!(c.unique_dates().is_empty());
    }

    #[test]
    fn aggregates_mixed() {
        let c = TradeCollection::new(vec![
            trade(1, 6, 9, 300.0),
            trade(2, 6, 10, -100.0),
            trade(3, 6, 11, -50.0),
            trade(4, 6, 12, 0.0),
        ])
        .unwrap();
        assert_eq!(c.total_profit(), 150.0);
        assert_eq!(c.win_rate(), 0.25);
        assert_eq!(c.profit_factor(), 2.0);
        assert_eq!(c.winning_count(), 1);
        assert_eq!(c.losing_count(), 2);
    }

    #[test]
    fn profit_factor_infinite_without_losses() {
        let c = TradeCollection::new(vec![trade(1, 6, 9, 10.0), trade(2, 6, 10, 0.0)]).unwrap();
        assert!(c.profit_factor().is_infinite());
    }

    #[test]
    fn profit_factor_zero_without_winners() {
        let c = TradeCollection::new(vec![trade(1, 6, 9, -10.0)]).unwrap();
        assert_eq!(c.profit_factor(), 0.0);
    }

    #[test]
    fn fingerprint_is_order_independent_of_input() {
        let a = TradeCollection::new(vec![trade(1, 6, 9, 1.0), trade(2, 7, 9, 2.0)]).unwrap();
        let b = TradeCollection::new(vec![trade(2, 7, 9, 2.0), trade(1, 6, 9, 1.0)]).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = TradeCollection::new(vec![trade(1, 6, 9, 1.0), trade(2, 7, 9, 2.5)]).unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn deserialization_validates() {
        let c = TradeCollection::new(vec![trade(2, 7, 9, 2.0), trade(1, 6, 9, 1.0)]).unwrap();
        let json = serde_json::to_string(&c).unwrap();
        let back: TradeCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);

        let mut bad = trade(3, 6, 9, 1.0);
        bad.quantity = 0.0;
        let json = serde_json::to_string(&vec![bad]).unwrap();
        assert!(serde_json::from_str::<TradeCollection>(&json).is_err());
    }
}
