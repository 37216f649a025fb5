//! Synthetic trade histories for demos, benches and tests.
//!
//! Output is a deterministic function of the config: the same seed always
//! produces the same collection.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Direction, Trade, TradeCollection, TradeError};

/// Shape of a generated trade history.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub start: NaiveDate,
    /// Number of weekdays to generate.
    pub trading_days: usize,
    pub max_trades_per_day: usize,
    /// Standard scale of a single trade's P&L in dollars.
    pub profit_scale: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            trading_days: 120,
            max_trades_per_day: 6,
            profit_scale: 150.0,
        }
    }
}

/// Generate a random but reproducible intraday trade history.
pub fn generate_trades(config: &SyntheticConfig) -> Result<TradeCollection, TradeError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut trades = Vec::new();
    let mut next_id: i64 = 1;
    let mut day = config.start;
    let mut generated_days = 0;

    while generated_days < config.trading_days {
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day += Duration::days(1);
            continue;
        }

        let count = rng.gen_range(1..=config.max_trades_per_day.max(1));
        // Session opens at 09:30; all entries land within the next ten hours.
        let max_gap = (600 / count as i64).max(1);
        let mut minute_of_day: i64 = 9 * 60 + 30;

        for _ in 0..count {
            minute_of_day += rng.gen_range(1..=max_gap);
            let hold: i64 = rng.gen_range(1..=20);
            let entry_time = day.and_time(NaiveTime::default()) + Duration::minutes(minute_of_day);
            let exit_time = entry_time + Duration::minutes(hold);

            let direction = if rng.gen_bool(0.5) {
                Direction::Long
            } else {
                Direction::Short
            };
            let quantity = rng.gen_range(1..=3) as f64;
            let entry_price: f64 = 4_500.0 + rng.gen_range(-50.0..50.0);
            // Slight positive edge so sweeps have something to find.
            let profit_usd: f64 =
                (rng.gen_range(-1.0..1.0) + 0.05) * config.profit_scale * quantity;
            let points = profit_usd / (50.0 * quantity);
            let exit_price = match direction {
                Direction::Long => entry_price + points,
                Direction::Short => entry_price - points,
            };

            let favorable = profit_usd.max(0.0) + rng.gen_range(0.0..0.5) * config.profit_scale;
            let adverse = (-profit_usd).max(0.0) + rng.gen_range(0.0..0.5) * config.profit_scale;

            trades.push(Trade {
                trade_id: next_id,
                entry_time,
                exit_time,
                direction,
                entry_price,
                exit_price,
                quantity,
                profit_usd: (profit_usd * 100.0).round() / 100.0,
                max_favorable_usd: (favorable * 100.0).round() / 100.0,
                max_adverse_usd: (adverse * 100.0).round() / 100.0,
            });
            next_id += 1;
        }

        generated_days += 1;
        day += Duration::days(1);
    }

    TradeCollection::new(trades)
}
