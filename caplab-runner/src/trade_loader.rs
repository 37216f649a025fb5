//! Trade history loading from CSV.
//!
//! Expected header (order-independent, names exact):
//!
//! ```text
//! trade_id,entry_time,exit_time,direction,entry_price,exit_price,quantity,profit_usd,max_favorable_usd,max_adverse_usd
//! ```
//!
//! Timestamps are `YYYY-MM-DD HH:MM:SS` (a `T` separator is also accepted).
//! Every row is validated; the first bad row aborts the load with its line
//! number.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use caplab_core::{Direction, Trade, TradeCollection, TradeError};
use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Errors from the trade loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("line {line}: {source}")]
    Csv { line: u64, source: csv::Error },

    #[error("line {line}: invalid {field} timestamp '{value}'")]
    Timestamp {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("line {line}: {source}")]
    InvalidTrade { line: u64, source: TradeError },

    #[error(transparent)]
    Collection(#[from] TradeError),
}

/// One CSV row before timestamp parsing and validation.
#[derive(Debug, Deserialize)]
struct TradeRow {
    trade_id: i64,
    entry_time: String,
    exit_time: String,
    direction: Direction,
    entry_price: f64,
    exit_price: f64,
    quantity: f64,
    profit_usd: f64,
    max_favorable_usd: f64,
    max_adverse_usd: f64,
}

impl TradeRow {
    fn into_trade(self, line: u64) -> Result<Trade, LoadError> {
        let trade = Trade {
            trade_id: self.trade_id,
            entry_time: parse_timestamp(&self.entry_time, "entry_time", line)?,
            exit_time: parse_timestamp(&self.exit_time, "exit_time", line)?,
            direction: self.direction,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            quantity: self.quantity,
            profit_usd: self.profit_usd,
            max_favorable_usd: self.max_favorable_usd,
            max_adverse_usd: self.max_adverse_usd,
        };
        trade
            .validate()
            .map_err(|source| LoadError::InvalidTrade { line, source })?;
        Ok(trade)
    }
}

fn parse_timestamp(
    value: &str,
    field: &'static str,
    line: u64,
) -> Result<NaiveDateTime, LoadError> {
    let trimmed = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| LoadError::Timestamp {
            line,
            field,
            value: value.to_string(),
        })
}

/// Load a trade history from a CSV file.
pub fn load_trades(path: &Path) -> Result<TradeCollection, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let trades = read_trades(file)?;
    log::info!("loaded {} trades from {}", trades.len(), path.display());
    Ok(trades)
}

/// Parse a trade history from any CSV source.
pub fn read_trades<R: Read>(reader: R) -> Result<TradeCollection, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut trades = Vec::new();
    for (index, record) in rdr.deserialize::<TradeRow>().enumerate() {
        // Header is line 1.
        let line = index as u64 + 2;
        let row = record.map_err(|source| LoadError::Csv {
            line: source
                .position()
                .map(|p| p.line())
                .unwrap_or(line),
            source,
        })?;
        trades.push(row.into_trade(line)?);
    }

    Ok(TradeCollection::new(trades)?)
}
