//! Reporting and export: JSON, CSV and Markdown artifacts for sweeps.
//!
//! - **CSV**: ranked summary table, per-day ledger, per-trade outcomes,
//!   equity curve
//! - **JSON**: a single result, or the sweep summary with failures
//! - **Markdown**: a short human-readable ranking report

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use caplab_core::OptimizationResult;
use serde::Serialize;

use crate::sweep::{PairFailure, SweepResults};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize one result (ledger and counted trades included) to pretty JSON.
///
/// An infinite profit factor is written as `null`.
pub fn export_json(result: &OptimizationResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize result to JSON")
}

/// Headline numbers for one ranked result.
#[derive(Debug, Serialize)]
struct RankedSummary {
    rank: usize,
    id: String,
    daily_profit_limit: f64,
    daily_loss_limit: f64,
    total_profit: f64,
    profit_factor: f64,
    win_rate: f64,
    max_drawdown: f64,
    trade_count: usize,
    hit_profit_limit_days: usize,
    hit_loss_limit_days: usize,
}

#[derive(Debug, Serialize)]
struct SweepSummary<'a> {
    status: &'a str,
    fingerprint: &'a str,
    total_pairs: usize,
    evaluated: usize,
    skipped: usize,
    cancelled: bool,
    failures: &'a [PairFailure],
    ranking: Vec<RankedSummary>,
}

/// Serialize the sweep outcome (status, failures, ranking headlines) to JSON.
pub fn export_sweep_json(sweep: &SweepResults) -> Result<String> {
    let summary = SweepSummary {
        status: &sweep.status,
        fingerprint: &sweep.fingerprint,
        total_pairs: sweep.total_pairs,
        evaluated: sweep.evaluated(),
        skipped: sweep.skipped,
        cancelled: sweep.cancelled,
        failures: &sweep.failures,
        ranking: sweep
            .all()
            .iter()
            .enumerate()
            .map(|(i, r)| RankedSummary {
                rank: i + 1,
                id: r.id(),
                daily_profit_limit: r.daily_profit_limit(),
                daily_loss_limit: r.daily_loss_limit(),
                total_profit: r.total_profit,
                profit_factor: r.profit_factor,
                win_rate: r.win_rate,
                max_drawdown: r.max_drawdown,
                trade_count: r.trade_count,
                hit_profit_limit_days: r.hit_profit_limit_days,
                hit_loss_limit_days: r.hit_loss_limit_days,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&summary).context("failed to serialize sweep summary to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Ranked results table, one row per limit pair, best first.
///
/// Columns: rank, profit_limit, loss_limit, net_profit, profit_factor,
/// win_rate_pct, total_trades, executed_trades, winning_trades,
/// losing_trades, profit_days, loss_days, profit_limit_days,
/// loss_limit_days, max_drawdown
pub fn export_results_csv(results: &[OptimizationResult]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "rank",
        "profit_limit",
        "loss_limit",
        "net_profit",
        "profit_factor",
        "win_rate_pct",
        "total_trades",
        "executed_trades",
        "winning_trades",
        "losing_trades",
        "profit_days",
        "loss_days",
        "profit_limit_days",
        "loss_limit_days",
        "max_drawdown",
    ])?;

    for (i, r) in results.iter().enumerate() {
        wtr.write_record([
            &(i + 1).to_string(),
            &format!("{:.2}", r.daily_profit_limit()),
            &format!("{:.2}", r.daily_loss_limit()),
            &format!("{:.2}", r.total_profit),
            &format!("{:.2}", r.profit_factor),
            &format!("{:.2}", r.win_rate * 100.0),
            &r.original_trade_count.to_string(),
            &r.trade_count.to_string(),
            &r.winning_trades.to_string(),
            &r.losing_trades.to_string(),
            &r.profit_days.to_string(),
            &r.loss_days.to_string(),
            &r.hit_profit_limit_days.to_string(),
            &r.hit_loss_limit_days.to_string(),
            &format!("{:.2}", r.max_drawdown),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Per-day ledger of one result.
pub fn export_ledger_csv(result: &OptimizationResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "realized_profit",
        "cumulative_profit",
        "trades_included",
        "trades_total",
        "hit_profit_limit",
        "hit_loss_limit",
    ])?;

    for day in result.ledger() {
        wtr.write_record([
            &day.date.to_string(),
            &format!("{:.2}", day.realized_profit),
            &format!("{:.2}", day.cumulative_profit),
            &day.trade_count_included.to_string(),
            &day.trade_count_total.to_string(),
            &day.hit_profit_limit.to_string(),
            &day.hit_loss_limit.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Every trade of every day with what the caps did to it.
pub fn export_outcomes_csv(result: &OptimizationResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "trade_id",
        "entry_time",
        "exit_time",
        "original_profit",
        "counted_profit",
        "status",
    ])?;

    for day in result.ledger() {
        for t in &day.trades {
            wtr.write_record([
                &day.date.to_string(),
                &t.trade_id.to_string(),
                &t.entry_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                &t.exit_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                &format!("{:.2}", t.original_profit),
                &format!("{:.2}", t.counted_profit),
                &t.status.label().to_string(),
            ])?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Equity curve with a `day_index` column; index 0 is the starting zero.
pub fn export_equity_csv(equity_curve: &[f64]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["day_index", "equity"])?;
    for (i, eq) in equity_curve.iter().enumerate() {
        wtr.write_record([&i.to_string(), &format!("{:.2}", eq)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown report ────────────────────────────────────────────────

/// Markdown ranking of the top `n` results plus any failures.
pub fn generate_report(sweep: &SweepResults, n: usize) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Daily Cap Sweep\n\n");
    md.push_str(&format!("{}\n\n", sweep.status));
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Trade History | `{}` |\n", short_hash(&sweep.fingerprint)));
    md.push_str(&format!("| Pairs | {} |\n", sweep.total_pairs));
    md.push_str(&format!("| Evaluated | {} |\n", sweep.evaluated()));
    if sweep.cancelled {
        md.push_str(&format!("| Skipped | **{}** (cancelled) |\n", sweep.skipped));
    }
    md.push('\n');

    if !sweep.is_empty() {
        md.push_str("## Ranking\n\n");
        md.push_str("| # | Pair | Net Profit | Profit Factor | Win Rate | Max DD | Cap Days (P/L) |\n");
        md.push_str("| --- | --- | --- | --- | --- | --- | --- |\n");
        for (i, r) in sweep.top_n(n).iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | ${:.2} | {:.2} | {:.1}% | ${:.2} | {}/{} |\n",
                i + 1,
                r.id(),
                r.total_profit,
                r.profit_factor,
                r.win_rate * 100.0,
                r.max_drawdown,
                r.hit_profit_limit_days,
                r.hit_loss_limit_days
            ));
        }
        md.push('\n');
    }

    if !sweep.failures.is_empty() {
        md.push_str("## Failures\n\n");
        for f in &sweep.failures {
            md.push_str(&format!("- {}: {}\n", f.limits.id(), f.message));
        }
        md.push('\n');
    }

    md
}

fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(12)]
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a sweep.
///
/// Creates a directory named `sweep_{timestamp}/` under `output_dir`
/// containing:
/// - `results.csv` — ranked summary table
/// - `sweep.json` — status, failures and ranking headlines
/// - `report.md` — Markdown ranking of the top `top` results
/// - `best.json`, `best_ledger.csv`, `best_trades.csv`, `best_equity.csv` —
///   full detail of the top result, when there is one
///
/// Returns the path to the created directory.
pub fn save_artifacts(sweep: &SweepResults, output_dir: &Path, top: usize) -> Result<PathBuf> {
    let dirname = format!("sweep_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write(&run_dir, "results.csv", &export_results_csv(sweep.all())?)?;
    write(&run_dir, "sweep.json", &export_sweep_json(sweep)?)?;
    write(&run_dir, "report.md", &generate_report(sweep, top))?;

    if let Some(best) = sweep.best() {
        write(&run_dir, "best.json", &export_json(best)?)?;
        write(&run_dir, "best_ledger.csv", &export_ledger_csv(best)?)?;
        write(&run_dir, "best_trades.csv", &export_outcomes_csv(best)?)?;
        write(&run_dir, "best_equity.csv", &export_equity_csv(&best.equity_curve)?)?;
    }

    log::info!("wrote sweep artifacts to {}", run_dir.display());
    Ok(run_dir)
}

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}
