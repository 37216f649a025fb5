//! End-to-end pipeline: CSV on disk → sweep → artifacts on disk.

use std::fs;
use std::sync::Arc;

use caplab_runner::export::{
    export_json, export_ledger_csv, export_outcomes_csv, export_results_csv, export_sweep_json,
    generate_report, save_artifacts,
};
use caplab_runner::{load_trades, optimize, LoadError, SweepConfig};

const TRADES_CSV: &str = "\
trade_id,entry_time,exit_time,direction,entry_price,exit_price,quantity,profit_usd,max_favorable_usd,max_adverse_usd
1,2023-11-06 09:31:00,2023-11-06 09:45:00,long,15900.00,15902.50,1,50.00,62.00,10.00
2,2023-11-06 10:02:00,2023-11-06 10:20:00,short,15910.00,15908.00,1,40.00,55.00,5.00
3,2023-11-06 10:45:00,2023-11-06 11:00:00,long,15905.00,15906.50,1,30.00,30.00,12.00
4,2023-11-07 09:35:00,2023-11-07 09:50:00,long,15950.00,15947.00,1,-60.00,8.00,60.00
5,2023-11-07 11:00:00,2023-11-07 11:30:00,short,15940.00,15942.50,1,-50.00,3.00,50.00
6,2023-11-07 13:15:00,2023-11-07 13:40:00,long,15930.00,15940.00,1,200.00,210.00,0.00
";

fn write_trades(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("trades.csv");
    fs::write(&path, TRADES_CSV).unwrap();
    path
}

#[test]
fn load_sweep_and_export() {
    // GIVEN a trade CSV on disk
    let tmp = tempfile::tempdir().unwrap();
    let trades = Arc::new(load_trades(&write_trades(tmp.path())).unwrap());
    assert_eq!(trades.len(), 6);
    assert_eq!(trades.unique_dates().len(), 2);

    // WHEN a config-driven sweep runs
    let config = SweepConfig::from_toml(
        "profit_limits = { start = 100, end = 200, step = 100 }\nloss_limits = [100]",
    )
    .unwrap();
    let grid = config.grid().unwrap();
    let results = optimize(&trades, &grid.profit_limits, &grid.loss_limits).unwrap();

    // THEN the 200 cap keeps day one's full 120 and ranks first
    let best = results.best().unwrap();
    assert_eq!(best.id(), "PL200_LL100");
    assert_eq!(best.total_profit, 20.0);
    assert_eq!(best.equity_curve, vec![0.0, 120.0, 20.0]);
    assert_eq!(best.hit_loss_limit_days, 1);
    assert_eq!(best.excluded_trade_count, 1);

    // AND the 100 cap clamps day one, leaving nothing after day two's -100
    let capped = results.get("PL100_LL100").unwrap();
    assert_eq!(capped.total_profit, 0.0);
    assert_eq!(capped.hit_profit_limit_days, 1);

    // WHEN the artifacts are saved
    let out = save_artifacts(&results, tmp.path(), 5).unwrap();

    // THEN every file exists
    for name in [
        "results.csv",
        "sweep.json",
        "report.md",
        "best.json",
        "best_ledger.csv",
        "best_trades.csv",
        "best_equity.csv",
    ] {
        assert!(out.join(name).exists(), "missing {name}");
    }

    // AND the summary table has a header plus one row per pair
    let summary = fs::read_to_string(out.join("results.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
}

#[test]
fn ledger_and_outcome_exports() {
    let tmp = tempfile::tempdir().unwrap();
    let trades = Arc::new(load_trades(&write_trades(tmp.path())).unwrap());
    let results = optimize(&trades, &[100.0], &[100.0]).unwrap();
    let best = results.best().unwrap();

    let ledger = export_ledger_csv(best).unwrap();
    let lines: Vec<&str> = ledger.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "2023-11-06,100.00,100.00,3,3,true,false");
    assert_eq!(lines[2], "2023-11-07,-100.00,0.00,2,3,false,true");

    let outcomes = export_outcomes_csv(best).unwrap();
    assert_eq!(outcomes.lines().count(), 7);
    assert!(outcomes.contains("profit cap trigger"));
    assert!(outcomes.contains("skipped after loss cap"));

    let table = export_results_csv(results.all()).unwrap();
    let row: Vec<&str> = table.lines().nth(1).unwrap().split(',').collect();
    assert_eq!(row[0], "1");
    assert_eq!(row[1], "100.00");
    assert_eq!(row[6], "6"); // total trades
    assert_eq!(row[7], "5"); // executed trades
}

#[test]
fn json_exports_parse_back() {
    let tmp = tempfile::tempdir().unwrap();
    let trades = Arc::new(load_trades(&write_trades(tmp.path())).unwrap());
    let results = optimize(&trades, &[100.0, 150.0], &[100.0]).unwrap();

    let result_json: serde_json::Value =
        serde_json::from_str(&export_json(results.best().unwrap()).unwrap()).unwrap();
    assert_eq!(result_json["limits"]["profit_limit"], 150.0);
    assert!(result_json.get("original_trades").is_none());

    let sweep_json: serde_json::Value =
        serde_json::from_str(&export_sweep_json(&results).unwrap()).unwrap();
    assert_eq!(sweep_json["total_pairs"], 2);
    assert_eq!(sweep_json["ranking"].as_array().unwrap().len(), 2);
    assert_eq!(sweep_json["ranking"][0]["rank"], 1);
    assert!(sweep_json["failures"].as_array().unwrap().is_empty());
}

#[test]
fn report_lists_top_results() {
    let tmp = tempfile::tempdir().unwrap();
    let trades = Arc::new(load_trades(&write_trades(tmp.path())).unwrap());
    let results = optimize(&trades, &[100.0, 150.0, 200.0], &[100.0]).unwrap();

    let md = generate_report(&results, 2);
    assert!(md.starts_with("# Daily Cap Sweep"));
    assert!(md.contains("## Ranking"));
    assert_eq!(md.matches("| PL").count(), 2);
    assert!(!md.contains("## Failures"));
}

#[test]
fn malformed_csv_reports_line() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("bad.csv");
    let mut content = TRADES_CSV.to_string();
    content.push_str("7,not a time,2023-11-08 10:00:00,long,1,1,1,5,5,0\n");
    fs::write(&path, content).unwrap();

    match load_trades(&path) {
        Err(LoadError::Timestamp { line, .. }) => assert_eq!(line, 8),
        other => panic!("expected timestamp error, got {other:?}"),
    }
}
