//! CapLab CLI — daily profit/loss cap simulation and sweeps.
//!
//! Commands:
//! - `simulate` — replay a trade history under one profit cap / loss cap pair
//! - `optimize` — sweep a grid of cap pairs and rank them by net profit

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use caplab_core::synthetic::{generate_trades, SyntheticConfig};
use caplab_core::{simulate, LimitPair, OptimizationResult, TradeCollection};
use caplab_runner::export::{export_json, export_ledger_csv, save_artifacts};
use caplab_runner::{load_trades, LimitSpec, LogObserver, Optimizer, SweepConfig, SweepResults};

#[derive(Parser)]
#[command(
    name = "caplab",
    about = "CapLab CLI — daily profit and loss cap optimizer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct InputArgs {
    /// Trade history CSV.
    #[arg(long)]
    trades: Option<PathBuf>,

    /// Generate this many trading days of synthetic trades instead.
    #[arg(long)]
    synthetic: Option<usize>,

    /// Seed for --synthetic.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a trade history under one cap pair and print the daily ledger.
    Simulate {
        #[command(flatten)]
        input: InputArgs,

        /// Daily profit cap in dollars.
        #[arg(long)]
        profit_limit: f64,

        /// Daily loss cap in dollars (positive magnitude).
        #[arg(long)]
        loss_limit: f64,

        /// Print the full result as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write the daily ledger to this CSV file.
        #[arg(long)]
        ledger_csv: Option<PathBuf>,
    },
    /// Sweep a grid of cap pairs and rank them by net profit.
    Optimize {
        #[command(flatten)]
        input: InputArgs,

        /// Sweep config TOML (limit lists or ranges, workers).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Profit caps to try, comma separated. Overrides the config.
        #[arg(long, value_delimiter = ',')]
        profit_limits: Vec<f64>,

        /// Loss caps to try, comma separated. Overrides the config.
        #[arg(long, value_delimiter = ',')]
        loss_limits: Vec<f64>,

        /// Worker threads. Overrides the config.
        #[arg(long)]
        workers: Option<usize>,

        /// Number of ranked results to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Write results.csv, sweep.json, report.md and best-pair detail here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            input,
            profit_limit,
            loss_limit,
            json,
            ledger_csv,
        } => run_simulate(&input, profit_limit, loss_limit, json, ledger_csv),
        Commands::Optimize {
            input,
            config,
            profit_limits,
            loss_limits,
            workers,
            top,
            output_dir,
        } => run_optimize(
            &input,
            config,
            profit_limits,
            loss_limits,
            workers,
            top,
            output_dir,
        ),
    }
}

fn load_input(input: &InputArgs) -> Result<Arc<TradeCollection>> {
    let trades = match (&input.trades, input.synthetic) {
        (Some(_), Some(_)) => bail!("--trades and --synthetic are mutually exclusive"),
        (None, None) => bail!("one of --trades or --synthetic is required"),
        (Some(path), None) => load_trades(path)
            .with_context(|| format!("failed to load trades from {}", path.display()))?,
        (None, Some(days)) => {
            let config = SyntheticConfig {
                seed: input.seed,
                trading_days: days,
                ..SyntheticConfig::default()
            };
            log::warn!("using {days} days of SYNTHETIC trades (seed {})", input.seed);
            generate_trades(&config).context("failed to generate synthetic trades")?
        }
    };
    Ok(Arc::new(trades))
}

fn run_simulate(
    input: &InputArgs,
    profit_limit: f64,
    loss_limit: f64,
    json: bool,
    ledger_csv: Option<PathBuf>,
) -> Result<()> {
    let trades = load_input(input)?;
    let result = simulate(&trades, LimitPair::new(profit_limit, loss_limit))?;

    if json {
        println!("{}", export_json(&result)?);
    } else {
        print_ledger(&result);
        println!();
        print_summary(&result);
    }

    if let Some(path) = ledger_csv {
        std::fs::write(&path, export_ledger_csv(&result)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Ledger saved to: {}", path.display());
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_optimize(
    input: &InputArgs,
    config_path: Option<PathBuf>,
    profit_limits: Vec<f64>,
    loss_limits: Vec<f64>,
    workers: Option<usize>,
    top: usize,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => SweepConfig::from_file(&path)?,
        None => SweepConfig::default(),
    };
    if !profit_limits.is_empty() {
        config.profit_limits = LimitSpec::List(profit_limits);
    }
    if !loss_limits.is_empty() {
        config.loss_limits = LimitSpec::List(loss_limits);
    }
    if let Some(w) = workers {
        config.workers = w;
    }

    let trades = load_input(input)?;
    let grid = config.grid()?;
    let results = Optimizer::new()
        .with_workers(config.workers)
        .optimize(&trades, &grid, &LogObserver, None)?;

    print_ranking(&results, top);

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&results, &dir, top)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn print_summary(result: &OptimizationResult) {
    println!("=== {} ===", result.id());
    println!("Net Profit:      ${:.2}", result.total_profit);
    println!("Uncapped Profit: ${:.2}", result.uncapped_profit());
    println!("Profit Factor:   {:.2}", result.profit_factor);
    println!("Win Rate:        {:.1}%", result.win_rate * 100.0);
    println!("Max Drawdown:    ${:.2}", result.max_drawdown);
    println!(
        "Trades:          {} counted / {} total ({} excluded)",
        result.trade_count, result.original_trade_count, result.excluded_trade_count
    );
    println!(
        "Days:            {} ({} up, {} down)",
        result.total_trade_days, result.profit_days, result.loss_days
    );
    println!(
        "Cap Days:        {} profit cap, {} loss cap",
        result.hit_profit_limit_days, result.hit_loss_limit_days
    );
}

fn print_ledger(result: &OptimizationResult) {
    println!(
        "{:<12} {:>12} {:>12} {:>9} {:>6}",
        "Date", "Realized", "Cumulative", "Trades", "Cap"
    );
    for day in result.ledger() {
        let cap = if day.hit_profit_limit {
            "PROFIT"
        } else if day.hit_loss_limit {
            "LOSS"
        } else {
            ""
        };
        println!(
            "{:<12} {:>12.2} {:>12.2} {:>4}/{:<4} {:>6}",
            day.date.to_string(),
            day.realized_profit,
            day.cumulative_profit,
            day.trade_count_included,
            day.trade_count_total,
            cap
        );
    }
}

fn print_ranking(results: &SweepResults, top: usize) {
    println!("{}", results.status);
    if results.is_empty() {
        return;
    }

    println!(
        "{:>4} {:<18} {:>12} {:>8} {:>8} {:>12} {:>9}",
        "#", "Pair", "Net Profit", "PF", "Win %", "Max DD", "Cap P/L"
    );
    for (i, r) in results.top_n(top).iter().enumerate() {
        println!(
            "{:>4} {:<18} {:>12.2} {:>8.2} {:>8.1} {:>12.2} {:>4}/{:<4}",
            i + 1,
            r.id(),
            r.total_profit,
            r.profit_factor,
            r.win_rate * 100.0,
            r.max_drawdown,
            r.hit_profit_limit_days,
            r.hit_loss_limit_days
        );
    }

    for f in &results.failures {
        eprintln!("Failed {}: {}", f.limits.id(), f.message);
    }
}
