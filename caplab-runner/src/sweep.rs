//! Parameter sweep over (profit cap, loss cap) pairs.
//!
//! Every pair is an independent, pure simulation over the same read-only
//! trade history, so pairs run concurrently on a bounded rayon pool. Output
//! order never depends on the worker count or on which pair finishes first:
//! results are ranked by total profit, ties broken by grid order.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use caplab_core::{
    check_limit, DailyLimitEngine, LimitError, LimitKind, LimitPair, OptimizationResult, Simulator,
    TradeCollection,
};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::progress::{NullObserver, ProgressTracker, SweepObserver};

/// Worker count used when none is configured.
pub const DEFAULT_WORKERS: usize = 4;

/// Status reported when the sweep is handed an empty trade history.
pub const NO_TRADE_DATA: &str = "no trade data";

/// Sweep configuration errors, raised before any pair is simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SweepError {
    #[error("no {0} candidates given")]
    EmptyLimits(LimitKind),

    #[error(transparent)]
    InvalidLimit(#[from] LimitError),

    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("failed to build worker pool: {0}")]
    Pool(String),
}

// ─── Grid ────────────────────────────────────────────────────────────

/// Candidate limits for each side of the sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitGrid {
    pub profit_limits: Vec<f64>,
    pub loss_limits: Vec<f64>,
}

impl LimitGrid {
    pub fn new(profit_limits: Vec<f64>, loss_limits: Vec<f64>) -> Self {
        Self {
            profit_limits,
            loss_limits,
        }
    }

    /// Number of distinct pairs the sweep will evaluate.
    pub fn size(&self) -> usize {
        distinct(&self.profit_limits).len() * distinct(&self.loss_limits).len()
    }

    /// Reject empty candidate lists and non-positive or non-finite limits.
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.profit_limits.is_empty() {
            return Err(SweepError::EmptyLimits(LimitKind::Profit));
        }
        if self.loss_limits.is_empty() {
            return Err(SweepError::EmptyLimits(LimitKind::Loss));
        }
        for &p in &self.profit_limits {
            check_limit(LimitKind::Profit, p)?;
        }
        for &l in &self.loss_limits {
            check_limit(LimitKind::Loss, l)?;
        }
        Ok(())
    }

    /// All pairs, profit limit outer and loss limit inner.
    ///
    /// Repeated candidates are evaluated once, at their first position.
    pub fn pairs(&self) -> Vec<LimitPair> {
        let losses = distinct(&self.loss_limits);
        distinct(&self.profit_limits)
            .into_iter()
            .flat_map(|p| losses.iter().map(move |&l| LimitPair::new(p, l)))
            .collect()
    }
}

fn distinct(values: &[f64]) -> Vec<f64> {
    let mut seen = Vec::with_capacity(values.len());
    for &v in values {
        if !seen.contains(&v) {
            seen.push(v);
        }
    }
    seen
}

// ─── Results ─────────────────────────────────────────────────────────

/// A pair whose simulation returned an error or panicked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairFailure {
    /// Position of the pair in grid order.
    pub index: usize,
    pub limits: LimitPair,
    pub message: String,
}

/// Ranked output of a sweep plus what happened along the way.
#[derive(Debug, Clone)]
pub struct SweepResults {
    results: Vec<OptimizationResult>,
    by_id: HashMap<String, usize>,
    pub failures: Vec<PairFailure>,
    pub total_pairs: usize,
    /// Pairs never evaluated because the sweep was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
    pub status: String,
    /// Fingerprint of the trade history the sweep ran over.
    pub fingerprint: String,
}

impl SweepResults {
    fn new(
        results: Vec<OptimizationResult>,
        failures: Vec<PairFailure>,
        total_pairs: usize,
        skipped: usize,
        status: String,
        fingerprint: String,
    ) -> Self {
        let mut by_id = HashMap::with_capacity(results.len());
        for (rank, result) in results.iter().enumerate() {
            by_id.entry(result.id()).or_insert(rank);
        }
        Self {
            results,
            by_id,
            failures,
            total_pairs,
            skipped,
            cancelled: skipped > 0,
            status,
            fingerprint,
        }
    }

    /// Results ranked by total profit, best first.
    pub fn all(&self) -> &[OptimizationResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Look up a result by identity key, e.g. `PL200_LL50`.
    pub fn get(&self, id: &str) -> Option<&OptimizationResult> {
        self.by_id.get(id).map(|&rank| &self.results[rank])
    }

    pub fn best(&self) -> Option<&OptimizationResult> {
        self.results.first()
    }

    pub fn top_n(&self, n: usize) -> &[OptimizationResult] {
        &self.results[..n.min(self.results.len())]
    }

    /// Pairs that ran to completion, successfully or not.
    pub fn evaluated(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}

// ─── Optimizer ───────────────────────────────────────────────────────

/// Runs a simulator over every pair of a [`LimitGrid`].
pub struct Optimizer<S: Simulator = DailyLimitEngine> {
    simulator: S,
    workers: usize,
}

impl Optimizer {
    /// Optimizer over the stock daily-cap engine with [`DEFAULT_WORKERS`].
    pub fn new() -> Self {
        Self::with_simulator(DailyLimitEngine)
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Simulator> Optimizer<S> {
    pub fn with_simulator(simulator: S) -> Self {
        Self {
            simulator,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Bound the worker pool. Zero is rejected when the sweep starts.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Evaluate every pair of `grid` over `trades`.
    ///
    /// Configuration problems fail the whole call up front. Once running,
    /// a pair whose simulation errors or panics is logged and listed in
    /// [`SweepResults::failures`]; the remaining pairs still run. When
    /// `cancel` is set, pairs not yet started are skipped.
    pub fn optimize(
        &self,
        trades: &Arc<TradeCollection>,
        grid: &LimitGrid,
        observer: &dyn SweepObserver,
        cancel: Option<&AtomicBool>,
    ) -> Result<SweepResults, SweepError> {
        grid.validate()?;
        if self.workers == 0 {
            return Err(SweepError::ZeroWorkers);
        }

        let pairs = grid.pairs();
        let total = pairs.len();
        let fingerprint = trades.fingerprint();

        if trades.is_empty() {
            log::warn!("sweep skipped: {NO_TRADE_DATA}");
            observer.on_status(NO_TRADE_DATA);
            return Ok(SweepResults::new(
                Vec::new(),
                Vec::new(),
                total,
                0,
                NO_TRADE_DATA.to_string(),
                fingerprint,
            ));
        }

        log::info!(
            "sweeping {} limit pairs over {} trades with {} ({} workers)",
            total,
            trades.len(),
            self.simulator.name(),
            self.workers
        );
        observer.on_status(&format!("evaluating {total} limit pairs"));

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| SweepError::Pool(e.to_string()))?;
        let tracker = ProgressTracker::new(observer, total);

        // collect() on an indexed parallel iterator keeps grid order.
        let outcomes: Vec<Option<Result<OptimizationResult, String>>> = pool.install(|| {
            pairs
                .par_iter()
                .map(|&limits| {
                    if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                        return None;
                    }
                    let outcome = self.simulate_isolated(trades, limits);
                    tracker.pair_finished();
                    Some(outcome)
                })
                .collect()
        });

        let mut results = Vec::with_capacity(total);
        let mut failures = Vec::new();
        let mut skipped = 0;

        for (index, (limits, outcome)) in pairs.iter().zip(outcomes).enumerate() {
            match outcome {
                Some(Ok(result)) => results.push(result),
                Some(Err(message)) => {
                    log::warn!("{}: simulation failed: {}", limits.id(), message);
                    failures.push(PairFailure {
                        index,
                        limits: *limits,
                        message,
                    });
                }
                None => skipped += 1,
            }
        }
        debug_assert_eq!(tracker.completed(), results.len() + failures.len());

        // Stable sort: equal profits keep grid order.
        results.sort_by(|a, b| b.total_profit.total_cmp(&a.total_profit));

        let status = sweep_status(&results, failures.len(), skipped, total);
        log::info!("{status}");
        observer.on_status(&status);

        Ok(SweepResults::new(
            results,
            failures,
            total,
            skipped,
            status,
            fingerprint,
        ))
    }

    /// Run one pair, turning an error or a panic into a failure message.
    fn simulate_isolated(
        &self,
        trades: &Arc<TradeCollection>,
        limits: LimitPair,
    ) -> Result<OptimizationResult, String> {
        // The simulator only sees `trades` by shared reference, so nothing
        // observable is left half-updated when it unwinds.
        match panic::catch_unwind(AssertUnwindSafe(|| self.simulator.simulate(trades, limits))) {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(e.to_string()),
            Err(payload) => Err(format!("simulator panicked: {}", panic_message(&*payload))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

fn sweep_status(
    ranked: &[OptimizationResult],
    failed: usize,
    skipped: usize,
    total: usize,
) -> String {
    if skipped > 0 {
        return format!(
            "cancelled after {} of {} limit pairs",
            total - skipped,
            total
        );
    }
    match ranked.first() {
        None => format!("all {failed} limit pairs failed"),
        Some(best) if failed > 0 => format!(
            "evaluated {} limit pairs ({} failed), best {} with profit ${:.2}",
            ranked.len(),
            failed,
            best.id(),
            best.total_profit
        ),
        Some(best) => format!(
            "evaluated {} limit pairs, best {} with profit ${:.2}",
            ranked.len(),
            best.id(),
            best.total_profit
        ),
    }
}

/// Sweep with the stock engine, default workers and no observer.
pub fn optimize(
    trades: &Arc<TradeCollection>,
    profit_limits: &[f64],
    loss_limits: &[f64],
) -> Result<SweepResults, SweepError> {
    let grid = LimitGrid::new(profit_limits.to_vec(), loss_limits.to_vec());
    Optimizer::new().optimize(trades, &grid, &NullObserver, None)
}
