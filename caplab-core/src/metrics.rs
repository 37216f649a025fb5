//! Equity-curve statistics — pure functions, curve in, scalar or series out.
//!
//! Curves here are cumulative dollar P&L starting at zero, not account
//! balances, so drawdown is reported in dollars.

use serde::{Deserialize, Serialize};

/// Largest decline from a running peak, in dollars. Always `>= 0.0`.
///
/// The peak includes the current sample, so a curve that never falls has a
/// max drawdown of exactly zero.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        let dd = peak - eq;
        if dd > max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// One sample of a drawdown series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    pub equity: f64,
    pub peak: f64,
    /// Dollar decline from `peak`.
    pub drawdown: f64,
    /// Decline as a percentage of `peak`; 0.0 while the peak is not positive.
    pub drawdown_pct: f64,
}

/// Per-sample drawdown series for charting.
pub fn drawdown_curve(equity_curve: &[f64]) -> Vec<DrawdownPoint> {
    let Some(&first) = equity_curve.first() else {
        return Vec::new();
    };
    let mut peak = first;
    equity_curve
        .iter()
        .map(|&equity| {
            peak = peak.max(equity);
            let drawdown = peak - equity;
            let drawdown_pct = if peak > 0.0 {
                drawdown / peak * 100.0
            } else {
                0.0
            };
            DrawdownPoint {
                equity,
                peak,
                drawdown,
                drawdown_pct,
            }
        })
        .collect()
}

/// True if no sample is below its predecessor.
pub fn is_non_decreasing(equity_curve: &[f64]) -> bool {
    equity_curve.windows(2).all(|w| w[1] >= w[0])
}
