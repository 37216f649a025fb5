//! Sweep configuration, loaded from TOML.
//!
//! ```toml
//! workers = 4
//! profit_limits = { start = 200, end = 2000, step = 100 }
//! loss_limits = [100, 250, 500]
//! ```
//!
//! Ranges are expanded here, on the caller side; the optimizer only ever
//! sees explicit candidate lists.

use std::path::Path;

use caplab_core::LimitKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sweep::{LimitGrid, DEFAULT_WORKERS};

/// Upper bound on the values a single range may expand to.
pub const MAX_RANGE_VALUES: usize = 10_000;

/// Errors from reading or expanding a sweep config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{kind} range step must be a positive finite number, got {step}")]
    InvalidStep { kind: LimitKind, step: f64 },

    #[error("{kind} range start {start} is after end {end}")]
    InvertedRange { kind: LimitKind, start: f64, end: f64 },

    #[error("{kind} range expands to more than {max} values")]
    RangeTooLarge { kind: LimitKind, max: usize },
}

/// Candidate values for one side of the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LimitSpec {
    /// Explicit candidates, evaluated in the given order.
    List(Vec<f64>),
    /// Inclusive `start..=end` in increments of `step`.
    Range { start: f64, end: f64, step: f64 },
}

impl LimitSpec {
    /// Materialize the candidate list.
    ///
    /// Range values are computed as `start + i * step` rather than by
    /// repeated addition, then rounded to micro-dollars, so `end` is reached
    /// exactly when the step divides the span.
    pub fn expand(&self, kind: LimitKind) -> Result<Vec<f64>, ConfigError> {
        match *self {
            LimitSpec::List(ref values) => Ok(values.clone()),
            LimitSpec::Range { start, end, step } => {
                if !step.is_finite() || step <= 0.0 {
                    return Err(ConfigError::InvalidStep { kind, step });
                }
                if start > end {
                    return Err(ConfigError::InvertedRange { kind, start, end });
                }

                let steps = ((end - start) / step + 1e-9).floor();
                if !steps.is_finite() || steps >= MAX_RANGE_VALUES as f64 {
                    return Err(ConfigError::RangeTooLarge {
                        kind,
                        max: MAX_RANGE_VALUES,
                    });
                }
                Ok((0..=steps as usize)
                    .map(|i| round_micros(start + i as f64 * step))
                    .collect())
            }
        }
    }
}

fn round_micros(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

/// A complete sweep definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub profit_limits: LimitSpec,
    pub loss_limits: LimitSpec,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            profit_limits: LimitSpec::Range {
                start: 200.0,
                end: 2000.0,
                step: 100.0,
            },
            loss_limits: LimitSpec::Range {
                start: 100.0,
                end: 1000.0,
                step: 100.0,
            },
            workers: DEFAULT_WORKERS,
        }
    }
}

impl SweepConfig {
    /// Load a sweep config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a sweep config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Expand both sides into the grid the optimizer runs.
    ///
    /// Limit values themselves are validated by the optimizer.
    pub fn grid(&self) -> Result<LimitGrid, ConfigError> {
        Ok(LimitGrid::new(
            self.profit_limits.expand(LimitKind::Profit)?,
            self.loss_limits.expand(LimitKind::Loss)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_inclusive() {
        let spec = LimitSpec::Range {
            start: 100.0,
            end: 300.0,
            step: 100.0,
        };
        assert_eq!(
            spec.expand(LimitKind::Profit).unwrap(),
            vec![100.0, 200.0, 300.0]
        );
    }

    #[test]
    fn fractional_step_has_no_drift() {
        let spec = LimitSpec::Range {
            start: 0.1,
            end: 0.5,
            step: 0.1,
        };
        let values = spec.expand(LimitKind::Loss).unwrap();
        assert_eq!(values, vec![0.1, 0.2, 0.3, 0.4, 0.5]);
    }

    #[test]
    fn range_stops_before_overshooting_end() {
        let spec = LimitSpec::Range {
            start: 100.0,
            end: 350.0,
            step: 100.0,
        };
        assert_eq!(
            spec.expand(LimitKind::Profit).unwrap(),
            vec![100.0, 200.0, 300.0]
        );
    }

    #[test]
    fn single_point_range() {
        let spec = LimitSpec::Range {
            start: 50.0,
            end: 50.0,
            step: 10.0,
        };
        assert_eq!(spec.expand(LimitKind::Loss).unwrap(), vec![50.0]);
    }

    #[test]
    fn bad_ranges_rejected() {
        let zero_step = LimitSpec::Range {
            start: 1.0,
            end: 2.0,
            step: 0.0,
        };
        assert!(matches!(
            zero_step.expand(LimitKind::Profit),
            Err(ConfigError::InvalidStep { .. })
        ));

        let inverted = LimitSpec::Range {
            start: 5.0,
            end: 2.0,
            step: 1.0,
        };
        assert!(matches!(
            inverted.expand(LimitKind::Profit),
            Err(ConfigError::InvertedRange { .. })
        ));

        let huge = LimitSpec::Range {
            start: 1.0,
            end: 1e9,
            step: 1.0,
        };
        assert!(matches!(
            huge.expand(LimitKind::Loss),
            Err(ConfigError::RangeTooLarge { .. })
        ));
    }

    #[test]
    fn parses_list_and_range_forms() {
        let config = SweepConfig::from_toml(
            r#"
workers = 2
profit_limits = { start = 100, end = 300, step = 100 }
loss_limits = [50, 75.5]
"#,
        )
        .unwrap();

        assert_eq!(config.workers, 2);
        let grid = config.grid().unwrap();
        assert_eq!(grid.profit_limits, vec![100.0, 200.0, 300.0]);
        assert_eq!(grid.loss_limits, vec![50.0, 75.5]);
    }

    #[test]
    fn workers_default_to_four() {
        let config = SweepConfig::from_toml("profit_limits = [100]\nloss_limits = [50]").unwrap();
        assert_eq!(config.workers, DEFAULT_WORKERS);
    }

    #[test]
    fn default_matches_stock_ranges() {
        let grid = SweepConfig::default().grid().unwrap();
        assert_eq!(grid.profit_limits.len(), 19);
        assert_eq!(grid.loss_limits.len(), 10);
        assert_eq!(grid.profit_limits.last(), Some(&2000.0));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            SweepConfig::from_toml("profit_limits = \"lots\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SweepConfig::from_file(Path::new("/nonexistent/sweep.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
