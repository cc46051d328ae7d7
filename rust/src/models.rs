//! Core data types for the scheduling engine.

use std::cmp::Ordering;

use crate::error::{Result, SchedulingError};

/// A task to be scheduled.
///
/// Loss grows linearly at `slope` from the release time and saturates to
/// `drop_loss` once the start time passes `drop_time`. Both drop parameters
/// default to +inf, which yields a purely linear loss.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    duration: f64,
    release_time: f64,
    slope: f64,
    drop_time: f64,
    drop_loss: f64,
}

impl Task {
    /// Create a task with a linear (never saturating) loss.
    pub fn new(duration: f64, release_time: f64, slope: f64) -> Result<Self> {
        Self::with_drop(duration, release_time, slope, f64::INFINITY, f64::INFINITY)
    }

    /// Create a task whose loss saturates to `drop_loss` after `drop_time`.
    pub fn with_drop(
        duration: f64,
        release_time: f64,
        slope: f64,
        drop_time: f64,
        drop_loss: f64,
    ) -> Result<Self> {
        if !(duration.is_finite() && duration > 0.0) {
            return Err(SchedulingError::invalid_input(format!(
                "duration must be finite and positive, got {}",
                duration
            )));
        }
        if !release_time.is_finite() {
            return Err(SchedulingError::invalid_input(format!(
                "release time must be finite, got {}",
                release_time
            )));
        }
        if !(slope.is_finite() && slope >= 0.0) {
            return Err(SchedulingError::invalid_input(format!(
                "slope must be finite and non-negative, got {}",
                slope
            )));
        }
        if drop_time.is_nan() || drop_loss.is_nan() {
            return Err(SchedulingError::invalid_input("drop parameters must not be NaN"));
        }
        if drop_loss < 0.0 {
            return Err(SchedulingError::invalid_input(format!(
                "drop loss must be non-negative, got {}",
                drop_loss
            )));
        }
        // An infinite drop time never saturates, so drop_loss is irrelevant
        if drop_time.is_finite() {
            let accrued = slope * (drop_time - release_time);
            if drop_loss < accrued {
                return Err(SchedulingError::invalid_input(format!(
                    "drop loss {} is below the loss {} accrued by drop time {}",
                    drop_loss, accrued, drop_time
                )));
            }
        }

        Ok(Self {
            duration,
            release_time,
            slope,
            drop_time,
            drop_loss,
        })
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn release_time(&self) -> f64 {
        self.release_time
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn drop_time(&self) -> f64 {
        self.drop_time
    }

    pub fn drop_loss(&self) -> f64 {
        self.drop_loss
    }

    /// Loss incurred when the task starts at `start_time`.
    ///
    /// Fails with `SchedulingError::Domain` when `start_time` precedes the
    /// release time.
    pub fn loss(&self, start_time: f64) -> Result<f64> {
        // Negated so a NaN start time is rejected too
        if !(start_time >= self.release_time) {
            return Err(SchedulingError::Domain {
                start_time,
                release_time: self.release_time,
            });
        }
        Ok(self.loss_unchecked(start_time))
    }

    /// Loss at a start time the caller already knows is feasible.
    ///
    /// The evaluators compute start times as `max(availability, release)`,
    /// so the release check in `loss` is redundant on their hot path.
    #[inline]
    pub(crate) fn loss_unchecked(&self, start_time: f64) -> f64 {
        if start_time <= self.drop_time {
            self.slope * (start_time - self.release_time)
        } else {
            self.drop_loss
        }
    }

    /// Earliest legal start time given a channel that frees up at `available`.
    #[inline]
    pub fn start_time(&self, available: f64) -> f64 {
        available.max(self.release_time)
    }
}

/// A complete schedule, aligned to the input task indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Schedule {
    /// Execution start time per task.
    pub t_ex: Vec<f64>,
    /// Execution channel per task.
    pub ch_ex: Vec<usize>,
    /// Total loss of all tasks.
    pub loss: f64,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.t_ex.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t_ex.is_empty()
    }

    /// Task indices sorted by ascending start time (stable on ties).
    ///
    /// On a single channel this recovers the sequence that produced the
    /// schedule.
    pub fn execution_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.t_ex.len()).collect();
        order.sort_by(|&a, &b| {
            self.t_ex[a]
                .partial_cmp(&self.t_ex[b])
                .unwrap_or(Ordering::Equal)
        });
        order
    }
}

/// Search statistics reported alongside every schedule.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    /// Wall-clock seconds spent inside the scheduler.
    pub runtime_secs: f64,
    /// True only when the schedule is certified optimal.
    pub optimal: bool,
    /// Search nodes expanded (branch-and-bound, MCTS tree).
    pub nodes_expanded: u64,
    /// Search nodes discarded by bounding or dominance.
    pub nodes_pruned: u64,
    /// Full-schedule evaluations performed (MCTS rollouts, brute force).
    pub evaluations: u64,
    /// Number of times the best-known schedule improved.
    pub incumbent_updates: u64,
}

/// A schedule together with the diagnostics of the run that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub schedule: Schedule,
    pub diagnostics: Diagnostics,
}

impl SearchResult {
    pub fn loss(&self) -> f64 {
        self.schedule.loss
    }

    pub fn is_optimal(&self) -> bool {
        self.diagnostics.optimal
    }
}
