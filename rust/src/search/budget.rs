//! Wall-clock and iteration budgets for anytime search.

use std::time::{Duration, Instant};

/// Deadline checked between node expansions or rollouts.
#[derive(Clone, Debug)]
pub struct Budget {
    started: Instant,
    deadline: Option<Instant>,
    max_iterations: Option<u64>,
}

impl Budget {
    /// Start a budget now. `max_runtime` is in seconds.
    pub fn start(max_runtime: Option<f64>, max_iterations: Option<u64>) -> Self {
        let started = Instant::now();
        let deadline = max_runtime.map(|secs| {
            // Durations beyond what Instant can represent mean "no deadline"
            Duration::try_from_secs_f64(secs)
                .ok()
                .and_then(|d| started.checked_add(d))
        });
        Self {
            started,
            deadline: deadline.flatten(),
            max_iterations,
        }
    }

    /// True once the deadline passed or `iterations` reached the cap.
    #[inline]
    pub fn exhausted(&self, iterations: u64) -> bool {
        if let Some(max) = self.max_iterations {
            if iterations >= max {
                return true;
            }
        }
        self.timed_out()
    }

    #[inline]
    pub fn timed_out(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Seconds since the budget started.
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_budget() {
        let budget = Budget::start(None, None);
        assert!(!budget.exhausted(u64::MAX - 1));
        assert!(!budget.timed_out());
    }

    #[test]
    fn test_iteration_cap() {
        let budget = Budget::start(None, Some(3));
        assert!(!budget.exhausted(2));
        assert!(budget.exhausted(3));
    }

    #[test]
    fn test_zero_runtime_is_expired() {
        let budget = Budget::start(Some(0.0), None);
        assert!(budget.timed_out());
        assert!(budget.exhausted(0));
    }

    #[test]
    fn test_huge_runtime_never_expires() {
        let budget = Budget::start(Some(f64::INFINITY), None);
        assert!(!budget.timed_out());
        assert!(budget.elapsed_secs() >= 0.0);
    }
}
