//! The single scheduling entry point.
//!
//! `schedule(tasks, ch_avail, algorithm)` validates its inputs, dispatches on
//! the strategy tag, and returns the schedule with diagnostics. Inputs are
//! never mutated.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Algorithm;
use crate::error::Result;
use crate::heuristics::{earliest_release, priority_sorter, random_sequencer};
use crate::models::{Diagnostics, Schedule, SearchResult, Task};
use crate::search::{branch_bound, brute_force, mcts};
use crate::validation::validate_problem;

/// Schedule `tasks` on channels with initial availabilities `ch_avail`.
pub fn schedule(tasks: &[Task], ch_avail: &[f64], algorithm: &Algorithm) -> Result<SearchResult> {
    algorithm.validate()?;
    validate_problem(tasks, ch_avail)?;

    let started = Instant::now();
    let mut result = match algorithm {
        Algorithm::BranchAndBound(config) => branch_bound(tasks, ch_avail, config)?,
        Algorithm::Mcts(config) => mcts(tasks, ch_avail, config)?,
        Algorithm::BruteForce { max_tasks } => brute_force(tasks, ch_avail, *max_tasks)?,
        Algorithm::EarliestRelease { swap } => {
            single_pass(earliest_release(tasks, ch_avail, swap.as_ref())?)
        }
        Algorithm::PrioritySorter { key, descending } => {
            single_pass(priority_sorter(tasks, ch_avail, key, *descending)?)
        }
        Algorithm::RandomSequencer { seed } => {
            let mut rng = StdRng::seed_from_u64(*seed);
            single_pass(random_sequencer(tasks, ch_avail, &mut rng)?)
        }
    };
    result.diagnostics.runtime_secs = started.elapsed().as_secs_f64();
    Ok(result)
}

fn single_pass(schedule: Schedule) -> SearchResult {
    SearchResult {
        schedule,
        diagnostics: Diagnostics {
            evaluations: 1,
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BranchBoundConfig, MctsConfig, SwapConfig};
    use crate::error::SchedulingError;
    use crate::heuristics::PriorityKey;
    use crate::test_support::contended_problem;
    use crate::validation::check_schedule;

    fn every_algorithm() -> Vec<Algorithm> {
        vec![
            Algorithm::BranchAndBound(BranchBoundConfig::default()),
            Algorithm::Mcts(MctsConfig {
                max_rollouts: 100,
                ..Default::default()
            }),
            Algorithm::BruteForce { max_tasks: 8 },
            Algorithm::EarliestRelease { swap: None },
            Algorithm::EarliestRelease {
                swap: Some(SwapConfig::default()),
            },
            Algorithm::PrioritySorter {
                key: PriorityKey::DropTime,
                descending: false,
            },
            Algorithm::RandomSequencer { seed: 3 },
        ]
    }

    #[test]
    fn test_every_algorithm_is_feasible() {
        let mut rng = StdRng::seed_from_u64(30);
        let (tasks, ch_avail) = contended_problem(&mut rng, 6, 2);
        let snapshot = (tasks.clone(), ch_avail.clone());
        for algorithm in every_algorithm() {
            let result = schedule(&tasks, &ch_avail, &algorithm).unwrap();
            assert!(
                check_schedule(&tasks, &ch_avail, &result.schedule).is_ok(),
                "{} produced an infeasible schedule",
                algorithm.name()
            );
            assert!(result.diagnostics.runtime_secs >= 0.0);
        }
        assert_eq!(snapshot, (tasks, ch_avail));
    }

    #[test]
    fn test_only_exact_strategies_claim_optimality() {
        let mut rng = StdRng::seed_from_u64(31);
        let (tasks, ch_avail) = contended_problem(&mut rng, 5, 1);
        let exact = schedule(&tasks, &ch_avail, &Algorithm::BruteForce { max_tasks: 8 }).unwrap();
        for algorithm in every_algorithm() {
            let result = schedule(&tasks, &ch_avail, &algorithm).unwrap();
            let exact_strategy = matches!(
                algorithm,
                Algorithm::BranchAndBound(_) | Algorithm::BruteForce { .. }
            );
            assert_eq!(result.is_optimal(), exact_strategy, "{}", algorithm.name());
            assert!(result.loss() >= exact.loss() - 1e-9);
        }
    }

    #[test]
    fn test_rejects_bad_input_before_dispatch() {
        let tasks = vec![Task::new(1.0, 0.0, 1.0).unwrap()];
        let err = schedule(&tasks, &[], &Algorithm::default()).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidInput(_)));

        let bad = Algorithm::Mcts(MctsConfig {
            c_explore: -1.0,
            ..Default::default()
        });
        let err = schedule(&tasks, &[0.0], &bad).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidConfig(_)));
    }

    #[test]
    fn test_single_task_starts_at_release() {
        let tasks = vec![Task::new(2.0, 1.5, 1.0).unwrap()];
        for algorithm in every_algorithm() {
            let result = schedule(&tasks, &[0.0, 3.0], &algorithm).unwrap();
            assert_eq!(result.schedule.t_ex, vec![1.5]);
            assert_eq!(result.schedule.ch_ex, vec![0]);
            assert_eq!(result.loss(), 0.0);
        }
    }
}
