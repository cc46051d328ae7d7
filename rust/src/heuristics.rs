//! Single-pass priority heuristics.
//!
//! Each heuristic builds an ordering of all tasks and evaluates it once with
//! the list scheduler:
//! - `earliest_release`: ascending release time, optional adjacent-swap
//!   refinement
//! - `priority_sorter`: ascending or descending caller-chosen key
//! - `random_sequencer`: uniformly random order
//!
//! The earliest-release ordering doubles as the completion heuristic for
//! branch-and-bound and for MCTS rollouts.

use std::cmp::Ordering;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::SwapConfig;
use crate::error::{Result, SchedulingError};
use crate::models::{Schedule, Task};
use crate::node::{IncrementalNode, ScheduleNode};
use crate::validation::validate_problem;

/// Scalar priority per task.
#[derive(Clone, Debug, PartialEq)]
pub enum PriorityKey {
    Release,
    DropTime,
    DropLoss,
    Slope,
    Duration,
    /// Linear combination of task parameters. Zero weights are skipped, so
    /// infinite drop parameters only matter when weighted.
    Weighted {
        release: f64,
        drop_time: f64,
        drop_loss: f64,
        slope: f64,
        duration: f64,
    },
    /// Caller-supplied priority per task index.
    Values(Vec<f64>),
}

impl PriorityKey {
    /// Key value for task `n`.
    pub fn value(&self, n: usize, task: &Task) -> f64 {
        match self {
            Self::Release => task.release_time(),
            Self::DropTime => task.drop_time(),
            Self::DropLoss => task.drop_loss(),
            Self::Slope => task.slope(),
            Self::Duration => task.duration(),
            Self::Weighted {
                release,
                drop_time,
                drop_loss,
                slope,
                duration,
            } => [
                (*release, task.release_time()),
                (*drop_time, task.drop_time()),
                (*drop_loss, task.drop_loss()),
                (*slope, task.slope()),
                (*duration, task.duration()),
            ]
            .iter()
            .filter(|(w, _)| *w != 0.0)
            .map(|(w, v)| w * v)
            .sum(),
            Self::Values(values) => values.get(n).copied().unwrap_or(f64::NAN),
        }
    }

    fn validate(&self, n_tasks: usize) -> Result<()> {
        if let Self::Values(values) = self {
            if values.len() != n_tasks {
                return Err(SchedulingError::invalid_input(format!(
                    "{} priority values for {} tasks",
                    values.len(),
                    n_tasks
                )));
            }
            if values.iter().any(|v| v.is_nan()) {
                return Err(SchedulingError::invalid_input("priority values must not be NaN"));
            }
        }
        Ok(())
    }
}

impl FromStr for PriorityKey {
    type Err = SchedulingError;

    /// Parse a named single-parameter key. Accepts both the long names and
    /// the `t_release`/`t_drop`/`l_drop` shorthands.
    fn from_str(name: &str) -> Result<Self> {
        match name {
            "release" | "t_release" => Ok(Self::Release),
            "drop_time" | "t_drop" => Ok(Self::DropTime),
            "drop_loss" | "l_drop" => Ok(Self::DropLoss),
            "slope" => Ok(Self::Slope),
            "duration" => Ok(Self::Duration),
            other => Err(SchedulingError::invalid_config(format!(
                "unknown priority key: {}",
                other
            ))),
        }
    }
}

/// Task indices ordered by `key` (stable: ties keep index order).
pub fn priority_order(tasks: &[Task], key: &PriorityKey, descending: bool) -> Result<Vec<usize>> {
    key.validate(tasks.len())?;
    let values: Vec<f64> = tasks
        .iter()
        .enumerate()
        .map(|(n, task)| key.value(n, task))
        .collect();

    let mut order: Vec<usize> = (0..tasks.len()).collect();
    order.sort_by(|&a, &b| {
        let by_key = values[a].total_cmp(&values[b]);
        let by_key = if descending { by_key.reverse() } else { by_key };
        by_key.then(a.cmp(&b))
    });
    Ok(order)
}

/// Task indices by ascending release time, ties by index.
pub fn earliest_release_order(tasks: &[Task]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..tasks.len()).collect();
    order.sort_by(|&a, &b| {
        tasks[a]
            .release_time()
            .partial_cmp(&tasks[b].release_time())
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    order
}

/// Schedule tasks in ascending release order.
///
/// With `swap`, the sequence is refined by adjacent swaps that strictly
/// reduce total loss.
pub fn earliest_release(
    tasks: &[Task],
    ch_avail: &[f64],
    swap: Option<&SwapConfig>,
) -> Result<Schedule> {
    validate_problem(tasks, ch_avail)?;
    let order = earliest_release_order(tasks);
    match swap {
        Some(config) => Ok(swap_refine(tasks, ch_avail, order, config)?.1),
        None => ScheduleNode::evaluate(tasks, ch_avail, &order),
    }
}

/// Schedule tasks ordered by a priority key.
pub fn priority_sorter(
    tasks: &[Task],
    ch_avail: &[f64],
    key: &PriorityKey,
    descending: bool,
) -> Result<Schedule> {
    validate_problem(tasks, ch_avail)?;
    let order = priority_order(tasks, key, descending)?;
    ScheduleNode::evaluate(tasks, ch_avail, &order)
}

/// Schedule tasks in a uniformly random order.
pub fn random_sequencer<R: Rng>(tasks: &[Task], ch_avail: &[f64], rng: &mut R) -> Result<Schedule> {
    validate_problem(tasks, ch_avail)?;
    let mut order: Vec<usize> = (0..tasks.len()).collect();
    order.shuffle(rng);
    ScheduleNode::evaluate(tasks, ch_avail, &order)
}

/// Local search over adjacent swaps.
///
/// Each pass tries swapping every adjacent pair and keeps a swap only if it
/// strictly lowers total loss. Stops after a pass with no improvement or
/// after `max_passes` passes.
pub fn swap_refine(
    tasks: &[Task],
    ch_avail: &[f64],
    mut sequence: Vec<usize>,
    config: &SwapConfig,
) -> Result<(Vec<usize>, Schedule)> {
    let mut best = ScheduleNode::evaluate(tasks, ch_avail, &sequence)?;

    for _ in 0..config.max_passes {
        let mut improved = false;
        for i in 0..sequence.len().saturating_sub(1) {
            sequence.swap(i, i + 1);
            let candidate = ScheduleNode::evaluate(tasks, ch_avail, &sequence)?;
            if candidate.loss < best.loss {
                best = candidate;
                improved = true;
            } else {
                sequence.swap(i, i + 1);
            }
        }
        if !improved {
            break;
        }
    }

    Ok((sequence, best))
}

/// Complete a partial node by appending its unplaced tasks in `order`.
///
/// `order` must list every task index; placed ones are skipped.
pub fn complete_in_order<'a>(node: &IncrementalNode<'a>, order: &[usize]) -> Result<IncrementalNode<'a>> {
    let mut completed = node.clone();
    for &n in order {
        if !completed.is_placed(n) {
            completed.push(n)?;
        }
    }
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::random_problem;
    use crate::validation::check_schedule;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_tasks() -> Vec<Task> {
        vec![
            Task::with_drop(1.0, 2.0, 1.0, 10.0, 20.0).unwrap(),
            Task::with_drop(1.0, 0.0, 3.0, 4.0, 15.0).unwrap(),
            Task::with_drop(1.0, 1.0, 2.0, 5.0, 30.0).unwrap(),
            Task::new(1.0, 0.0, 0.5).unwrap(),
        ]
    }

    #[test]
    fn test_earliest_release_order_is_stable() {
        let tasks = sample_tasks();
        assert_eq!(earliest_release_order(&tasks), vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_priority_order_keys() {
        let tasks = sample_tasks();
        assert_eq!(
            priority_order(&tasks, &PriorityKey::DropTime, false).unwrap(),
            vec![1, 2, 0, 3]
        );
        assert_eq!(
            priority_order(&tasks, &PriorityKey::Slope, true).unwrap(),
            vec![1, 2, 0, 3]
        );
        // Infinite drop loss sorts last ascending, first descending
        assert_eq!(
            priority_order(&tasks, &PriorityKey::DropLoss, true).unwrap(),
            vec![3, 2, 0, 1]
        );
        assert_eq!(
            priority_order(&tasks, &PriorityKey::Values(vec![0.3, 0.1, 0.2, 0.1]), false).unwrap(),
            vec![1, 3, 2, 0]
        );
    }

    #[test]
    fn test_weighted_key_skips_zero_weights() {
        let tasks = sample_tasks();
        let key = PriorityKey::Weighted {
            release: 1.0,
            drop_time: 0.0,
            drop_loss: 0.0,
            slope: -1.0,
            duration: 0.0,
        };
        // release - slope: [1.0, -3.0, -1.0, -0.5]
        assert_eq!(priority_order(&tasks, &key, false).unwrap(), vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!("t_drop".parse::<PriorityKey>().unwrap(), PriorityKey::DropTime);
        assert_eq!("slope".parse::<PriorityKey>().unwrap(), PriorityKey::Slope);
        assert!(matches!(
            "urgency".parse::<PriorityKey>(),
            Err(SchedulingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_values_key_orders_by_caller_priority() {
        // slope - 1e-5 * release, a key no named variant expresses
        let tasks = sample_tasks();
        let values: Vec<f64> = tasks
            .iter()
            .map(|t| t.slope() - 1e-5 * t.release_time())
            .collect();
        let schedule =
            priority_sorter(&tasks, &[0.0], &PriorityKey::Values(values), true).unwrap();
        assert_eq!(schedule.execution_order(), vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_values_key_length_mismatch() {
        let tasks = sample_tasks();
        let err = priority_sorter(&tasks, &[0.0], &PriorityKey::Values(vec![1.0]), false);
        assert!(matches!(err, Err(SchedulingError::InvalidInput(_))));
    }

    #[test]
    fn test_heuristics_reject_empty_input() {
        assert!(earliest_release(&[], &[0.0], None).is_err());
        assert!(earliest_release(&sample_tasks(), &[], None).is_err());
    }

    #[test]
    fn test_swap_never_worse_than_greedy() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let (tasks, ch_avail) = random_problem(&mut rng, 8, 2);
            let greedy = earliest_release(&tasks, &ch_avail, None).unwrap();
            let swapped = earliest_release(&tasks, &ch_avail, Some(&SwapConfig::default())).unwrap();
            assert!(swapped.loss <= greedy.loss);
            assert!(check_schedule(&tasks, &ch_avail, &swapped).is_ok());
        }
    }

    #[test]
    fn test_swap_finds_improvement() {
        // Releasing first is worse than serving the steep task first
        let tasks = vec![
            Task::new(5.0, 0.0, 0.1).unwrap(),
            Task::new(1.0, 0.5, 10.0).unwrap(),
        ];
        let greedy = earliest_release(&tasks, &[0.0], None).unwrap();
        let swapped = earliest_release(&tasks, &[0.0], Some(&SwapConfig::default())).unwrap();
        assert!((greedy.loss - 45.0).abs() < 1e-9);
        assert!((swapped.loss - 0.15).abs() < 1e-9);
        assert_eq!(swapped.execution_order(), vec![1, 0]);
    }

    #[test]
    fn test_random_sequencer_is_reproducible() {
        let mut rng = StdRng::seed_from_u64(1);
        let (tasks, ch_avail) = random_problem(&mut rng, 10, 3);
        let a = random_sequencer(&tasks, &ch_avail, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = random_sequencer(&tasks, &ch_avail, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
        assert!(check_schedule(&tasks, &ch_avail, &a).is_ok());
    }

    #[test]
    fn test_complete_in_order_skips_placed() {
        let tasks = sample_tasks();
        let order = earliest_release_order(&tasks);
        let node = IncrementalNode::from_sequence(&tasks, &[0.0], &[2]).unwrap();
        let completed = complete_in_order(&node, &order).unwrap();
        assert_eq!(completed.sequence(), vec![2, 1, 3, 0]);
        assert_eq!(node.depth(), 1);
    }
}
