//! Exhaustive search over all task orderings.
//!
//! Only practical for a handful of tasks; used as a reference optimum.

use std::time::Instant;

use crate::error::{Result, SchedulingError};
use crate::models::{Diagnostics, SearchResult, Task};
use crate::node::IncrementalNode;
use crate::validation::validate_problem;

/// Evaluate every permutation and keep the first minimum-loss schedule.
///
/// Refuses problems with more than `max_tasks` tasks.
pub fn brute_force(tasks: &[Task], ch_avail: &[f64], max_tasks: usize) -> Result<SearchResult> {
    validate_problem(tasks, ch_avail)?;
    if tasks.len() > max_tasks {
        return Err(SchedulingError::invalid_config(format!(
            "brute force limited to {} tasks, got {}",
            max_tasks,
            tasks.len()
        )));
    }

    let started = Instant::now();
    let mut node = IncrementalNode::new(tasks, ch_avail)?;
    let mut best: Option<IncrementalNode> = None;
    let mut diagnostics = Diagnostics::default();
    enumerate(&mut node, &mut best, &mut diagnostics)?;

    let schedule = best
        .ok_or_else(|| SchedulingError::invalid_input("no ordering evaluated"))?
        .to_schedule()?;
    diagnostics.optimal = true;
    diagnostics.runtime_secs = started.elapsed().as_secs_f64();
    Ok(SearchResult {
        schedule,
        diagnostics,
    })
}

fn enumerate<'a>(
    node: &mut IncrementalNode<'a>,
    best: &mut Option<IncrementalNode<'a>>,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    if node.is_complete() {
        diagnostics.evaluations += 1;
        if best.as_ref().map_or(true, |b| node.loss() < b.loss()) {
            *best = Some(node.clone());
            diagnostics.incumbent_updates += 1;
        }
        return Ok(());
    }
    diagnostics.nodes_expanded += 1;
    let unplaced: Vec<usize> = node.unplaced().collect();
    for n in unplaced {
        node.push(n)?;
        enumerate(node, best, diagnostics)?;
        node.pop();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ScheduleNode;
    use crate::test_support::contended_problem;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_three_task_optimum() {
        let tasks = vec![
            Task::new(1.0, 0.0, 1.0).unwrap(),
            Task::new(2.0, 0.0, 1.0).unwrap(),
            Task::with_drop(1.0, 3.0, 2.0, 3.0, 10.0).unwrap(),
        ];
        let result = brute_force(&tasks, &[0.0], 8).unwrap();
        assert_eq!(result.schedule.t_ex, vec![0.0, 1.0, 3.0]);
        assert!((result.loss() - 1.0).abs() < 1e-12);
        assert!(result.is_optimal());
        assert_eq!(result.diagnostics.evaluations, 6);
    }

    #[test]
    fn test_no_permutation_is_better() {
        let mut rng = StdRng::seed_from_u64(3);
        let (tasks, ch_avail) = contended_problem(&mut rng, 4, 2);
        let result = brute_force(&tasks, &ch_avail, 8).unwrap();
        // Rotations and reversal are all permutations, so none may beat it
        for shift in 0..4 {
            let mut order: Vec<usize> = (0..4).map(|i| (i + shift) % 4).collect();
            let rotated = ScheduleNode::evaluate(&tasks, &ch_avail, &order).unwrap();
            assert!(result.loss() <= rotated.loss);
            order.reverse();
            let reversed = ScheduleNode::evaluate(&tasks, &ch_avail, &order).unwrap();
            assert!(result.loss() <= reversed.loss);
        }
    }

    #[test]
    fn test_refuses_large_problems() {
        let mut rng = StdRng::seed_from_u64(3);
        let (tasks, ch_avail) = contended_problem(&mut rng, 9, 1);
        let err = brute_force(&tasks, &ch_avail, 8).unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidConfig(_)));
    }
}
