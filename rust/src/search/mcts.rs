//! Monte Carlo Tree Search over task orderings.
//!
//! Each iteration has four phases:
//!
//! 1. **Selection**: descend from the root by upper-confidence score, with
//!    unvisited children first
//! 2. **Expansion**: a leaf visited more than `th_visit` times gets one child
//!    per unplaced task
//! 3. **Rollout**: complete the sequence with the configured policy and
//!    evaluate it
//! 4. **Backpropagation**: add the rollout reward (negative loss) to every
//!    node on the path
//!
//! Tree nodes live in an arena and store only the task they append. The
//! partial schedule for the current path is kept on one incremental node and
//! unwound after each iteration.
//!
//! Rollouts are randomized, so the result is the best complete schedule seen
//! in any rollout rather than the most-visited path.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::{MctsConfig, RolloutPolicy};
use crate::error::Result;
use crate::heuristics::{complete_in_order, earliest_release_order};
use crate::models::{Diagnostics, Schedule, SearchResult, Task};
use crate::node::IncrementalNode;
use crate::validation::validate_problem;
use crate::{log_checks, log_debug, log_progress};

use super::budget::Budget;

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Clone, Debug)]
struct TreeNode {
    /// Task appended by this node (None for the root).
    task: Option<usize>,
    children: Vec<NodeId>,
    expanded: bool,
    visits: u64,
    total_reward: f64,
}

impl TreeNode {
    fn new(task: Option<usize>) -> Self {
        Self {
            task,
            children: Vec::new(),
            expanded: false,
            visits: 0,
            total_reward: 0.0,
        }
    }

    fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_reward / self.visits as f64
        }
    }
}

struct Mcts<'c> {
    config: &'c MctsConfig,
    nodes: Vec<TreeNode>,
    rng: StdRng,
    release_order: Vec<usize>,
    best: Option<Schedule>,
    diagnostics: Diagnostics,
}

impl<'c> Mcts<'c> {
    fn new(tasks: &[Task], config: &'c MctsConfig) -> Self {
        Self {
            config,
            nodes: vec![TreeNode::new(None)],
            rng: StdRng::seed_from_u64(config.seed),
            release_order: earliest_release_order(tasks),
            best: None,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Child of `id` with the highest upper-confidence score.
    ///
    /// Unvisited children win immediately, in creation order.
    fn select_child(&self, id: NodeId) -> Option<NodeId> {
        let parent = &self.nodes[id];
        let ln_parent = (parent.visits.max(1) as f64).ln();
        let mut best: Option<(NodeId, f64)> = None;
        for &child_id in &parent.children {
            let child = &self.nodes[child_id];
            if child.visits == 0 {
                return Some(child_id);
            }
            let score = child.mean_reward()
                + self.config.c_explore * (ln_parent / child.visits as f64).sqrt();
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((child_id, score));
            }
        }
        best.map(|(child_id, _)| child_id)
    }

    fn expand(&mut self, id: NodeId, state: &IncrementalNode) {
        let unplaced: Vec<usize> = state.unplaced().collect();
        for n in unplaced {
            let child_id = self.nodes.len();
            self.nodes.push(TreeNode::new(Some(n)));
            self.nodes[id].children.push(child_id);
        }
        self.nodes[id].expanded = true;
        self.diagnostics.nodes_expanded += 1;
        log_checks!(
            self.config.verbosity,
            "    expand node {} at depth {} into {} children",
            id,
            state.depth(),
            self.nodes[id].children.len()
        );
    }

    /// Walk down from the root, pushing each chosen task onto `state`.
    fn select(&mut self, state: &mut IncrementalNode) -> Result<Vec<NodeId>> {
        let mut path = vec![ROOT];
        let mut id = ROOT;
        while !state.is_complete() {
            if !self.nodes[id].expanded {
                if self.nodes[id].visits <= self.config.th_visit {
                    break;
                }
                self.expand(id, state);
            }
            let Some(child_id) = self.select_child(id) else {
                break;
            };
            if let Some(n) = self.nodes[child_id].task {
                state.push(n)?;
            }
            path.push(child_id);
            id = child_id;
        }
        Ok(path)
    }

    /// Complete `state` with the rollout policy and return its loss.
    fn rollout(&mut self, state: &IncrementalNode) -> Result<f64> {
        let completed = match self.config.rollout_policy {
            RolloutPolicy::Random => {
                let mut remaining: Vec<usize> = state.unplaced().collect();
                remaining.shuffle(&mut self.rng);
                let mut completed = state.clone();
                for n in remaining {
                    completed.push(n)?;
                }
                completed
            }
            RolloutPolicy::EarliestRelease => complete_in_order(state, &self.release_order)?,
        };
        self.diagnostics.evaluations += 1;

        let loss = completed.loss();
        if self.best.as_ref().map_or(true, |b| loss < b.loss) {
            self.best = Some(completed.to_schedule()?);
            self.diagnostics.incumbent_updates += 1;
            log_progress!(
                self.config.verbosity,
                "mcts: new best loss={:.6} at rollout {}",
                loss,
                self.diagnostics.evaluations
            );
        }
        Ok(loss)
    }

    fn backpropagate(&mut self, path: &[NodeId], loss: f64) {
        for &id in path {
            let node = &mut self.nodes[id];
            node.visits += 1;
            node.total_reward -= loss;
        }
    }

    fn run(&mut self, root: &mut IncrementalNode, budget: &Budget) -> Result<()> {
        // At least one rollout, even under an expired budget
        while self.diagnostics.evaluations == 0
            || !budget.exhausted(self.diagnostics.evaluations)
        {
            let path = self.select(root)?;
            let loss = self.rollout(root)?;
            log_debug!(
                self.config.verbosity,
                "  rollout {} from depth {}: loss={:.6}",
                self.diagnostics.evaluations,
                root.depth(),
                loss
            );
            self.backpropagate(&path, loss);
            while root.pop().is_some() {}
        }
        Ok(())
    }
}

/// Search for a low-loss schedule by Monte Carlo Tree Search.
///
/// The result is never reported optimal.
pub fn mcts(tasks: &[Task], ch_avail: &[f64], config: &MctsConfig) -> Result<SearchResult> {
    validate_problem(tasks, ch_avail)?;
    config.validate()?;

    let budget = Budget::start(config.max_runtime, Some(config.max_rollouts));
    let mut root = IncrementalNode::new(tasks, ch_avail)?;
    let mut search = Mcts::new(tasks, config);
    search.run(&mut root, &budget)?;

    let mut diagnostics = search.diagnostics;
    diagnostics.optimal = false;
    diagnostics.runtime_secs = budget.elapsed_secs();
    let schedule = match search.best {
        Some(schedule) => schedule,
        // Unreachable after the mandatory first rollout
        None => complete_in_order(&root, &search.release_order)?.to_schedule()?,
    };
    log_progress!(
        config.verbosity,
        "mcts: loss={:.6} after {} rollouts, {} tree nodes, {:.3}s",
        schedule.loss,
        diagnostics.evaluations,
        search.nodes.len(),
        diagnostics.runtime_secs
    );
    Ok(SearchResult {
        schedule,
        diagnostics,
    })
}
