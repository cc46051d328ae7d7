//! Branch-and-bound search over task orderings.
//!
//! The search tree is rooted at the empty sequence; a node at depth d has one
//! child per unplaced task. Every expanded node is completed greedily in
//! earliest-release order to tighten the incumbent early. A child is pruned
//! when its bound cannot beat the incumbent, or when an equivalent prefix
//! (same placed set, same channel state) was already reached more cheaply.
//!
//! Exhausting the tree certifies optimality under the admissible bound. When
//! the runtime or node budget runs out first, the incumbent is returned with
//! `optimal = false`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use crate::config::{BoundKind, BranchBoundConfig, Traversal};
use crate::error::Result;
use crate::heuristics::{complete_in_order, earliest_release_order};
use crate::models::{Diagnostics, Schedule, SearchResult, Task};
use crate::node::IncrementalNode;
use crate::validation::validate_problem;
use crate::{log_checks, log_debug, log_progress};

use super::budget::Budget;

/// Key identifying prefixes that admit exactly the same completions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct StateKey {
    /// Placed task flags packed into words.
    placed: Vec<u64>,
    /// Channel availabilities, sorted, as raw bits.
    channels: Vec<u64>,
}

impl StateKey {
    fn of(node: &IncrementalNode) -> Self {
        let mut placed = vec![0u64; node.placed_mask().len().div_ceil(64)];
        for (n, &p) in node.placed_mask().iter().enumerate() {
            if p {
                placed[n / 64] |= 1 << (n % 64);
            }
        }
        let mut avail = node.channels().to_vec();
        avail.sort_by(f64::total_cmp);
        Self {
            placed,
            channels: avail.into_iter().map(f64::to_bits).collect(),
        }
    }
}

/// Best-first queue entry owning an independent node.
struct QueueEntry<'a> {
    bound: f64,
    depth: usize,
    order: u64,
    node: IncrementalNode<'a>,
}

impl PartialEq for QueueEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry<'_> {}

impl Ord for QueueEntry<'_> {
    /// Max-heap order: lowest bound first, then deeper, then oldest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bound
            .total_cmp(&self.bound)
            .then(self.depth.cmp(&other.depth))
            .then(other.order.cmp(&self.order))
    }
}

impl PartialOrd for QueueEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Search state shared by both traversal orders.
struct BranchBound<'c> {
    config: &'c BranchBoundConfig,
    completion_order: Vec<usize>,
    best: Schedule,
    diagnostics: Diagnostics,
    table: FxHashMap<StateKey, f64>,
    budget: Budget,
    stopped: bool,
}

impl<'c> BranchBound<'c> {
    fn new(root: &IncrementalNode, config: &'c BranchBoundConfig) -> Result<Self> {
        let completion_order = earliest_release_order(root.tasks());
        let best = complete_in_order(root, &completion_order)?.to_schedule()?;
        log_progress!(
            config.verbosity,
            "branch_bound: initial incumbent loss={:.6}",
            best.loss
        );
        Ok(Self {
            config,
            completion_order,
            best,
            diagnostics: Diagnostics {
                incumbent_updates: 1,
                ..Default::default()
            },
            table: FxHashMap::default(),
            budget: Budget::start(config.max_runtime, config.max_nodes),
            stopped: false,
        })
    }

    /// Replace the incumbent if `node` is complete and strictly better.
    fn offer(&mut self, node: &IncrementalNode) -> Result<()> {
        if node.is_complete() && node.loss() < self.best.loss {
            self.best = node.to_schedule()?;
            self.diagnostics.incumbent_updates += 1;
            log_progress!(
                self.config.verbosity,
                "branch_bound: new incumbent loss={:.6} after {} expansions",
                self.best.loss,
                self.diagnostics.nodes_expanded
            );
        }
        Ok(())
    }

    /// Greedy completion of `node`, offered as a candidate incumbent.
    fn offer_completion(&mut self, node: &IncrementalNode) -> Result<f64> {
        let completed = complete_in_order(node, &self.completion_order)?;
        self.offer(&completed)?;
        Ok(completed.loss())
    }

    /// Bound on the best completion of `node`.
    fn bound(&mut self, node: &IncrementalNode) -> Result<f64> {
        match self.config.bound {
            BoundKind::Admissible => Ok(admissible_bound(node)),
            BoundKind::Heuristic => self.offer_completion(node),
        }
    }

    fn is_pruned(&self, bound: f64) -> bool {
        match self.config.bound {
            BoundKind::Admissible => bound >= self.best.loss,
            // The heuristic bound is itself a feasible loss; ties must survive
            // or the node that set the incumbent would prune itself.
            BoundKind::Heuristic => bound > self.best.loss,
        }
    }

    /// Record `node` in the dominance table. Returns false if an equivalent
    /// prefix with loss <= this one was seen before.
    fn admit(&mut self, node: &IncrementalNode) -> bool {
        if !self.config.dominance {
            return true;
        }
        let key = StateKey::of(node);
        match self.table.get_mut(&key) {
            Some(seen) if *seen <= node.loss() => false,
            Some(seen) => {
                *seen = node.loss();
                true
            }
            None => {
                if self.table.len() < self.config.max_table_entries {
                    self.table.insert(key, node.loss());
                }
                true
            }
        }
    }

    /// True if a cheaper equivalent prefix was recorded after `node` was queued.
    fn is_stale(&self, node: &IncrementalNode) -> bool {
        if !self.config.dominance {
            return false;
        }
        self.table
            .get(&StateKey::of(node))
            .is_some_and(|&seen| seen < node.loss())
    }

    fn run_best_first(&mut self, root: IncrementalNode) -> Result<()> {
        let mut heap = BinaryHeap::new();
        let mut order = 0u64;
        let root_bound = admissible_bound(&root);
        heap.push(QueueEntry {
            bound: root_bound,
            depth: 0,
            order,
            node: root,
        });

        while let Some(entry) = heap.pop() {
            // Pruning first, so a budget that runs out with only prunable
            // entries left still finishes the search
            if self.is_pruned(entry.bound) || self.is_stale(&entry.node) {
                self.diagnostics.nodes_pruned += 1;
                continue;
            }
            if self.budget.exhausted(self.diagnostics.nodes_expanded) {
                self.stopped = true;
                log_progress!(
                    self.config.verbosity,
                    "branch_bound: budget exhausted with {} nodes queued",
                    heap.len() + 1
                );
                break;
            }

            let node = entry.node;
            self.diagnostics.nodes_expanded += 1;
            log_debug!(
                self.config.verbosity,
                "  expand depth={} bound={:.6} loss={:.6} queued={}",
                node.depth(),
                entry.bound,
                node.loss(),
                heap.len()
            );
            self.offer_completion(&node)?;

            let unplaced: Vec<usize> = node.unplaced().collect();
            for n in unplaced {
                let mut child = node.clone();
                child.push(n)?;
                if child.is_complete() {
                    self.offer(&child)?;
                    continue;
                }
                let bound = self.bound(&child)?;
                if self.is_pruned(bound) {
                    self.diagnostics.nodes_pruned += 1;
                    log_checks!(
                        self.config.verbosity,
                        "    prune task {} at depth {}: bound {:.6} vs incumbent {:.6}",
                        n,
                        child.depth(),
                        bound,
                        self.best.loss
                    );
                    continue;
                }
                if !self.admit(&child) {
                    self.diagnostics.nodes_pruned += 1;
                    log_checks!(
                        self.config.verbosity,
                        "    prune task {} at depth {}: dominated prefix",
                        n,
                        child.depth()
                    );
                    continue;
                }
                order += 1;
                heap.push(QueueEntry {
                    bound,
                    depth: child.depth(),
                    order,
                    node: child,
                });
            }
        }
        Ok(())
    }

    fn run_depth_first(&mut self, node: &mut IncrementalNode) -> Result<()> {
        if node.is_complete() {
            return self.offer(node);
        }
        if self.budget.exhausted(self.diagnostics.nodes_expanded) {
            self.stopped = true;
            return Ok(());
        }

        self.diagnostics.nodes_expanded += 1;
        self.offer_completion(node)?;

        // Score all children on the shared node, then visit best bound first
        let unplaced: Vec<usize> = node.unplaced().collect();
        let mut children = Vec::with_capacity(unplaced.len());
        for n in unplaced {
            node.push(n)?;
            let bound = if node.is_complete() {
                node.loss()
            } else {
                self.bound(node)?
            };
            node.pop();
            children.push((bound, n));
        }
        children.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        for (bound, n) in children {
            if self.stopped {
                break;
            }
            // The incumbent may have improved since the child was scored
            if self.is_pruned(bound) {
                self.diagnostics.nodes_pruned += 1;
                log_checks!(
                    self.config.verbosity,
                    "    prune task {} at depth {}: bound {:.6} vs incumbent {:.6}",
                    n,
                    node.depth() + 1,
                    bound,
                    self.best.loss
                );
                continue;
            }
            node.push(n)?;
            if node.is_complete() || self.admit(node) {
                self.run_depth_first(node)?;
            } else {
                self.diagnostics.nodes_pruned += 1;
            }
            node.pop();
        }
        Ok(())
    }

    fn finish(mut self) -> SearchResult {
        self.diagnostics.optimal = !self.stopped && self.config.bound == BoundKind::Admissible;
        self.diagnostics.runtime_secs = self.budget.elapsed_secs();
        log_progress!(
            self.config.verbosity,
            "branch_bound: loss={:.6} optimal={} expanded={} pruned={} in {:.3}s",
            self.best.loss,
            self.diagnostics.optimal,
            self.diagnostics.nodes_expanded,
            self.diagnostics.nodes_pruned,
            self.diagnostics.runtime_secs
        );
        SearchResult {
            schedule: self.best,
            diagnostics: self.diagnostics,
        }
    }
}

/// Lower bound on the loss of any completion of `node`.
///
/// Channel availabilities never decrease, so no unplaced task can start
/// before both its release time and the earliest channel availability, and
/// losses are non-decreasing in start time.
pub fn admissible_bound(node: &IncrementalNode) -> f64 {
    let t_min = node.earliest_available();
    let tasks = node.tasks();
    node.loss()
        + node
            .unplaced()
            .map(|n| tasks[n].loss_unchecked(tasks[n].start_time(t_min)))
            .sum::<f64>()
}

/// Find a minimum-loss schedule by branch-and-bound.
pub fn branch_bound(tasks: &[Task], ch_avail: &[f64], config: &BranchBoundConfig) -> Result<SearchResult> {
    validate_problem(tasks, ch_avail)?;
    config.validate()?;

    let mut root = IncrementalNode::new(tasks, ch_avail)?;
    let mut search = BranchBound::new(&root, config)?;
    match config.traversal {
        Traversal::BestFirst => search.run_best_first(root)?,
        Traversal::DepthFirst => search.run_depth_first(&mut root)?,
    }
    Ok(search.finish())
}
