//! Configuration types for the scheduling strategies.

use crate::error::{Result, SchedulingError};
use crate::heuristics::PriorityKey;

/// Order in which branch-and-bound explores partial sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Priority queue on ascending bound, deeper nodes first on ties.
    #[default]
    BestFirst,
    /// Recursive descent on a single node with undo; low memory.
    DepthFirst,
}

/// Bound used to prune branch-and-bound nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BoundKind {
    /// Every unplaced task starts no earlier than both its release time and
    /// the earliest channel availability. Never overestimates.
    #[default]
    Admissible,
    /// Loss of the earliest-release completion of the node. Tighter, but may
    /// prune the optimum, so results are never reported optimal.
    Heuristic,
}

/// Configuration for branch-and-bound search.
#[derive(Clone, Debug)]
pub struct BranchBoundConfig {
    /// Wall-clock budget in seconds (None = unlimited).
    pub max_runtime: Option<f64>,
    /// Maximum number of node expansions (None = unlimited).
    pub max_nodes: Option<u64>,
    pub traversal: Traversal,
    pub bound: BoundKind,
    /// Prune prefixes dominated by an equivalent, cheaper prefix.
    pub dominance: bool,
    /// Cap on the dominance table size.
    pub max_table_entries: usize,
    /// Verbosity level: 0=silent, 1=progress, 2=checks, 3=debug.
    pub verbosity: u8,
}

impl Default for BranchBoundConfig {
    fn default() -> Self {
        Self {
            max_runtime: None,
            max_nodes: None,
            traversal: Traversal::BestFirst,
            bound: BoundKind::Admissible,
            dominance: true,
            max_table_entries: 1_000_000,
            verbosity: 0,
        }
    }
}

impl BranchBoundConfig {
    pub fn validate(&self) -> Result<()> {
        validate_runtime(self.max_runtime)?;
        if self.max_nodes == Some(0) {
            return Err(SchedulingError::invalid_config("max_nodes must be at least 1"));
        }
        Ok(())
    }
}

/// How MCTS completes a partial sequence during a rollout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RolloutPolicy {
    /// Uniformly random order of the remaining tasks.
    #[default]
    Random,
    /// Remaining tasks by ascending release time.
    EarliestRelease,
}

/// Configuration for Monte Carlo Tree Search.
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// Maximum number of rollouts (full-schedule evaluations).
    pub max_rollouts: u64,
    /// Wall-clock budget in seconds (None = unlimited).
    pub max_runtime: Option<f64>,
    /// Exploration weight in the upper-confidence score.
    pub c_explore: f64,
    /// Visits a node needs before it is expanded into children.
    pub th_visit: u64,
    pub rollout_policy: RolloutPolicy,
    /// Seed for the rollout RNG.
    pub seed: u64,
    /// Verbosity level: 0=silent, 1=progress, 2=checks, 3=debug.
    pub verbosity: u8,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            max_rollouts: 1000,
            max_runtime: None,
            c_explore: 0.05,
            th_visit: 5,
            rollout_policy: RolloutPolicy::Random,
            seed: 0,
            verbosity: 0,
        }
    }
}

impl MctsConfig {
    pub fn validate(&self) -> Result<()> {
        validate_runtime(self.max_runtime)?;
        if self.max_rollouts == 0 {
            return Err(SchedulingError::invalid_config(
                "max_rollouts must be at least 1",
            ));
        }
        if !(self.c_explore.is_finite() && self.c_explore >= 0.0) {
            return Err(SchedulingError::invalid_config(format!(
                "c_explore must be finite and non-negative, got {}",
                self.c_explore
            )));
        }
        Ok(())
    }
}

/// Configuration for adjacent-swap refinement of a heuristic sequence.
#[derive(Clone, Debug)]
pub struct SwapConfig {
    /// Maximum full passes over the sequence.
    pub max_passes: usize,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self { max_passes: 100 }
    }
}

/// Scheduling strategy selected by the caller.
#[derive(Clone, Debug)]
pub enum Algorithm {
    BranchAndBound(BranchBoundConfig),
    Mcts(MctsConfig),
    /// Tasks by ascending release time, optionally refined by swaps.
    EarliestRelease { swap: Option<SwapConfig> },
    /// Tasks ordered by a priority key.
    PrioritySorter { key: PriorityKey, descending: bool },
    /// Uniformly random order.
    RandomSequencer { seed: u64 },
    /// Exhaustive enumeration of all orderings.
    BruteForce { max_tasks: usize },
}

impl Algorithm {
    /// Short name used in diagnostics and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BranchAndBound(_) => "branch_bound",
            Self::Mcts(_) => "mcts",
            Self::EarliestRelease { .. } => "earliest_release",
            Self::PrioritySorter { .. } => "priority_sorter",
            Self::RandomSequencer { .. } => "random_sequencer",
            Self::BruteForce { .. } => "brute_force",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::BranchAndBound(config) => config.validate(),
            Self::Mcts(config) => config.validate(),
            Self::BruteForce { max_tasks } if *max_tasks == 0 => Err(
                SchedulingError::invalid_config("max_tasks must be at least 1"),
            ),
            _ => Ok(()),
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::BranchAndBound(BranchBoundConfig::default())
    }
}

fn validate_runtime(max_runtime: Option<f64>) -> Result<()> {
    match max_runtime {
        Some(t) if t.is_nan() || t < 0.0 => Err(SchedulingError::invalid_config(format!(
            "max_runtime must be non-negative, got {}",
            t
        ))),
        _ => Ok(()),
    }
}
