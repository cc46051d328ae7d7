//! Task scheduling search engine.
//!
//! Schedules tasks onto parallel channels to minimize total loss, where each
//! task has a release time and a loss that grows linearly with delay until it
//! saturates at a drop penalty. A task ordering is turned into start times by
//! list scheduling: each task goes to the earliest-available channel and
//! starts at the later of that availability and its release time.
//!
//! Strategies (see [`Algorithm`]):
//! - branch-and-bound with admissible or heuristic bounding
//! - Monte Carlo Tree Search with a rollout and wall-clock budget
//! - single-pass heuristics (earliest release, priority sort, random)
//! - brute force for small problems
//!
//! All strategies are reached through [`schedule`].

pub mod config;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod logging;
pub mod models;
pub mod node;
pub mod search;
pub mod validation;

#[cfg(feature = "python")]
mod bindings;

#[cfg(test)]
mod test_support;

pub use config::{
    Algorithm, BoundKind, BranchBoundConfig, MctsConfig, RolloutPolicy, SwapConfig, Traversal,
};
pub use engine::schedule;
pub use error::{Result, SchedulingError};
pub use heuristics::PriorityKey;
pub use models::{Diagnostics, Schedule, SearchResult, Task};
pub use node::{IncrementalNode, ScheduleNode};
pub use validation::{check_schedule, evaluate_schedule};
