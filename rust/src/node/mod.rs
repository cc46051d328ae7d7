//! Search-tree nodes: task orderings evaluated by list scheduling.
//!
//! Two evaluators with identical semantics:
//! - [`ScheduleNode`]: flat channel vector, O(C) per placement. Used for full
//!   evaluations (heuristics, rollouts, brute force).
//! - [`IncrementalNode`]: tournament tree over channels, O(log C) per
//!   placement with undo. Used where many sibling extensions are explored.

mod channels;
mod incremental;
mod list;

pub use channels::ChannelTree;
pub use incremental::IncrementalNode;
pub use list::ScheduleNode;
