//! Search strategies over task orderings.
//!
//! - [`branch_bound`]: exact search with bounding and dominance pruning
//! - [`mcts`]: anytime randomized tree search
//! - [`brute_force`]: full enumeration for small problems

mod branch_bound;
mod brute_force;
mod budget;
mod mcts;

pub use branch_bound::{admissible_bound, branch_bound};
pub use brute_force::brute_force;
pub use budget::Budget;
pub use mcts::mcts;
