//! Incremental list-scheduling evaluator.
//!
//! Same placement rule as [`ScheduleNode`](super::ScheduleNode), but channel
//! availabilities live in a [`ChannelTree`] so each extension costs O(log C),
//! and every extension can be undone. Search strategies use this node to walk
//! a tree depth-first on a single owned buffer.

use crate::error::{Result, SchedulingError};
use crate::models::{Schedule, Task};
use crate::validation::validate_problem;

use super::channels::ChannelTree;

/// Record needed to undo one placement.
#[derive(Clone, Copy, Debug)]
struct Placement {
    task: usize,
    channel: usize,
    prev_avail: f64,
    prev_loss: f64,
}

/// A (partial) task ordering evaluated incrementally.
#[derive(Clone, Debug)]
pub struct IncrementalNode<'a> {
    tasks: &'a [Task],
    placed: Vec<bool>,
    channels: ChannelTree,
    t_ex: Vec<f64>,
    ch_ex: Vec<usize>,
    loss: f64,
    history: Vec<Placement>,
}

impl<'a> IncrementalNode<'a> {
    /// Create the empty root node.
    pub fn new(tasks: &'a [Task], ch_avail: &[f64]) -> Result<Self> {
        validate_problem(tasks, ch_avail)?;
        Ok(Self {
            tasks,
            placed: vec![false; tasks.len()],
            channels: ChannelTree::new(ch_avail),
            t_ex: vec![f64::NAN; tasks.len()],
            ch_ex: vec![0; tasks.len()],
            loss: 0.0,
            history: Vec::with_capacity(tasks.len()),
        })
    }

    /// Create a node by replaying a (possibly partial) sequence.
    pub fn from_sequence(tasks: &'a [Task], ch_avail: &[f64], sequence: &[usize]) -> Result<Self> {
        let mut node = Self::new(tasks, ch_avail)?;
        for &n in sequence {
            node.push(n)?;
        }
        Ok(node)
    }

    /// Evaluate a full permutation of `0..N` into a schedule.
    pub fn evaluate(tasks: &'a [Task], ch_avail: &[f64], sequence: &[usize]) -> Result<Schedule> {
        if sequence.len() != tasks.len() {
            return Err(SchedulingError::invalid_input(format!(
                "sequence has {} entries, expected a permutation of {} tasks",
                sequence.len(),
                tasks.len()
            )));
        }
        Self::from_sequence(tasks, ch_avail, sequence)?.to_schedule()
    }

    /// Append one task to the sequence.
    pub fn push(&mut self, n: usize) -> Result<()> {
        match self.placed.get(n) {
            None => {
                return Err(SchedulingError::invalid_input(format!(
                    "task index {} out of range for {} tasks",
                    n,
                    self.tasks.len()
                )))
            }
            Some(true) => {
                return Err(SchedulingError::invalid_input(format!(
                    "task index {} is already in the sequence",
                    n
                )))
            }
            Some(false) => {}
        }

        let (ch, avail) = self
            .channels
            .min()
            .ok_or_else(|| SchedulingError::invalid_input("no channels available"))?;
        let task = &self.tasks[n];
        let start = task.start_time(avail);

        self.history.push(Placement {
            task: n,
            channel: ch,
            prev_avail: avail,
            prev_loss: self.loss,
        });
        self.channels.set(ch, start + task.duration());
        self.t_ex[n] = start;
        self.ch_ex[n] = ch;
        self.loss += task.loss_unchecked(start);
        self.placed[n] = true;
        Ok(())
    }

    /// Undo the most recent placement, returning the removed task index.
    pub fn pop(&mut self) -> Option<usize> {
        let last = self.history.pop()?;
        self.channels.set(last.channel, last.prev_avail);
        self.loss = last.prev_loss;
        self.t_ex[last.task] = f64::NAN;
        self.ch_ex[last.task] = 0;
        self.placed[last.task] = false;
        Some(last.task)
    }

    pub fn tasks(&self) -> &'a [Task] {
        self.tasks
    }

    /// Task indices in placement order.
    pub fn sequence(&self) -> Vec<usize> {
        self.history.iter().map(|p| p.task).collect()
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }

    pub fn loss(&self) -> f64 {
        self.loss
    }

    /// Channel availabilities in channel order.
    pub fn channels(&self) -> &[f64] {
        self.channels.as_slice()
    }

    /// Earliest time any channel becomes free.
    pub fn earliest_available(&self) -> f64 {
        self.channels.min().map(|(_, t)| t).unwrap_or(f64::INFINITY)
    }

    pub fn is_placed(&self, n: usize) -> bool {
        self.placed.get(n).copied().unwrap_or(false)
    }

    pub fn is_complete(&self) -> bool {
        self.history.len() == self.tasks.len()
    }

    /// Indices of tasks not yet in the sequence, ascending.
    pub fn unplaced(&self) -> impl Iterator<Item = usize> + '_ {
        self.placed
            .iter()
            .enumerate()
            .filter(|&(_, &p)| !p)
            .map(|(n, _)| n)
    }

    /// Placement flags per task index.
    pub fn placed_mask(&self) -> &[bool] {
        &self.placed
    }

    /// Schedule of a complete node.
    pub fn to_schedule(&self) -> Result<Schedule> {
        if !self.is_complete() {
            return Err(SchedulingError::invalid_input(format!(
                "sequence places {} of {} tasks",
                self.history.len(),
                self.tasks.len()
            )));
        }
        Ok(Schedule {
            t_ex: self.t_ex.clone(),
            ch_ex: self.ch_ex.clone(),
            loss: self.loss,
        })
    }
}
