//! List-scheduling evaluator.
//!
//! Tasks are placed one at a time in the order given. Each task goes to the
//! channel that frees up first (lowest index on ties) and starts at
//! `max(channel availability, release time)`.

use crate::error::{Result, SchedulingError};
use crate::models::{Schedule, Task};
use crate::validation::validate_problem;

/// A (partial) task ordering and the schedule it induces.
///
/// The node is a cache of replaying `sequence` from the initial channel
/// availabilities: channel state, start times and loss are all derived.
#[derive(Clone, Debug)]
pub struct ScheduleNode<'a> {
    tasks: &'a [Task],
    sequence: Vec<usize>,
    placed: Vec<bool>,
    channels: Vec<f64>,
    t_ex: Vec<f64>,
    ch_ex: Vec<usize>,
    loss: f64,
}

impl<'a> ScheduleNode<'a> {
    /// Create the empty root node.
    pub fn new(tasks: &'a [Task], ch_avail: &[f64]) -> Result<Self> {
        validate_problem(tasks, ch_avail)?;
        Ok(Self {
            tasks,
            sequence: Vec::with_capacity(tasks.len()),
            placed: vec![false; tasks.len()],
            channels: ch_avail.to_vec(),
            t_ex: vec![f64::NAN; tasks.len()],
            ch_ex: vec![0; tasks.len()],
            loss: 0.0,
        })
    }

    /// Create a node by replaying a (possibly partial) sequence.
    pub fn from_sequence(tasks: &'a [Task], ch_avail: &[f64], sequence: &[usize]) -> Result<Self> {
        let mut node = Self::new(tasks, ch_avail)?;
        node.extend(sequence)?;
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
        Self::from_sequence(tasks, ch_avail, sequence)?.into_schedule()
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

        let task = &self.tasks[n];
        let ch = self.earliest_channel();
        let start = task.start_time(self.channels[ch]);

        self.channels[ch] = start + task.duration();
        self.t_ex[n] = start;
        self.ch_ex[n] = ch;
        self.loss += task.loss_unchecked(start);
        self.placed[n] = true;
        self.sequence.push(n);
        Ok(())
    }

    /// Append several tasks in order.
    pub fn extend(&mut self, sequence: &[usize]) -> Result<()> {
        for &n in sequence {
            self.push(n)?;
        }
        Ok(())
    }

    /// Copy of this node with one more task appended.
    pub fn child(&self, n: usize) -> Result<Self> {
        let mut node = self.clone();
        node.push(n)?;
        Ok(node)
    }

    /// Channel that frees up first; linear scan, lowest index on ties.
    fn earliest_channel(&self) -> usize {
        let mut best = 0;
        for (ch, &avail) in self.channels.iter().enumerate().skip(1) {
            if avail < self.channels[best] {
                best = ch;
            }
        }
        best
    }

    pub fn tasks(&self) -> &'a [Task] {
        self.tasks
    }

    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    pub fn depth(&self) -> usize {
        self.sequence.len()
    }

    pub fn loss(&self) -> f64 {
        self.loss
    }

    pub fn channels(&self) -> &[f64] {
        &self.channels
    }

    pub fn is_placed(&self, n: usize) -> bool {
        self.placed.get(n).copied().unwrap_or(false)
    }

    pub fn is_complete(&self) -> bool {
        self.sequence.len() == self.tasks.len()
    }

    /// Indices of tasks not yet in the sequence, ascending.
    pub fn unplaced(&self) -> impl Iterator<Item = usize> + '_ {
        self.placed
            .iter()
            .enumerate()
            .filter(|&(_, &p)| !p)
            .map(|(n, _)| n)
    }

    /// Start times so far (NaN for unplaced tasks).
    pub fn t_ex(&self) -> &[f64] {
        &self.t_ex
    }

    pub fn ch_ex(&self) -> &[usize] {
        &self.ch_ex
    }

    /// Convert a complete node into its schedule.
    pub fn into_schedule(self) -> Result<Schedule> {
        if !self.is_complete() {
            return Err(SchedulingError::invalid_input(format!(
                "sequence places {} of {} tasks",
                self.sequence.len(),
                self.tasks.len()
            )));
        }
        Ok(Schedule {
            t_ex: self.t_ex,
            ch_ex: self.ch_ex,
            loss: self.loss,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::check_schedule;

    fn scenario_tasks() -> Vec<Task> {
        vec![
            Task::new(1.0, 0.0, 1.0).unwrap(),
            Task::new(2.0, 0.0, 1.0).unwrap(),
            Task::with_drop(1.0, 3.0, 2.0, 3.0, 10.0).unwrap(),
        ]
    }

    #[test]
    fn test_evaluate_scenario() {
        let tasks = scenario_tasks();
        let schedule = ScheduleNode::evaluate(&tasks, &[0.0], &[0, 1, 2]).unwrap();
        assert_eq!(schedule.t_ex, vec![0.0, 1.0, 3.0]);
        assert_eq!(schedule.ch_ex, vec![0, 0, 0]);
        assert!((schedule.loss - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_schedule_aligned_to_task_index() {
        let tasks = scenario_tasks();
        let schedule = ScheduleNode::evaluate(&tasks, &[0.0], &[1, 0, 2]).unwrap();
        // B runs first, then A, then C
        assert_eq!(schedule.t_ex, vec![2.0, 0.0, 3.0]);
        assert!((schedule.loss - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_multi_channel_assignment() {
        let tasks = vec![
            Task::new(2.0, 0.0, 1.0).unwrap(),
            Task::new(2.0, 0.0, 1.0).unwrap(),
            Task::new(1.0, 0.0, 1.0).unwrap(),
        ];
        let schedule = ScheduleNode::evaluate(&tasks, &[1.0, 0.0], &[0, 1, 2]).unwrap();
        assert_eq!(schedule.ch_ex, vec![1, 0, 1]);
        assert_eq!(schedule.t_ex, vec![0.0, 1.0, 2.0]);
        assert!(check_schedule(&tasks, &[1.0, 0.0], &schedule).is_ok());
    }

    #[test]
    fn test_partial_evaluation() {
        let tasks = scenario_tasks();
        let node = ScheduleNode::from_sequence(&tasks, &[0.0], &[2]).unwrap();
        assert_eq!(node.depth(), 1);
        assert_eq!(node.channels(), &[4.0]);
        assert_eq!(node.unplaced().collect::<Vec<_>>(), vec![0, 1]);
        assert!(!node.is_complete());
        assert!(node.clone().into_schedule().is_err());
    }

    #[test]
    fn test_loss_is_monotone_in_sequence() {
        let tasks = scenario_tasks();
        let mut node = ScheduleNode::new(&tasks, &[0.0]).unwrap();
        let mut previous = node.loss();
        for n in [1, 2, 0] {
            node.push(n).unwrap();
            assert!(node.loss() >= previous);
            previous = node.loss();
        }
    }

    #[test]
    fn test_rejects_malformed_sequences() {
        let tasks = scenario_tasks();
        assert!(ScheduleNode::evaluate(&tasks, &[0.0], &[0, 0, 1]).is_err());
        assert!(ScheduleNode::evaluate(&tasks, &[0.0], &[0, 1]).is_err());
        assert!(ScheduleNode::evaluate(&tasks, &[0.0], &[0, 1, 3]).is_err());
        assert!(ScheduleNode::new(&tasks, &[]).is_err());
        assert!(ScheduleNode::new(&[], &[0.0]).is_err());
    }

    #[test]
    fn test_child_leaves_parent_untouched() {
        let tasks = scenario_tasks();
        let root = ScheduleNode::new(&tasks, &[0.0]).unwrap();
        let child = root.child(1).unwrap();
        assert_eq!(root.depth(), 0);
        assert_eq!(child.sequence(), &[1]);
        assert_eq!(root.channels(), &[0.0]);
    }
}
