//! Input validation and schedule feasibility checks.
//!
//! `validate_problem` runs before any evaluation. `check_schedule` and
//! `evaluate_schedule` accept arbitrary `(t_ex, ch_ex)` pairs, e.g. from an
//! external policy, and verify or score them.

use crate::error::{Result, SchedulingError};
use crate::models::{Schedule, Task};

/// Tolerance for overlap checks on floating-point start times.
const OVERLAP_EPS: f64 = 1e-9;

/// Validate a task list and channel availability vector.
///
/// Checks:
/// 1. At least one task
/// 2. At least one channel
/// 3. All channel availabilities are finite
pub fn validate_problem(tasks: &[Task], ch_avail: &[f64]) -> Result<()> {
    if tasks.is_empty() {
        return Err(SchedulingError::invalid_input("task list is empty"));
    }
    if ch_avail.is_empty() {
        return Err(SchedulingError::invalid_input(
            "channel availability vector is empty",
        ));
    }
    if let Some((ch, t)) = ch_avail.iter().enumerate().find(|(_, t)| !t.is_finite()) {
        return Err(SchedulingError::invalid_input(format!(
            "channel {} availability must be finite, got {}",
            ch, t
        )));
    }
    Ok(())
}

/// Total loss of tasks started at `t_ex`.
///
/// Fails with `SchedulingError::Domain` if any task starts before release.
pub fn evaluate_schedule(tasks: &[Task], t_ex: &[f64]) -> Result<f64> {
    if t_ex.len() != tasks.len() {
        return Err(SchedulingError::invalid_input(format!(
            "{} start times for {} tasks",
            t_ex.len(),
            tasks.len()
        )));
    }
    tasks
        .iter()
        .zip(t_ex)
        .try_fold(0.0, |total, (task, &t)| Ok(total + task.loss(t)?))
}

/// Verify that a schedule is feasible.
///
/// Checks:
/// 1. Array lengths match the task count
/// 2. Every channel index is in range
/// 3. No task starts before its release time
/// 4. No task starts before its channel's initial availability
/// 5. Tasks sharing a channel do not overlap
pub fn check_schedule(tasks: &[Task], ch_avail: &[f64], schedule: &Schedule) -> Result<()> {
    validate_problem(tasks, ch_avail)?;
    if schedule.t_ex.len() != tasks.len() || schedule.ch_ex.len() != tasks.len() {
        return Err(SchedulingError::invalid_input(format!(
            "schedule has {}/{} entries for {} tasks",
            schedule.t_ex.len(),
            schedule.ch_ex.len(),
            tasks.len()
        )));
    }

    let mut by_channel: Vec<Vec<usize>> = vec![Vec::new(); ch_avail.len()];
    for (n, task) in tasks.iter().enumerate() {
        let (t, ch) = (schedule.t_ex[n], schedule.ch_ex[n]);
        if ch >= ch_avail.len() {
            return Err(SchedulingError::invalid_input(format!(
                "task {} assigned to channel {} of {}",
                n,
                ch,
                ch_avail.len()
            )));
        }
        if !(t >= task.release_time()) {
            return Err(SchedulingError::invalid_input(format!(
                "task {} starts at {} before release time {}",
                n,
                t,
                task.release_time()
            )));
        }
        if t < ch_avail[ch] - OVERLAP_EPS {
            return Err(SchedulingError::invalid_input(format!(
                "task {} starts at {} before channel {} is available at {}",
                n, t, ch, ch_avail[ch]
            )));
        }
        by_channel[ch].push(n);
    }

    for (ch, members) in by_channel.iter_mut().enumerate() {
        members.sort_by(|&a, &b| schedule.t_ex[a].total_cmp(&schedule.t_ex[b]));
        for pair in members.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let end_a = schedule.t_ex[a] + tasks[a].duration();
            if schedule.t_ex[b] < end_a - OVERLAP_EPS {
                return Err(SchedulingError::invalid_input(format!(
                    "tasks {} and {} overlap on channel {}",
                    a, b, ch
                )));
            }
        }
    }

    Ok(())
}
