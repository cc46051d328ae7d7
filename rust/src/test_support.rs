//! Random problem generation for tests.

use rand::Rng;

use crate::models::Task;

/// Random problem with ReLU-drop tasks.
///
/// Parameter ranges: duration 0.03-0.06, release -4..4, slope 0.5-2,
/// drop time 6-12, drop loss 35-50, channel availability -1..1.
pub fn random_problem<R: Rng>(rng: &mut R, n_tasks: usize, n_ch: usize) -> (Vec<Task>, Vec<f64>) {
    let tasks = (0..n_tasks)
        .map(|_| {
            Task::with_drop(
                rng.gen_range(0.03..0.06),
                rng.gen_range(-4.0..4.0),
                rng.gen_range(0.5..2.0),
                rng.gen_range(6.0..12.0),
                rng.gen_range(35.0..50.0),
            )
            .expect("generated parameters are valid")
        })
        .collect();
    let ch_avail = (0..n_ch).map(|_| rng.gen_range(-1.0..1.0)).collect();
    (tasks, ch_avail)
}

/// Random problem with tasks long enough that channel contention matters.
pub fn contended_problem<R: Rng>(
    rng: &mut R,
    n_tasks: usize,
    n_ch: usize,
) -> (Vec<Task>, Vec<f64>) {
    let tasks = (0..n_tasks)
        .map(|_| {
            let release = rng.gen_range(0.0..4.0);
            let slope = rng.gen_range(0.5..2.0);
            let drop_time = release + rng.gen_range(2.0..6.0);
            let drop_loss = slope * (drop_time - release) + rng.gen_range(1.0..10.0);
            Task::with_drop(rng.gen_range(0.5..2.0), release, slope, drop_time, drop_loss)
                .expect("generated parameters are valid")
        })
        .collect();
    let ch_avail = (0..n_ch).map(|_| rng.gen_range(0.0..1.0)).collect();
    (tasks, ch_avail)
}
