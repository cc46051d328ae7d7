//! Python bindings (built with the `python` feature).

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::config::{
    Algorithm, BoundKind, BranchBoundConfig, MctsConfig, RolloutPolicy, SwapConfig, Traversal,
};
use crate::engine;
use crate::error::SchedulingError;
use crate::heuristics::PriorityKey;
use crate::models::Task;

impl From<SchedulingError> for PyErr {
    fn from(err: SchedulingError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// Task with a ReLU-drop loss (PyO3 wrapper).
#[pyclass(name = "Task")]
#[derive(Clone, Debug)]
pub struct PyTask {
    inner: Task,
}

#[pymethods]
impl PyTask {
    #[new]
    #[pyo3(signature = (duration, release_time, slope, drop_time=f64::INFINITY, drop_loss=f64::INFINITY))]
    fn new(duration: f64, release_time: f64, slope: f64, drop_time: f64, drop_loss: f64) -> PyResult<Self> {
        Ok(Self {
            inner: Task::with_drop(duration, release_time, slope, drop_time, drop_loss)?,
        })
    }

    #[getter]
    fn duration(&self) -> f64 {
        self.inner.duration()
    }

    #[getter]
    fn release_time(&self) -> f64 {
        self.inner.release_time()
    }

    #[getter]
    fn slope(&self) -> f64 {
        self.inner.slope()
    }

    #[getter]
    fn drop_time(&self) -> f64 {
        self.inner.drop_time()
    }

    #[getter]
    fn drop_loss(&self) -> f64 {
        self.inner.drop_loss()
    }

    /// Loss incurred if the task starts at `t`.
    fn loss(&self, t: f64) -> PyResult<f64> {
        Ok(self.inner.loss(t)?)
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(duration={}, release_time={}, slope={}, drop_time={}, drop_loss={})",
            self.inner.duration(),
            self.inner.release_time(),
            self.inner.slope(),
            self.inner.drop_time(),
            self.inner.drop_loss()
        )
    }
}

/// Run one scheduling strategy.
///
/// # Arguments
/// * `tasks` - Tasks to schedule
/// * `ch_avail` - Initial availability time of each channel
/// * `algorithm` - One of "branch_bound", "branch_bound_dfs",
///   "branch_bound_heuristic", "mcts", "earliest_release", "priority_sorter",
///   "random_sequencer", "brute_force"
/// * `priority_key` - Key for "priority_sorter" (release, drop_time,
///   drop_loss, slope, duration)
/// * `priority_values` - Precomputed priority per task for
///   "priority_sorter"; overrides `priority_key`
///
/// # Returns
/// * `(t_ex, ch_ex, diagnostics)` where diagnostics is a dict with runtime,
///   optimal flag and search counters
///
/// # Raises
/// * ValueError on invalid tasks, channels, or parameters
#[pyfunction]
#[pyo3(signature = (
    tasks,
    ch_avail,
    algorithm="branch_bound",
    max_runtime=None,
    max_nodes=None,
    max_rollouts=1000,
    c_explore=0.05,
    th_visit=5,
    rollout="random",
    priority_key="release",
    priority_values=None,
    descending=false,
    do_swap=false,
    seed=0,
    verbosity=0,
))]
#[allow(clippy::too_many_arguments)]
fn schedule<'py>(
    py: Python<'py>,
    tasks: Vec<PyTask>,
    ch_avail: Vec<f64>,
    algorithm: &str,
    max_runtime: Option<f64>,
    max_nodes: Option<u64>,
    max_rollouts: u64,
    c_explore: f64,
    th_visit: u64,
    rollout: &str,
    priority_key: &str,
    priority_values: Option<Vec<f64>>,
    descending: bool,
    do_swap: bool,
    seed: u64,
    verbosity: u8,
) -> PyResult<(Vec<f64>, Vec<usize>, Bound<'py, PyDict>)> {
    let branch_bound = |traversal, bound| {
        Algorithm::BranchAndBound(BranchBoundConfig {
            max_runtime,
            max_nodes,
            traversal,
            bound,
            verbosity,
            ..Default::default()
        })
    };
    let algorithm = match algorithm {
        "branch_bound" => branch_bound(Traversal::BestFirst, BoundKind::Admissible),
        "branch_bound_dfs" => branch_bound(Traversal::DepthFirst, BoundKind::Admissible),
        "branch_bound_heuristic" => branch_bound(Traversal::BestFirst, BoundKind::Heuristic),
        "mcts" => Algorithm::Mcts(MctsConfig {
            max_rollouts,
            max_runtime,
            c_explore,
            th_visit,
            rollout_policy: match rollout {
                "random" => RolloutPolicy::Random,
                "earliest_release" => RolloutPolicy::EarliestRelease,
                other => {
                    return Err(PyValueError::new_err(format!(
                        "unknown rollout policy: {}",
                        other
                    )))
                }
            },
            seed,
            verbosity,
        }),
        "earliest_release" => Algorithm::EarliestRelease {
            swap: do_swap.then(SwapConfig::default),
        },
        "priority_sorter" => Algorithm::PrioritySorter {
            key: match priority_values {
                Some(values) => PriorityKey::Values(values),
                None => priority_key.parse::<PriorityKey>()?,
            },
            descending,
        },
        "random_sequencer" => Algorithm::RandomSequencer { seed },
        "brute_force" => Algorithm::BruteForce { max_tasks: 10 },
        other => return Err(PyValueError::new_err(format!("unknown algorithm: {}", other))),
    };

    let tasks: Vec<Task> = tasks.into_iter().map(|t| t.inner).collect();
    let result = py.allow_threads(|| engine::schedule(&tasks, &ch_avail, &algorithm))?;

    let diagnostics = PyDict::new_bound(py);
    let d = &result.diagnostics;
    diagnostics.set_item("runtime", d.runtime_secs)?;
    diagnostics.set_item("optimal", d.optimal)?;
    diagnostics.set_item("loss", result.schedule.loss)?;
    diagnostics.set_item("nodes_expanded", d.nodes_expanded)?;
    diagnostics.set_item("nodes_pruned", d.nodes_pruned)?;
    diagnostics.set_item("evaluations", d.evaluations)?;
    diagnostics.set_item("incumbent_updates", d.incumbent_updates)?;

    Ok((result.schedule.t_ex, result.schedule.ch_ex, diagnostics))
}

/// Total loss of tasks started at `t_ex`.
#[pyfunction]
fn evaluate_schedule(tasks: Vec<PyTask>, t_ex: Vec<f64>) -> PyResult<f64> {
    let tasks: Vec<Task> = tasks.into_iter().map(|t| t.inner).collect();
    Ok(crate::validation::evaluate_schedule(&tasks, &t_ex)?)
}

/// The task_scheduling.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTask>()?;
    m.add_function(wrap_pyfunction!(schedule, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_schedule, m)?)?;
    Ok(())
}
