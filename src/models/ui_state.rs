use super::strategy::Strategy;
use super::task_run::{RunId, RunStatus, TaskRun};
use std::collections::BTreeMap;

/// Output label text before any fetch has completed.
pub const INITIAL_OUTPUT: &str = "Not fetched yet!";

/// Output label text while a sync, async or thread fetch is underway.
pub const FETCHING_TEXT: &str = "Fetching Name";

/// Output label text while a long-run dispatcher fetch is underway.
pub const FETCHING_LONG_RUN_TEXT: &str = "Fetching Name Long Running";

/// Output label text while a spawned (cooperative async) fetch is underway.
pub const FETCHING_SPAWNED_TEXT: &str = "Fetching Name Spawned";

/// Everything the window displays.
///
/// Owned by [`crate::state::StateManager`] for the lifetime of the window.
/// Only the event-loop thread mutates it; background strategies post
/// [`crate::events::AppEvent`]s instead.
#[derive(Clone, Debug, PartialEq)]
pub struct UiState {
    /// Text of the output label
    pub output_text: String,

    /// Progress bar value, always within `0..=100`
    pub progress_value: u8,

    /// Every run started since the window opened, keyed by id
    pub runs: BTreeMap<RunId, TaskRun>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            output_text: INITIAL_OUTPUT.to_string(),
            progress_value: 0,
            runs: BTreeMap::new(),
        }
    }
}

impl UiState {
    /// Register a new run in the `Running` state and reset the progress bar.
    pub fn begin_run(&mut self, id: RunId, strategy: Strategy) {
        self.progress_value = 0;
        self.runs.insert(id, TaskRun::new(id, strategy));
    }

    /// Set the progress value, clamped to 100.
    pub fn set_progress(&mut self, value: u8) {
        self.progress_value = value.min(100);
    }

    /// Move a run to a terminal status.
    ///
    /// Returns `false` when the id is unknown or the run already finished.
    pub fn finish_run(&mut self, id: RunId, status: RunStatus) -> bool {
        match self.runs.get_mut(&id) {
            Some(run) if run.status == RunStatus::Running => {
                run.status = status;
                true
            }
            _ => false,
        }
    }

    /// Number of runs still in progress.
    pub fn active_runs(&self) -> usize {
        self.runs.values().filter(|r| r.status == RunStatus::Running).count()
    }

    /// Number of runs that finished with a result.
    pub fn completed_runs(&self) -> usize {
        self.runs.values().filter(|r| r.status == RunStatus::Done).count()
    }
}
