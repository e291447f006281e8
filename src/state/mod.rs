// State management module
//
// This module provides the StateManager which wraps UiState with thread-safe access
// using Arc<RwLock<T>> and emits change events for GUI updates.

use crate::models::{RunId, RunStatus, Strategy, UiState};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Change events emitted when state is modified
///
/// These events are emitted to notify interested parties (primarily the GUI)
/// about state changes without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The output label text changed
    OutputChanged { text: String },

    /// The progress bar value changed
    ProgressUpdated { value: u8 },

    /// A run entered the `Running` state
    RunStarted { run: RunId, strategy: Strategy },

    /// A run reached `Done` or `Failed`
    RunFinished {
        run: RunId,
        strategy: Strategy,
        status: RunStatus,
    },

    /// The number of in-flight runs changed
    ActiveRunsChanged { active: usize },
}

/// Thread-safe state manager with event emission
///
/// - Provides access to [`UiState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// The event loop is the only writer. Readers (the GUI subscription thread,
/// tests) may sit on any thread.
pub struct StateManager {
    /// The window state protected by RwLock for thread-safe access
    state: Arc<RwLock<UiState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// The broadcast channel buffers 100 events, enough for several complete
    /// runs worth of progress.
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(UiState::default())),
            state_tx,
        }
    }

    // A panicking writer leaves UiState whole (every mutation is a plain field
    // assignment), so a poisoned lock is still safe to use.
    fn read_guard(&self) -> RwLockReadGuard<'_, UiState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, UiState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get a clone of the current state
    pub fn snapshot(&self) -> UiState {
        self.read_guard().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let text = state_manager.read(|state| state.output_text.clone());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&UiState) -> R,
    {
        let state = self.read_guard();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Emits appropriate events
    ///
    /// # Returns
    /// The StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut UiState),
    {
        let mut state = self.write_guard();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);

        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &UiState, new: &UiState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        for (id, run) in &new.runs {
            match old.runs.get(id) {
                None => changes.push(StateChange::RunStarted {
                    run: *id,
                    strategy: run.strategy,
                }),
                Some(previous) if previous.status != run.status => {
                    changes.push(StateChange::RunFinished {
                        run: *id,
                        strategy: run.strategy,
                        status: run.status.clone(),
                    })
                }
                Some(_) => {}
            }
        }

        if old.active_runs() != new.active_runs() {
            changes.push(StateChange::ActiveRunsChanged {
                active: new.active_runs(),
            });
        }

        if old.progress_value != new.progress_value {
            changes.push(StateChange::ProgressUpdated {
                value: new.progress_value,
            });
        }

        if old.output_text != new.output_text {
            changes.push(StateChange::OutputChanged {
                text: new.output_text.clone(),
            });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Replace the output label text
    pub fn set_output(&self, text: impl Into<String>) -> Vec<StateChange> {
        let text = text.into();
        self.update(|state| {
            state.output_text = text;
        })
    }

    /// Set the progress bar value
    pub fn set_progress(&self, value: u8) -> Vec<StateChange> {
        self.update(|state| {
            state.set_progress(value);
        })
    }

    /// Register a run and show the text announcing it
    pub fn begin_run(&self, run: RunId, strategy: Strategy, output: &str) -> Vec<StateChange> {
        self.update(|state| {
            state.begin_run(run, strategy);
            state.output_text = output.to_string();
        })
    }

    /// Mark a run done and show its result
    ///
    /// The output is written even for a run this manager has never seen, so a
    /// completion always reaches the label (last writer wins).
    pub fn complete_run(&self, run: RunId, result: &str) -> Vec<StateChange> {
        self.update(|state| {
            if !state.finish_run(run, RunStatus::Done) {
                tracing::debug!("Completion for {} did not match a running fetch", run);
            }
            state.output_text = result.to_string();
        })
    }

    /// Mark a run failed and surface the reason in the output label
    pub fn fail_run(&self, run: RunId, reason: &str) -> Vec<StateChange> {
        self.update(|state| {
            state.finish_run(run, RunStatus::Failed(reason.to_string()));
            state.output_text = format!("Fetch failed: {}", reason);
        })
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}
