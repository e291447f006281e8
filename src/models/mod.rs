//! Data models for the fetch demo.
//!
//! - [`UiState`]: the output text / progress value pair shown by the window
//! - [`TaskRun`]: bookkeeping for one execution of the simulated fetch
//! - [`Strategy`]: the execution mechanisms a submit button can select
//! - [`DemoConfig`]: settings loaded from `FetchDemo.yaml` and the environment
//!
//! `UiState` is wrapped by [`StateManager`](crate::state::StateManager); all
//! mutations go through it so that change events are emitted consistently.

pub mod config;
pub mod strategy;
pub mod task_run;
pub mod ui_state;

pub use config::{
    ConfigError, DemoConfig, LoggingSettings, TaskSettings, ThreadSettings, WindowSettings,
};
pub use strategy::Strategy;
pub use task_run::{RunId, RunStatus, TaskRun};
pub use ui_state::{FETCHING_LONG_RUN_TEXT, FETCHING_SPAWNED_TEXT, FETCHING_TEXT, INITIAL_OUTPUT, UiState};
