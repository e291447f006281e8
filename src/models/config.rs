use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Settings loaded from `FetchDemo.yaml`, overridable through `FETCHDEMO__*`
/// environment variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub task: TaskSettings,
    pub threads: ThreadSettings,
    pub logging: LoggingSettings,
    pub window: WindowSettings,
}

/// Shape of the simulated fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSettings {
    /// Number of pause-then-report iterations
    pub steps: u32,

    /// Pause before each progress report, in milliseconds
    pub step_interval_ms: u64,

    /// Value every strategy eventually delivers
    pub result: String,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            steps: 20,
            step_interval_ms: 500,
            result: "David Barnes".to_string(),
        }
    }
}

impl TaskSettings {
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadSettings {
    /// Upper bound on concurrently running thread-strategy fetches
    pub max_thread_fetches: usize,

    /// Worker threads of the shared tokio runtime
    pub runtime_workers: usize,
}

impl Default for ThreadSettings {
    fn default() -> Self {
        Self {
            max_thread_fetches: 8,
            runtime_workers: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub log_dir: String,
    pub log_prefix: String,
    pub debug_mode: bool,
    pub console_output: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            log_prefix: "fetchdemo".to_string(),
            debug_mode: false,
            console_output: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Async Await Window".to_string(),
        }
    }
}

/// Rejected configuration values
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("task.steps must be between 1 and 100, got {0}")]
    InvalidStepCount(u32),

    #[error("threads.max_thread_fetches must be at least 1")]
    ZeroThreadLimit,

    #[error("threads.runtime_workers must be at least 1")]
    ZeroRuntimeWorkers,
}

impl DemoConfig {
    /// Check values the rest of the crate relies on.
    ///
    /// A step count above 100 would make progress values repeat, which breaks
    /// the strictly increasing progress sequence.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.task.steps) {
            return Err(ConfigError::InvalidStepCount(self.task.steps));
        }
        if self.threads.max_thread_fetches == 0 {
            return Err(ConfigError::ZeroThreadLimit);
        }
        if self.threads.runtime_workers == 0 {
            return Err(ConfigError::ZeroRuntimeWorkers);
        }
        Ok(())
    }
}
