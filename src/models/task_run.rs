use super::strategy::Strategy;
use std::fmt;

/// Identifier handed out to each fetch run, unique per window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Lifecycle of a single run: `Running` until a completion or failure arrives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Done,
    Failed(String),
}

/// One execution of the simulated fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskRun {
    pub id: RunId,
    pub strategy: Strategy,
    pub status: RunStatus,
}

impl TaskRun {
    pub fn new(id: RunId, strategy: Strategy) -> Self {
        Self {
            id,
            strategy,
            status: RunStatus::Running,
        }
    }
}
