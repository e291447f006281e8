use crate::events::EventKey;
use std::fmt;

/// Execution mechanism wrapping the simulated fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Direct call on the event-loop thread
    Sync,
    /// Coroutine driven to completion by a temporary runtime inside the handler
    Async,
    /// Dedicated OS thread per click
    Thread,
    /// Handed to the long-operation dispatcher
    LongRun,
    /// Coroutine spawned on the shared runtime
    Spawned,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Sync,
        Strategy::Async,
        Strategy::Thread,
        Strategy::LongRun,
        Strategy::Spawned,
    ];

    /// Event key emitted by the submit button for this strategy.
    pub fn submit_key(self) -> EventKey {
        match self {
            Strategy::Sync => EventKey::SUBMIT_SYNC,
            Strategy::Async => EventKey::SUBMIT_ASYNC,
            Strategy::Thread => EventKey::SUBMIT_THREAD,
            Strategy::LongRun => EventKey::SUBMIT_LONG_RUN,
            Strategy::Spawned => EventKey::SUBMIT_SPAWN,
        }
    }

    /// Completion key posted back to the event loop by background strategies.
    ///
    /// `None` for strategies that finish inside their handler.
    pub fn completion_key(self) -> Option<EventKey> {
        match self {
            Strategy::Sync | Strategy::Async => None,
            Strategy::Thread => Some(EventKey::DONE_THREAD),
            Strategy::LongRun => Some(EventKey::DONE_LONG_RUN),
            Strategy::Spawned => Some(EventKey::DONE_SPAWN),
        }
    }

    /// Whether the handler returns before the fetch finishes.
    pub fn is_background(self) -> bool {
        self.completion_key().is_some()
    }

    pub fn from_submit_key(key: &str) -> Option<Strategy> {
        Self::ALL.into_iter().find(|s| s.submit_key().as_str() == key)
    }

    pub fn from_completion_key(key: EventKey) -> Option<Strategy> {
        Self::ALL
            .into_iter()
            .find(|s| s.completion_key() == Some(key))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Sync => "sync",
            Strategy::Async => "async",
            Strategy::Thread => "thread",
            Strategy::LongRun => "long-run",
            Strategy::Spawned => "spawned",
        };
        f.write_str(name)
    }
}
