// Event queue shared by the window and the background strategies
//
// Every input to the event loop is an AppEvent: button clicks and close
// requests from the window, plus progress, completion and failure messages
// posted by background work. Background work never touches UiState directly.

use crate::models::{RunId, Strategy};
use std::fmt;
use tokio::sync::mpsc;

/// Stable string identity of an event, as used by the dispatch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventKey(&'static str);

impl EventKey {
    pub const WINDOW_CLOSED: EventKey = EventKey("-window-closed-");
    pub const EXIT: EventKey = EventKey("Exit");

    pub const SUBMIT_SYNC: EventKey = EventKey("-submit-sync-");
    pub const SUBMIT_ASYNC: EventKey = EventKey("-submit-async-");
    pub const SUBMIT_THREAD: EventKey = EventKey("-submit-thread-");
    pub const SUBMIT_LONG_RUN: EventKey = EventKey("-submit-long-run-");
    pub const SUBMIT_SPAWN: EventKey = EventKey("-submit-spawn-");

    pub const DONE_THREAD: EventKey = EventKey("-done-thread-");
    pub const DONE_LONG_RUN: EventKey = EventKey("-done-long-run-");
    pub const DONE_SPAWN: EventKey = EventKey("-done-spawn-");

    pub const PROGRESS: EventKey = EventKey("-progress-");

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Input to the event loop
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEvent {
    /// The window manager asked to close the window
    WindowClosed,

    /// The Exit button was clicked
    Exit,

    /// A submit button was clicked
    Submit(Strategy),

    /// A background run finished one step
    Progress { run: RunId, value: u8 },

    /// A background run produced its result, tagged with its completion key
    Completed {
        run: RunId,
        key: EventKey,
        result: String,
    },

    /// A background run died before producing a result
    Failed {
        run: RunId,
        key: EventKey,
        reason: String,
    },

    /// Anything the dispatch table has no entry for
    Unrecognized(String),
}

impl AppEvent {
    /// Map a raw widget key to an event.
    pub fn from_key(key: &str) -> Self {
        if key == EventKey::WINDOW_CLOSED.as_str() {
            AppEvent::WindowClosed
        } else if key == EventKey::EXIT.as_str() {
            AppEvent::Exit
        } else if let Some(strategy) = Strategy::from_submit_key(key) {
            AppEvent::Submit(strategy)
        } else {
            AppEvent::Unrecognized(key.to_string())
        }
    }

    /// Key this event is dispatched under, `None` for unrecognized input.
    pub fn key(&self) -> Option<EventKey> {
        match self {
            AppEvent::WindowClosed => Some(EventKey::WINDOW_CLOSED),
            AppEvent::Exit => Some(EventKey::EXIT),
            AppEvent::Submit(strategy) => Some(strategy.submit_key()),
            AppEvent::Progress { .. } => Some(EventKey::PROGRESS),
            AppEvent::Completed { key, .. } | AppEvent::Failed { key, .. } => Some(*key),
            AppEvent::Unrecognized(_) => None,
        }
    }
}

/// What the event loop should do after dispatching an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub type EventReceiver = mpsc::UnboundedReceiver<AppEvent>;

/// Cloneable, `Send` handle for posting events into the loop's queue.
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventSender {
    /// Post an event. Returns `false` if the event loop has already shut down.
    pub fn post(&self, event: AppEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                tracing::debug!("Event loop closed, dropping {:?}", event);
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create the queue feeding an event loop.
pub fn event_queue() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}
