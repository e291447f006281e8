// Blocking read-dispatch loop over the App's event queue

use crate::app::App;
use crate::events::{AppEvent, EventReceiver, LoopControl};

/// Waits for events with no timeout and hands each one to a handler until the
/// handler asks to stop or every sender is gone.
///
/// Must run on a plain thread, outside any tokio runtime context.
pub struct EventLoop {
    events: EventReceiver,
}

impl EventLoop {
    pub fn new(events: EventReceiver) -> Self {
        Self { events }
    }

    /// Dispatch every event to `app` on the calling thread.
    pub fn run(self, app: &App) {
        self.run_with(|event| app.dispatch(event));
    }

    /// Feed every event to `handle` on the calling thread.
    ///
    /// The queue is closed on return, so background work still running
    /// notices that nobody is listening and its posts are dropped. The
    /// window's event pump returns on the close event the controller posts
    /// once the Slint loop has stopped.
    pub fn run_with<F>(mut self, mut handle: F)
    where
        F: FnMut(AppEvent) -> LoopControl,
    {
        tracing::info!("Event loop started");

        while let Some(event) = self.events.blocking_recv() {
            tracing::trace!("Event received: {:?}", event);
            if handle(event) == LoopControl::Exit {
                break;
            }
        }

        self.events.close();
        tracing::info!("Event loop finished");
    }
}
