// EventLoopBridge - Coordinates between background threads and the Slint event loop
//
// Slint widgets may only be touched on the thread running slint's event loop.
// The bridge owns two helper threads:
// 1. A UI update handler that marshals widget setters into the Slint loop
// 2. An event pump that reads the App's event queue and dispatches each event
//    on the Slint thread, so background progress reaches UiState there

use crate::app::App;
use crate::events::{AppEvent, EventReceiver, LoopControl};
use crate::ui::event_loop::EventLoop;
use anyhow::{Context, Result};
use slint::{ComponentHandle, EventLoopError, Weak};
use std::sync::Arc;
use tokio::sync::mpsc;

type UiUpdate<T> = Box<dyn FnOnce(&T) + Send>;

/// Marshals work from any thread onto the Slint event loop
///
/// # Example
/// ```ignore
/// let ui = MainWindow::new()?;
/// let bridge = EventLoopBridge::new(&ui);
/// let handle = bridge.clone_handle();
///
/// std::thread::spawn(move || {
///     handle.update_ui(|ui| ui.set_output_text("Fetching Name".into()));
/// });
/// ```
pub struct EventLoopBridge<T: ComponentHandle> {
    /// Weak reference to the UI component to prevent circular references
    ui_weak: Weak<T>,

    /// Channel for sending UI update requests to the handler thread
    /// Bounded to 100 updates to prevent unbounded memory growth if UI lags
    ui_update_tx: mpsc::Sender<UiUpdate<T>>,
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    /// Create a new EventLoopBridge
    ///
    /// This sets up a background handler thread that processes UI update requests
    /// and marshals them to the Slint event loop using `upgrade_in_event_loop`.
    pub fn new(ui: &T) -> Self {
        let ui_weak = ui.as_weak();
        let (ui_update_tx, mut ui_update_rx) = mpsc::channel::<UiUpdate<T>>(100);

        let ui_weak_clone = ui_weak.clone();
        std::thread::spawn(move || {
            tracing::debug!("EventLoopBridge handler thread started");

            while let Some(update_fn) = ui_update_rx.blocking_recv() {
                let result = ui_weak_clone.upgrade_in_event_loop(move |ui| {
                    update_fn(&ui);
                });

                if let Err(e) = result {
                    // The event loop has stopped; nothing left to update
                    tracing::warn!("Failed to queue UI update to event loop: {:?}", e);
                    break;
                }
            }

            tracing::debug!("EventLoopBridge handler thread terminated");
        });

        Self {
            ui_weak,
            ui_update_tx,
        }
    }

    /// Start pumping the App's event queue into the Slint event loop.
    ///
    /// Each event is dispatched on the Slint thread. When dispatch asks to
    /// exit, the Slint loop is stopped. The pump itself stops, closing the
    /// queue, on a close or Exit event or once the Slint loop is gone.
    pub fn forward_events(&self, app: Arc<App>, events: EventReceiver) -> Result<()> {
        let ui_weak = self.ui_weak.clone();

        std::thread::Builder::new()
            .name("fetchdemo-events".to_string())
            .spawn(move || {
                EventLoop::new(events).run_with(|event| {
                    pump_event(event, |event| {
                        let app = Arc::clone(&app);
                        ui_weak.upgrade_in_event_loop(move |_ui| {
                            if app.dispatch(event) == LoopControl::Exit {
                                if let Err(e) = slint::quit_event_loop() {
                                    tracing::warn!("Failed to quit event loop: {:?}", e);
                                }
                            }
                        })
                    })
                });
            })
            .context("Failed to spawn event pump thread")?;

        Ok(())
    }

    /// Clone the bridge for use in multiple callbacks or threads
    pub fn clone_handle(&self) -> EventLoopBridgeHandle<T> {
        EventLoopBridgeHandle {
            ui_update_tx: self.ui_update_tx.clone(),
        }
    }
}

/// Hand one queued event to `forward` and decide whether the pump keeps going.
fn pump_event<F>(event: AppEvent, forward: F) -> LoopControl
where
    F: FnOnce(AppEvent) -> Result<(), EventLoopError>,
{
    let terminal = matches!(event, AppEvent::WindowClosed | AppEvent::Exit);

    match forward(event) {
        Ok(()) if terminal => LoopControl::Exit,
        Ok(()) => LoopControl::Continue,
        Err(e) => {
            tracing::debug!("Slint event loop gone, stopping event pump: {:?}", e);
            LoopControl::Exit
        }
    }
}

/// Lightweight handle that can be cloned and moved into other threads
pub struct EventLoopBridgeHandle<T: ComponentHandle> {
    ui_update_tx: mpsc::Sender<UiUpdate<T>>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for EventLoopBridgeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            ui_update_tx: self.ui_update_tx.clone(),
        }
    }
}

impl<T: ComponentHandle + 'static> EventLoopBridgeHandle<T> {
    /// Schedule a UI update from any thread
    ///
    /// The update is queued and executed on the next Slint event loop iteration.
    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        match self.ui_update_tx.try_send(Box::new(update)) {
            Ok(_) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("UI update channel full - skipping update to prevent backpressure");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!("Failed to send UI update - handler thread has stopped");
            }
        }
    }
}
