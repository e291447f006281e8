// GUI Controller - Bridges the Slint window with the App dispatcher
//
// It handles:
// - Turning button clicks and close requests into AppEvents
// - Pumping background events into the Slint thread (via EventLoopBridge)
// - Subscribing to state changes → widget updates

use crate::app::App;
use crate::events::{AppEvent, EventReceiver, LoopControl};
use crate::models::{Strategy, WindowSettings};
use crate::state::{StateChange, StateManager};
use crate::ui::bridge::EventLoopBridge;
use anyhow::{Context, Result};
use std::sync::Arc;

// Include the generated Slint code
slint::include_modules!();

/// GUI Controller that wires the Slint window to the [`App`]
///
/// Slint's own event loop plays the part of the blocking read-dispatch loop:
/// button callbacks dispatch on the Slint thread, so the sync and async
/// strategies freeze the window exactly as long as they run, while the
/// background strategies return at once and report through the event queue.
///
/// # Example
/// ```ignore
/// let runtime = tokio::runtime::Runtime::new()?;
/// let (app, events) = App::new(&config, runtime.handle().clone());
/// let controller = GuiController::new(Arc::new(app), events, &config.window)?;
/// controller.run()?;  // Blocks until the window is closed
/// ```
pub struct GuiController {
    /// The Slint UI window
    ui: MainWindow,

    /// Event loop bridge; owns the UI update and event pump threads
    _bridge: EventLoopBridge<MainWindow>,

    /// Shared application context
    app: Arc<App>,
}

impl GuiController {
    /// Create a new GUI controller
    ///
    /// # Arguments
    /// * `app` - Application context handling every event
    /// * `events` - Receiving half of the App's event queue
    /// * `window` - Window settings from the configuration file
    pub fn new(app: Arc<App>, events: EventReceiver, window: &WindowSettings) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;
        ui.set_window_title(window.title.clone().into());

        let bridge = EventLoopBridge::new(&ui);

        Self::sync_ui_with_state(&ui, app.state());
        Self::setup_callbacks(&ui, &app);
        Self::setup_state_subscription(&bridge, app.state());
        bridge.forward_events(Arc::clone(&app), events)?;

        tracing::info!("GUI controller initialized");

        Ok(Self {
            ui,
            _bridge: bridge,
            app,
        })
    }

    /// Run the GUI (blocks until the window is closed or Exit is clicked)
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        let result = self.ui.run();

        // Wake the event pump so it stops and closes the queue
        self.app.events().post(AppEvent::WindowClosed);

        let active = self.app.state().read(|s| s.active_runs());
        if active > 0 {
            tracing::warn!("Window closed with {} fetch(es) still running", active);
        }
        result
    }

    /// Initialize widgets from the current state
    fn sync_ui_with_state(ui: &MainWindow, state_manager: &StateManager) {
        let state = state_manager.snapshot();

        ui.set_output_text(state.output_text.clone().into());
        ui.set_progress_value(i32::from(state.progress_value));
        ui.set_active_runs(state.active_runs() as i32);

        tracing::debug!("UI synchronized with initial state");
    }

    /// Connect Slint callbacks to the dispatcher
    fn setup_callbacks(ui: &MainWindow, app: &Arc<App>) {
        let submit = |strategy: Strategy| {
            let app = Arc::clone(app);
            move || Self::dispatch(&app, AppEvent::Submit(strategy))
        };

        ui.on_submit_sync(submit(Strategy::Sync));
        ui.on_submit_async(submit(Strategy::Async));
        ui.on_submit_thread(submit(Strategy::Thread));
        ui.on_submit_long_run(submit(Strategy::LongRun));
        ui.on_submit_spawn(submit(Strategy::Spawned));

        let app_for_exit = Arc::clone(app);
        ui.on_exit(move || Self::dispatch(&app_for_exit, AppEvent::Exit));

        let app_for_close = Arc::clone(app);
        ui.window().on_close_requested(move || {
            Self::dispatch(&app_for_close, AppEvent::WindowClosed);
            slint::CloseRequestResponse::HideWindow
        });
    }

    fn dispatch(app: &App, event: AppEvent) {
        if app.dispatch(event) == LoopControl::Exit {
            if let Err(e) = slint::quit_event_loop() {
                tracing::warn!("Failed to quit event loop: {:?}", e);
            }
        }
    }

    /// Subscribe to state changes and update widgets accordingly
    ///
    /// This spawns a background thread that listens for state change events
    /// and updates the Slint UI via the EventLoopBridge.
    fn setup_state_subscription(bridge: &EventLoopBridge<MainWindow>, state_manager: &StateManager) {
        let bridge_handle = bridge.clone_handle();
        let mut rx = state_manager.subscribe();

        std::thread::spawn(move || {
            tracing::debug!("State subscription thread started");

            loop {
                match rx.blocking_recv() {
                    Ok(change) => {
                        tracing::trace!("State change received: {:?}", change);

                        match change {
                            StateChange::OutputChanged { text } => {
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_output_text(text.into());
                                });
                            }
                            StateChange::ProgressUpdated { value } => {
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_progress_value(i32::from(value));
                                });
                            }
                            StateChange::ActiveRunsChanged { active } => {
                                bridge_handle.update_ui(move |ui| {
                                    ui.set_active_runs(active as i32);
                                });
                            }
                            StateChange::RunStarted { run, strategy } => {
                                tracing::debug!("{} fetch {} running", strategy, run);
                            }
                            StateChange::RunFinished {
                                run,
                                strategy,
                                status,
                            } => {
                                tracing::debug!("{} fetch {} finished: {:?}", strategy, run, status);
                            }
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        tracing::info!(
                            "State broadcast channel closed - shutting down subscription thread"
                        );
                        break;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "State subscription lagged - {} events were skipped",
                            skipped
                        );
                    }
                }
            }

            tracing::debug!("State subscription thread terminated gracefully");
        });
    }
}
