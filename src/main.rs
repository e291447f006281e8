//! FetchDemo - the same slow "fetch name" run five different ways
//!
//! Main entry point for the GUI application.
//!
//! # Overview
//!
//! Each submit button runs an identical 20-step, half-second-per-step fetch
//! under a different execution strategy, so the effect on window
//! responsiveness can be compared side by side:
//!
//! - **Sync**: direct call, window frozen for the full duration
//! - **Async**: coroutine driven to completion inside the handler, still frozen
//! - **Thread**: background OS thread, window stays responsive
//! - **Long Run**: tokio blocking pool with a completion event
//! - **Spawned**: coroutine on the shared runtime
//!
//! # Execution Flow
//!
//! 1. Load `FetchDemo Data/FetchDemo.yaml` (written with defaults if missing)
//! 2. Initialize logging → `logs/fetchdemo.<date>`
//! 3. Create the tokio runtime used by background strategies
//! 4. Create the App context and the GUI controller
//! 5. Run the Slint event loop (blocks until the window is closed)
//! 6. Log metrics and shut down the runtime with a 5s timeout

use anyhow::Result;
use fetchdemo::ui::GuiController;
use fetchdemo::{APP_NAME, App, CONFIG_DIR, ConfigManager, VERSION};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let config_manager = ConfigManager::new(CONFIG_DIR)?;
    let config = config_manager.load()?;

    // Held until main returns so buffered log lines are flushed
    let _log_guard = fetchdemo::logging::setup_logging(&config.logging)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(config.threads.runtime_workers)
        .thread_name("fetchdemo-worker")
        .build()?;

    tracing::info!(
        "Tokio runtime initialized with {} worker threads",
        config.threads.runtime_workers
    );

    let (app, events) = App::new(&config, runtime.handle().clone());
    let app = Arc::new(app);

    let gui_controller = GuiController::new(Arc::clone(&app), events, &config.window)?;

    tracing::info!("GUI controller initialized, launching window");

    // Run the GUI (blocks until the window is closed)
    let result = gui_controller.run();

    tracing::info!("GUI closed, shutting down");
    app.metrics().log_summary();

    // Background fetches are not cancellable; give them a bounded grace period
    runtime.shutdown_timeout(Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("GUI error: {}", e);
        anyhow::anyhow!("GUI error: {}", e)
    })
}
