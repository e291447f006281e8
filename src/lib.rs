// FetchDemo - sync, async, threaded and long-running fetches inside a GUI event loop
//
// This is the library crate containing the strategies, state and event loop.
// The binary crate (main.rs) provides the GUI entry point.

pub mod app;
pub mod config;
pub mod events;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use crate::app::App;
pub use crate::config::ConfigManager;
pub use crate::events::{AppEvent, EventKey, LoopControl};
pub use crate::models::{DemoConfig, Strategy, UiState};
pub use crate::state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Directory holding `FetchDemo.yaml`, relative to the working directory
pub const CONFIG_DIR: &str = "FetchDemo Data";
