//! Services module - the simulated fetch and the strategies that run it.
//!
//! Nothing here depends on Slint; the GUI layer only calls into
//! [`StrategyRunner`] through the [`App`](crate::app::App) dispatcher.
//!
//! # Components
//!
//! - [`FetchTask`]: the pause-then-report loop, in blocking and async flavours
//! - [`StrategyRunner`]: one entry point per [`Strategy`](crate::models::Strategy):
//!   - sync: direct call on the event-loop thread
//!   - async: coroutine driven to completion by a throwaway runtime
//!   - thread: bounded OS thread per click
//!   - long-run: handed to a [`LongOperationDispatcher`]
//!   - spawned: coroutine on the shared tokio runtime
//! - [`TokioLongRunner`]: the production dispatcher, built on `spawn_blocking`
//!
//! # Reporting
//!
//! On-loop strategies write to [`StateManager`](crate::state::StateManager)
//! directly. Background strategies post [`AppEvent`](crate::events::AppEvent)s
//! and leave every state mutation to the event loop.

pub mod fetch;
pub mod long_run;
pub mod strategy;

pub use fetch::{FetchProgress, FetchTask, progress_for_step};
pub use long_run::{LongOperation, LongOperationDispatcher, TokioLongRunner};
pub use strategy::{StrategyError, StrategyRunner};
