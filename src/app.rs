// Application context - owns the window state and maps events to handlers
//
// There is one App per window. It is constructed explicitly in main (or a test),
// shared behind an Arc, and torn down when the last reference is dropped.

use crate::events::{AppEvent, EventKey, EventReceiver, EventSender, LoopControl, event_queue};
use crate::metrics::Metrics;
use crate::models::{DemoConfig, RunId, Strategy};
use crate::services::{
    FetchTask, LongOperationDispatcher, StrategyError, StrategyRunner, TokioLongRunner,
};
use crate::state::StateManager;
use std::sync::Arc;
use std::time::Instant;

/// Everything the event loop needs to handle an event.
///
/// # Dispatch table
///
/// | event                       | action                                  |
/// |-----------------------------|-----------------------------------------|
/// | `WindowClosed`, `Exit`      | stop the loop                           |
/// | `Submit(strategy)`          | run the strategy's handler              |
/// | `Progress`                  | update the progress bar                 |
/// | `Completed` with known key  | mark the run done, show its result      |
/// | `Failed`                    | mark the run failed, show the reason    |
/// | anything else               | ignored                                 |
pub struct App {
    state: Arc<StateManager>,
    metrics: Arc<Metrics>,
    runner: StrategyRunner,
    events: EventSender,
}

impl App {
    /// Build an App whose long-run strategy uses tokio's blocking pool.
    ///
    /// Returns the receiving half of the event queue; hand it to an
    /// [`EventLoop`](crate::ui::EventLoop).
    pub fn new(config: &DemoConfig, runtime: tokio::runtime::Handle) -> (Self, EventReceiver) {
        let (events, receiver) = event_queue();
        let long_runner = Arc::new(TokioLongRunner::new(runtime.clone(), events.clone()));
        let app = Self::with_long_runner(config, runtime, events, long_runner);
        (app, receiver)
    }

    /// Build an App around a caller-supplied long-operation dispatcher.
    pub fn with_long_runner(
        config: &DemoConfig,
        runtime: tokio::runtime::Handle,
        events: EventSender,
        long_runner: Arc<dyn LongOperationDispatcher>,
    ) -> Self {
        let runner = StrategyRunner::new(
            FetchTask::from_settings(&config.task),
            events.clone(),
            runtime,
            config.threads.max_thread_fetches,
            long_runner,
        );

        tracing::debug!(
            "App created: steps={}, interval={}ms, max_thread_fetches={}",
            config.task.steps,
            config.task.step_interval_ms,
            config.threads.max_thread_fetches
        );

        Self {
            state: Arc::new(StateManager::new()),
            metrics: Arc::new(Metrics::new()),
            runner,
            events,
        }
    }

    pub fn state(&self) -> &Arc<StateManager> {
        &self.state
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn runner(&self) -> &StrategyRunner {
        &self.runner
    }

    /// Sender for posting events into this App's queue.
    pub fn events(&self) -> EventSender {
        self.events.clone()
    }

    /// Handle one event on the event-loop thread.
    pub fn dispatch(&self, event: AppEvent) -> LoopControl {
        match event {
            AppEvent::WindowClosed => {
                tracing::info!("Window close requested, stopping event loop");
                LoopControl::Exit
            }
            AppEvent::Exit => {
                tracing::info!("Exit clicked, stopping event loop");
                LoopControl::Exit
            }
            AppEvent::Submit(strategy) => {
                self.on_submit(strategy);
                LoopControl::Continue
            }
            AppEvent::Progress { run, value } => {
                tracing::trace!("Progress {} from {}", value, run);
                self.metrics.record_progress_event();
                self.state.set_progress(value);
                LoopControl::Continue
            }
            AppEvent::Completed { run, key, result } => {
                self.on_completed(run, key, &result);
                LoopControl::Continue
            }
            AppEvent::Failed { run, key, reason } => {
                tracing::error!("Fetch {} ({}) failed: {}", run, key, reason);
                self.metrics.record_run_failed();
                self.state.fail_run(run, &reason);
                LoopControl::Continue
            }
            AppEvent::Unrecognized(key) => {
                tracing::debug!("Ignoring unrecognized event: {}", key);
                self.metrics.record_unhandled_event();
                LoopControl::Continue
            }
        }
    }

    fn on_submit(&self, strategy: Strategy) {
        tracing::info!("Submit {} clicked", strategy);
        self.metrics.record_submission(strategy);

        let started = Instant::now();
        match self.runner.run(strategy, &self.state) {
            Ok(run) if strategy.is_background() => {
                tracing::debug!("{} fetch {} started in the background", strategy, run);
            }
            Ok(run) => {
                tracing::info!(
                    "{} fetch {} finished after blocking the event loop for {:?}",
                    strategy,
                    run,
                    started.elapsed()
                );
                self.metrics.record_run_completed();
            }
            Err(e) => {
                tracing::error!("{} fetch could not run: {}", strategy, e);
                if matches!(e, StrategyError::ThreadLimitReached { .. }) {
                    self.metrics.record_run_rejected();
                } else {
                    self.metrics.record_run_failed();
                }
                self.state.set_output(format!("Fetch failed: {}", e));
            }
        }
        self.metrics.record_loop_blocked(started.elapsed());
    }

    fn on_completed(&self, run: RunId, key: EventKey, result: &str) {
        match Strategy::from_completion_key(key) {
            Some(strategy) => {
                tracing::info!("{} fetch {} completed: {}", strategy, run, result);
                self.state.complete_run(run, result);
                self.metrics.record_run_completed();
            }
            None => {
                tracing::warn!("No handler for completion event {} ({})", key, run);
                self.metrics.record_unhandled_event();
            }
        }
    }
}
