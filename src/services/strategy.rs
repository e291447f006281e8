use crate::events::{AppEvent, EventKey, EventSender};
use crate::models::{
    FETCHING_LONG_RUN_TEXT, FETCHING_SPAWNED_TEXT, FETCHING_TEXT, RunId, Strategy,
};
use crate::services::fetch::FetchTask;
use crate::services::long_run::{LongOperation, LongOperationDispatcher};
use crate::state::StateManager;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::Semaphore;

/// Errors a submit handler can return
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Thread fetch limit of {limit} reached")]
    ThreadLimitReached { limit: usize },

    #[error("Failed to spawn fetch thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    #[error("Failed to build run-to-completion runtime: {0}")]
    RuntimeBuild(#[source] std::io::Error),

    #[error("Cannot drive a fetch to completion from inside an async runtime")]
    NestedRuntime,

    #[error("Event loop has shut down")]
    EventLoopClosed,
}

/// Runs the simulated fetch under each [`Strategy`].
///
/// `Sync` and `Async` finish inside their handler and write progress straight
/// to the [`StateManager`], which is fine because the handler is already on the
/// event-loop thread. The background strategies return as soon as the work is
/// started and report through [`AppEvent`]s posted to the loop's queue.
///
/// # Concurrency
///
/// Thread-strategy runs are capped by a semaphore; each thread holds an owned
/// permit until it exits. Long-run and spawned runs share the tokio runtime's
/// pools and need no extra bound.
pub struct StrategyRunner {
    task: FetchTask,
    events: EventSender,
    runtime: tokio::runtime::Handle,
    thread_permits: Arc<Semaphore>,
    max_thread_fetches: usize,
    long_runner: Arc<dyn LongOperationDispatcher>,
    next_run: AtomicU64,
}

impl StrategyRunner {
    pub fn new(
        task: FetchTask,
        events: EventSender,
        runtime: tokio::runtime::Handle,
        max_thread_fetches: usize,
        long_runner: Arc<dyn LongOperationDispatcher>,
    ) -> Self {
        Self {
            task,
            events,
            runtime,
            thread_permits: Arc::new(Semaphore::new(max_thread_fetches)),
            max_thread_fetches,
            long_runner,
            next_run: AtomicU64::new(1),
        }
    }

    pub fn task(&self) -> &FetchTask {
        &self.task
    }

    /// Thread-strategy runs that could start right now.
    pub fn available_thread_slots(&self) -> usize {
        self.thread_permits.available_permits()
    }

    fn next_run_id(&self) -> RunId {
        RunId(self.next_run.fetch_add(1, Ordering::Relaxed))
    }

    /// Start (and for on-loop strategies, finish) one run.
    pub fn run(&self, strategy: Strategy, state: &StateManager) -> Result<RunId, StrategyError> {
        match strategy {
            Strategy::Sync => Ok(self.run_sync(state)),
            Strategy::Async => self.run_async(state),
            Strategy::Thread => self.run_thread(state),
            Strategy::LongRun => self.run_long_run(state),
            Strategy::Spawned => Ok(self.run_spawned(state)),
        }
    }

    /// Call the fetch directly. The window cannot process any event, including
    /// close, until it returns.
    pub fn run_sync(&self, state: &StateManager) -> RunId {
        let run = self.next_run_id();
        state.begin_run(run, Strategy::Sync, FETCHING_TEXT);

        let result = self.task.run_blocking(|p| {
            state.set_progress(p.value);
        });

        state.complete_run(run, &result);
        run
    }

    /// Drive the coroutine variant to completion with a fresh current-thread
    /// runtime. Nothing else is scheduled on that runtime, so the event loop is
    /// blocked exactly as long as in [`run_sync`](Self::run_sync).
    pub fn run_async(&self, state: &StateManager) -> Result<RunId, StrategyError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(StrategyError::NestedRuntime);
        }

        let driver = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(StrategyError::RuntimeBuild)?;

        let run = self.next_run_id();
        state.begin_run(run, Strategy::Async, FETCHING_TEXT);
        tracing::warn!(
            "Driving async fetch {} to completion on the event-loop thread; the window is unresponsive until it finishes",
            run
        );

        let result = driver.block_on(self.task.run_async(|p| {
            state.set_progress(p.value);
        }));

        state.complete_run(run, &result);
        Ok(run)
    }

    /// Spawn a dedicated OS thread and return immediately.
    pub fn run_thread(&self, state: &StateManager) -> Result<RunId, StrategyError> {
        let permit = Arc::clone(&self.thread_permits)
            .try_acquire_owned()
            .map_err(|_| StrategyError::ThreadLimitReached {
                limit: self.max_thread_fetches,
            })?;

        let run = self.next_run_id();
        state.begin_run(run, Strategy::Thread, FETCHING_TEXT);

        let task = self.task.clone();
        let events = self.events.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("fetch-{}", run))
            .spawn(move || {
                let _permit = permit;
                tracing::debug!("Thread fetch {} started", run);

                let result = task.run_blocking(|p| {
                    events.post(AppEvent::Progress { run, value: p.value });
                });

                events.post(AppEvent::Completed {
                    run,
                    key: EventKey::DONE_THREAD,
                    result,
                });
            });

        if let Err(e) = spawned {
            let err = StrategyError::ThreadSpawn(e);
            state.fail_run(run, &err.to_string());
            return Err(err);
        }

        Ok(run)
    }

    /// Hand the fetch to the long-operation dispatcher with the
    /// `-done-long-run-` completion key and return immediately.
    pub fn run_long_run(&self, state: &StateManager) -> Result<RunId, StrategyError> {
        let run = self.next_run_id();
        state.begin_run(run, Strategy::LongRun, FETCHING_LONG_RUN_TEXT);

        let task = self.task.clone();
        let events = self.events.clone();
        let operation: LongOperation = Box::new(move || {
            task.run_blocking(|p| {
                events.post(AppEvent::Progress { run, value: p.value });
            })
        });

        if let Err(e) =
            self.long_runner
                .perform_long_operation(run, operation, EventKey::DONE_LONG_RUN)
        {
            state.fail_run(run, &e.to_string());
            return Err(e);
        }

        Ok(run)
    }

    /// Spawn the coroutine on the shared runtime and return immediately; its
    /// pauses interleave with the window's own event processing.
    pub fn run_spawned(&self, state: &StateManager) -> RunId {
        let run = self.next_run_id();
        state.begin_run(run, Strategy::Spawned, FETCHING_SPAWNED_TEXT);

        let task = self.task.clone();
        let events = self.events.clone();

        self.runtime.spawn(async move {
            let result = task
                .run_async(|p| {
                    events.post(AppEvent::Progress { run, value: p.value });
                })
                .await;

            events.post(AppEvent::Completed {
                run,
                key: EventKey::DONE_SPAWN,
                result,
            });
        });

        run
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventReceiver, event_queue};
    use crate::models::RunStatus;
    use crate::services::long_run::MockLongOperationDispatcher;
    use crate::state::StateChange;
    use std::time::{Duration, Instant};

    fn quick_task() -> FetchTask {
        FetchTask::new(20, Duration::from_millis(5), "David Barnes")
    }

    fn runner_with(
        rt: &tokio::runtime::Runtime,
        max_threads: usize,
        long_runner: MockLongOperationDispatcher,
    ) -> (StrategyRunner, EventReceiver) {
        let (tx, rx) = event_queue();
        let runner = StrategyRunner::new(
            quick_task(),
            tx,
            rt.handle().clone(),
            max_threads,
            Arc::new(long_runner),
        );
        (runner, rx)
    }

    /// Drain events for `run` until its completion arrives.
    fn collect_until_done(rx: &mut EventReceiver) -> (Vec<u8>, String) {
        let mut progress = Vec::new();
        loop {
            match rx.blocking_recv().expect("queue closed before completion") {
                AppEvent::Progress { value, .. } => progress.push(value),
                AppEvent::Completed { result, .. } => return (progress, result),
                other => panic!("Unexpected event: {:?}", other),
            }
        }
    }

    #[test]
    fn test_sync_blocks_and_finishes() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (runner, _rx) = runner_with(&rt, 1, MockLongOperationDispatcher::new());
        let state = StateManager::new();

        let start = Instant::now();
        let run = runner.run(Strategy::Sync, &state).unwrap();

        assert!(start.elapsed() >= runner.task().expected_duration());
        let snapshot = state.snapshot();
        assert_eq!(snapshot.output_text, "David Barnes");
        assert_eq!(snapshot.progress_value, 100);
        assert_eq!(snapshot.runs[&run].status, RunStatus::Done);
    }

    #[test]
    fn test_async_run_to_completion_blocks_like_sync() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (runner, _rx) = runner_with(&rt, 1, MockLongOperationDispatcher::new());
        let state = StateManager::new();
        let mut changes = state.subscribe();

        let start = Instant::now();
        runner.run(Strategy::Async, &state).unwrap();

        assert!(start.elapsed() >= runner.task().expected_duration());
        assert_eq!(state.read(|s| s.output_text.clone()), "David Barnes");

        let mut progress = Vec::new();
        while let Ok(change) = changes.try_recv() {
            if let StateChange::ProgressUpdated { value } = change {
                progress.push(value);
            }
        }
        let expected: Vec<u8> = runner.task().progress_sequence().collect();
        assert_eq!(progress, expected);
    }

    #[test]
    fn test_async_refuses_nested_runtime() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (runner, _rx) = runner_with(&rt, 1, MockLongOperationDispatcher::new());
        let state = StateManager::new();

        let result = rt.block_on(async { runner.run(Strategy::Async, &state) });

        assert!(matches!(result, Err(StrategyError::NestedRuntime)));
        assert!(state.snapshot().runs.is_empty());
    }

    #[test]
    fn test_thread_returns_immediately_and_reports_through_events() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (runner, mut rx) = runner_with(&rt, 2, MockLongOperationDispatcher::new());
        let state = StateManager::new();

        let start = Instant::now();
        let run = runner.run(Strategy::Thread, &state).unwrap();

        assert!(start.elapsed() < runner.task().expected_duration());
        assert_eq!(state.snapshot().output_text, "Fetching Name");
        assert_eq!(state.snapshot().runs[&run].status, RunStatus::Running);

        let (progress, result) = collect_until_done(&mut rx);
        assert_eq!(progress, runner.task().progress_sequence().collect::<Vec<_>>());
        assert_eq!(result, "David Barnes");
    }

    #[test]
    fn test_thread_limit_rejects_extra_clicks() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (runner, mut rx) = runner_with(&rt, 1, MockLongOperationDispatcher::new());
        let state = StateManager::new();

        runner.run(Strategy::Thread, &state).unwrap();
        let second = runner.run(Strategy::Thread, &state);

        assert!(matches!(
            second,
            Err(StrategyError::ThreadLimitReached { limit: 1 })
        ));
        assert_eq!(state.snapshot().runs.len(), 1);

        collect_until_done(&mut rx);

        // The permit is released when the thread exits
        let deadline = Instant::now() + Duration::from_secs(2);
        while runner.available_thread_slots() == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(runner.available_thread_slots(), 1);
    }

    #[test]
    fn test_long_run_dispatches_once_with_stable_key() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut dispatcher = MockLongOperationDispatcher::new();
        dispatcher
            .expect_perform_long_operation()
            .withf(|_, _, key| *key == EventKey::DONE_LONG_RUN)
            .times(1)
            .returning(|_, _, _| Ok(()));
        let (runner, _rx) = runner_with(&rt, 1, dispatcher);
        let state = StateManager::new();

        let start = Instant::now();
        let run = runner.run(Strategy::LongRun, &state).unwrap();

        assert!(start.elapsed() < Duration::from_millis(50));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.output_text, "Fetching Name Long Running");
        assert_eq!(snapshot.runs[&run].status, RunStatus::Running);
    }

    #[test]
    fn test_long_run_operation_runs_the_fetch() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut dispatcher = MockLongOperationDispatcher::new();
        dispatcher
            .expect_perform_long_operation()
            .times(1)
            .returning(|_, operation, _| {
                assert_eq!(operation(), "David Barnes");
                Ok(())
            });
        let (runner, mut rx) = runner_with(&rt, 1, dispatcher);
        let state = StateManager::new();

        runner.run(Strategy::LongRun, &state).unwrap();

        let mut progress = Vec::new();
        while let Ok(AppEvent::Progress { value, .. }) = rx.try_recv() {
            progress.push(value);
        }
        assert_eq!(progress.len(), 20);
        assert_eq!(progress.last(), Some(&100));
    }

    #[test]
    fn test_long_run_dispatch_failure_marks_run_failed() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut dispatcher = MockLongOperationDispatcher::new();
        dispatcher
            .expect_perform_long_operation()
            .returning(|_, _, _| Err(StrategyError::EventLoopClosed));
        let (runner, _rx) = runner_with(&rt, 1, dispatcher);
        let state = StateManager::new();

        let result = runner.run(Strategy::LongRun, &state);

        assert!(matches!(result, Err(StrategyError::EventLoopClosed)));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.output_text, "Fetch failed: Event loop has shut down");
        assert_eq!(snapshot.active_runs(), 0);
    }

    #[test]
    fn test_spawned_returns_immediately() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (runner, mut rx) = runner_with(&rt, 1, MockLongOperationDispatcher::new());
        let state = StateManager::new();

        let start = Instant::now();
        runner.run(Strategy::Spawned, &state).unwrap();

        assert!(start.elapsed() < runner.task().expected_duration());
        assert_eq!(state.snapshot().output_text, "Fetching Name Spawned");

        let (progress, result) = collect_until_done(&mut rx);
        assert_eq!(progress.len(), 20);
        assert_eq!(result, "David Barnes");
    }

    #[test]
    fn test_run_ids_are_unique() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (runner, _rx) = runner_with(&rt, 4, MockLongOperationDispatcher::new());
        let state = StateManager::new();

        let a = runner.run(Strategy::Spawned, &state).unwrap();
        let b = runner.run(Strategy::Spawned, &state).unwrap();

        assert_ne!(a, b);
        assert_eq!(state.snapshot().active_runs(), 2);
    }
}
