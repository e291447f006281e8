// Performance metrics module
//
// Lightweight counters describing how the strategies were exercised and how long
// the event loop spent blocked inside handlers

use crate::models::Strategy;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Application metrics
///
/// Uses atomic operations for thread-safe tracking without locks. Logged once
/// on shutdown.
#[derive(Debug)]
pub struct Metrics {
    pub sync_submissions: AtomicU64,
    pub async_submissions: AtomicU64,
    pub thread_submissions: AtomicU64,
    pub long_run_submissions: AtomicU64,
    pub spawned_submissions: AtomicU64,

    /// Runs that delivered their result
    pub runs_completed: AtomicU64,

    /// Runs that failed after starting
    pub runs_failed: AtomicU64,

    /// Submissions refused before a run started (e.g. thread limit)
    pub runs_rejected: AtomicU64,

    /// Progress messages consumed from the event queue
    pub progress_events: AtomicU64,

    /// Events with no dispatch entry, including unmatched completions
    pub unhandled_events: AtomicU64,

    /// Time the event loop spent inside submit handlers, in milliseconds
    pub loop_blocked_ms: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            sync_submissions: AtomicU64::new(0),
            async_submissions: AtomicU64::new(0),
            thread_submissions: AtomicU64::new(0),
            long_run_submissions: AtomicU64::new(0),
            spawned_submissions: AtomicU64::new(0),
            runs_completed: AtomicU64::new(0),
            runs_failed: AtomicU64::new(0),
            runs_rejected: AtomicU64::new(0),
            progress_events: AtomicU64::new(0),
            unhandled_events: AtomicU64::new(0),
            loop_blocked_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    fn submissions_for(&self, strategy: Strategy) -> &AtomicU64 {
        match strategy {
            Strategy::Sync => &self.sync_submissions,
            Strategy::Async => &self.async_submissions,
            Strategy::Thread => &self.thread_submissions,
            Strategy::LongRun => &self.long_run_submissions,
            Strategy::Spawned => &self.spawned_submissions,
        }
    }

    /// Record a submit button click
    pub fn record_submission(&self, strategy: Strategy) {
        self.submissions_for(strategy).fetch_add(1, Ordering::Relaxed);
    }

    pub fn submissions(&self, strategy: Strategy) -> u64 {
        self.submissions_for(strategy).load(Ordering::Relaxed)
    }

    pub fn record_run_completed(&self) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_failed(&self) {
        self.runs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_run_rejected(&self) {
        self.runs_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_progress_event(&self) {
        self.progress_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unhandled_event(&self) {
        self.unhandled_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how long a handler held the event loop
    pub fn record_loop_blocked(&self, duration: Duration) {
        self.loop_blocked_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Fetch Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Submissions: sync={}, async={}, thread={}, long-run={}, spawned={}",
            self.sync_submissions.load(Ordering::Relaxed),
            self.async_submissions.load(Ordering::Relaxed),
            self.thread_submissions.load(Ordering::Relaxed),
            self.long_run_submissions.load(Ordering::Relaxed),
            self.spawned_submissions.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Runs: {} completed, {} failed, {} rejected",
            self.runs_completed.load(Ordering::Relaxed),
            self.runs_failed.load(Ordering::Relaxed),
            self.runs_rejected.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Events: {} progress, {} unhandled; event loop blocked {:.2}s",
            self.progress_events.load(Ordering::Relaxed),
            self.unhandled_events.load(Ordering::Relaxed),
            self.loop_blocked_ms.load(Ordering::Relaxed) as f64 / 1000.0
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
