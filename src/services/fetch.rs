use crate::models::TaskSettings;
use std::time::Duration;

/// One progress report from the simulated fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    /// Zero-based iteration index
    pub step: u32,
    /// Progress bar value after this iteration
    pub value: u8,
}

/// Progress value after iteration `step` (zero-based) of a fetch with `steps`
/// iterations.
///
/// For the default 20 steps this is `step * 5 + 5`, reaching exactly 100 on
/// the last iteration.
pub fn progress_for_step(step: u32, steps: u32) -> u8 {
    debug_assert!(steps > 0 && step < steps);
    ((u64::from(step) + 1) * 100 / u64::from(steps)) as u8
}

/// The simulated long-running "fetch name" operation.
///
/// Pauses, reports progress, repeats `steps` times and returns a fixed result.
/// Both variants produce the same progress sequence; they differ only in how
/// they pause:
///
/// - [`run_blocking`](Self::run_blocking) parks the calling thread
/// - [`run_async`](Self::run_async) suspends on a tokio timer
///
/// Cloning is cheap enough to hand a copy to every run.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTask {
    steps: u32,
    step_interval: Duration,
    result: String,
}

impl FetchTask {
    pub fn new(steps: u32, step_interval: Duration, result: impl Into<String>) -> Self {
        Self {
            steps,
            step_interval,
            result: result.into(),
        }
    }

    pub fn from_settings(settings: &TaskSettings) -> Self {
        Self::new(settings.steps, settings.step_interval(), settings.result.clone())
    }

    /// Minimum wall-clock time one run takes.
    pub fn expected_duration(&self) -> Duration {
        self.step_interval * self.steps
    }

    /// Progress values reported by one run, in order.
    pub fn progress_sequence(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.steps).map(|step| progress_for_step(step, self.steps))
    }

    /// Run on the current thread, blocking it between reports.
    pub fn run_blocking<F>(&self, mut report: F) -> String
    where
        F: FnMut(FetchProgress),
    {
        for step in 0..self.steps {
            std::thread::sleep(self.step_interval);
            report(FetchProgress {
                step,
                value: progress_for_step(step, self.steps),
            });
        }
        self.result.clone()
    }

    /// Run as a coroutine; each pause is a suspension point.
    pub async fn run_async<F>(&self, mut report: F) -> String
    where
        F: FnMut(FetchProgress),
    {
        for step in 0..self.steps {
            tokio::time::sleep(self.step_interval).await;
            report(FetchProgress {
                step,
                value: progress_for_step(step, self.steps),
            });
        }
        self.result.clone()
    }
}

impl Default for FetchTask {
    fn default() -> Self {
        Self::from_settings(&TaskSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::Instant;

    fn quick_task() -> FetchTask {
        FetchTask::new(20, Duration::from_millis(1), "David Barnes")
    }

    #[test]
    fn test_default_progress_steps_by_five() {
        let task = FetchTask::default();
        let values: Vec<u8> = task.progress_sequence().collect();

        assert_eq!(values.len(), 20);
        for (i, value) in values.iter().enumerate() {
            assert_eq!(*value as usize, i * 5 + 5);
        }
        assert_eq!(values.last(), Some(&100));
    }

    #[test]
    fn test_default_expected_duration() {
        assert_eq!(FetchTask::default().expected_duration(), Duration::from_secs(10));
    }

    #[test]
    fn test_run_blocking_reports_every_step() {
        let task = quick_task();
        let mut reports = Vec::new();

        let result = task.run_blocking(|p| reports.push(p));

        assert_eq!(result, "David Barnes");
        assert_eq!(reports.len(), 20);
        assert_eq!(reports[0], FetchProgress { step: 0, value: 5 });
        assert_eq!(reports[19], FetchProgress { step: 19, value: 100 });
    }

    #[test]
    fn test_run_blocking_takes_full_duration() {
        let task = FetchTask::new(5, Duration::from_millis(20), "x");
        let start = Instant::now();

        task.run_blocking(|_| {});

        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[test]
    fn test_run_async_matches_blocking_sequence() {
        let task = quick_task();
        let mut async_values = Vec::new();

        let result = tokio_test::block_on(task.run_async(|p| async_values.push(p.value)));

        let blocking_values: Vec<u8> = task.progress_sequence().collect();
        assert_eq!(result, "David Barnes");
        assert_eq!(async_values, blocking_values);
    }

    proptest! {
        #[test]
        fn prop_progress_strictly_increases_to_100(steps in 1u32..=100) {
            let task = FetchTask::new(steps, Duration::ZERO, "n");
            let values: Vec<u8> = task.progress_sequence().collect();

            prop_assert_eq!(values.len(), steps as usize);
            prop_assert!(values[0] >= 1);
            prop_assert!(values.windows(2).all(|w| w[0] < w[1]));
            prop_assert_eq!(*values.last().unwrap(), 100);
        }
    }
}
