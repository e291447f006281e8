use crate::events::{AppEvent, EventKey, EventSender};
use crate::models::RunId;
use crate::services::strategy::StrategyError;

/// Callable handed to a [`LongOperationDispatcher`]; its return value becomes
/// the completion event's result.
pub type LongOperation = Box<dyn FnOnce() -> String + Send + 'static>;

/// Facility that runs a blocking callable away from the event-loop thread and
/// posts a completion event back into the loop when it returns.
///
/// The event loop itself never waits on the operation. It learns about the
/// outcome through an [`AppEvent::Completed`] (or [`AppEvent::Failed`]) tagged
/// with `completion_key`.
#[cfg_attr(test, mockall::automock)]
pub trait LongOperationDispatcher: Send + Sync {
    fn perform_long_operation(
        &self,
        run: RunId,
        operation: LongOperation,
        completion_key: EventKey,
    ) -> Result<(), StrategyError>;
}

/// [`LongOperationDispatcher`] backed by tokio's blocking thread pool.
pub struct TokioLongRunner {
    runtime: tokio::runtime::Handle,
    events: EventSender,
}

impl TokioLongRunner {
    pub fn new(runtime: tokio::runtime::Handle, events: EventSender) -> Self {
        Self { runtime, events }
    }
}

impl LongOperationDispatcher for TokioLongRunner {
    fn perform_long_operation(
        &self,
        run: RunId,
        operation: LongOperation,
        completion_key: EventKey,
    ) -> Result<(), StrategyError> {
        if self.events.is_closed() {
            return Err(StrategyError::EventLoopClosed);
        }

        let job = self.runtime.spawn_blocking(operation);
        let events = self.events.clone();

        // Watch the blocking job so a panic becomes a failure event instead of
        // a run that never finishes
        self.runtime.spawn(async move {
            let event = match job.await {
                Ok(result) => {
                    tracing::debug!("Long operation {} finished, posting {}", run, completion_key);
                    AppEvent::Completed {
                        run,
                        key: completion_key,
                        result,
                    }
                }
                Err(e) => {
                    tracing::error!("Long operation {} failed: {}", run, e);
                    AppEvent::Failed {
                        run,
                        key: completion_key,
                        reason: e.to_string(),
                    }
                }
            };
            events.post(event);
        });

        Ok(())
    }
}
