//! Single-flight labeling trigger
//!
//! A click disables the trigger and shows progress, runs the job, then hides
//! progress, records the result message and re-enables the trigger. Clicks
//! while disabled are ignored. Re-enabling happens in a drop guard, so it also
//! runs when the job fails, panics, or its future is dropped.

use super::job::LabelingJob;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Message shown to the user when a run fails
pub const FAILURE_MESSAGE: &str = "Labeling failed. Please try again.";

/// Message recorded when a run ends without settling
pub const INTERRUPTED_MESSAGE: &str = "Labeling was interrupted.";

/// Result message of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMessage {
    pub run_id: Uuid,
    pub success: bool,
    pub message: String,
    pub finished_at: DateTime<Utc>,
}

impl ResultMessage {
    fn new(run_id: Uuid, success: bool, message: impl Into<String>) -> Self {
        Self {
            run_id,
            success,
            message: message.into(),
            finished_at: Utc::now(),
        }
    }
}

/// Observable state of the trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerState {
    /// Whether a click would start a run
    pub enabled: bool,
    /// Whether the progress indicator is shown
    pub in_progress: bool,
    /// Message of the most recent settled run
    pub last_result: Option<ResultMessage>,
}

impl TriggerState {
    fn idle() -> Self {
        Self {
            enabled: true,
            in_progress: false,
            last_result: None,
        }
    }
}

/// Result of a click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click started a run, which settled with this message
    Settled(ResultMessage),
    /// A run was already in flight; nothing happened
    Ignored,
}

struct TriggerInner {
    job: Arc<dyn LabelingJob>,
    state: watch::Sender<TriggerState>,
}

/// Labeling button model
#[derive(Clone)]
pub struct LabelingTrigger {
    inner: Arc<TriggerInner>,
}

/// Holds the trigger disabled for the lifetime of one run
struct Flight {
    inner: Arc<TriggerInner>,
    run_id: Uuid,
    result: Option<ResultMessage>,
}

impl Flight {
    async fn run(mut self) -> ResultMessage {
        let message = match self.inner.job.run().await {
            Ok(outcome) => {
                info!(run_id = %self.run_id, "Labeling run succeeded");
                ResultMessage::new(self.run_id, true, outcome.message)
            }
            Err(e) => {
                warn!(run_id = %self.run_id, error = %e, "Labeling run failed");
                ResultMessage::new(self.run_id, false, FAILURE_MESSAGE)
            }
        };
        self.result = Some(message.clone());
        message
    }
}

impl Drop for Flight {
    fn drop(&mut self) {
        let result = self
            .result
            .take()
            .unwrap_or_else(|| ResultMessage::new(self.run_id, false, INTERRUPTED_MESSAGE));
        self.inner.state.send_modify(|state| {
            state.in_progress = false;
            state.last_result = Some(result);
            state.enabled = true;
        });
    }
}

impl LabelingTrigger {
    pub fn new(job: Arc<dyn LabelingJob>) -> Self {
        let (state, _) = watch::channel(TriggerState::idle());
        Self {
            inner: Arc::new(TriggerInner { job, state }),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> TriggerState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<TriggerState> {
        self.inner.state.subscribe()
    }

    /// Disable the trigger if it is enabled; `None` when a run is in flight
    fn begin(&self) -> Option<Flight> {
        let started = self.inner.state.send_if_modified(|state| {
            if !state.enabled {
                return false;
            }
            state.enabled = false;
            state.in_progress = true;
            state.last_result = None;
            true
        });

        if !started {
            debug!("Labeling already in progress, click ignored");
            return None;
        }

        let run_id = Uuid::new_v4();
        info!(%run_id, "Labeling run started");
        Some(Flight {
            inner: Arc::clone(&self.inner),
            run_id,
            result: None,
        })
    }

    /// Click and wait for the run to settle
    pub async fn click(&self) -> ClickOutcome {
        match self.begin() {
            Some(flight) => ClickOutcome::Settled(flight.run().await),
            None => ClickOutcome::Ignored,
        }
    }

    /// Click without waiting; `None` when a run is already in flight
    pub fn spawn_click(&self) -> Option<JoinHandle<ResultMessage>> {
        let flight = self.begin()?;
        Some(tokio::spawn(flight.run()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeling::job::{LabelingOutcome, SimulatedLabelingJob, SIMULATED_MESSAGE};
    use crate::labeling::{LabelingError, LabelingResult};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FailingJob;

    #[async_trait]
    impl LabelingJob for FailingJob {
        async fn run(&self) -> LabelingResult<LabelingOutcome> {
            Err(LabelingError::InvalidResponse("boom".to_string()))
        }
    }

    fn simulated(ms: u64) -> LabelingTrigger {
        LabelingTrigger::new(Arc::new(SimulatedLabelingJob::new(Duration::from_millis(ms))))
    }

    #[tokio::test]
    async fn test_success_re_enables() {
        let trigger = simulated(5);
        let outcome = trigger.click().await;

        match outcome {
            ClickOutcome::Settled(result) => {
                assert!(result.success);
                assert_eq!(result.message, SIMULATED_MESSAGE);
            }
            ClickOutcome::Ignored => panic!("click should have started a run"),
        }

        let state = trigger.state();
        assert!(state.enabled);
        assert!(!state.in_progress);
        assert!(state.last_result.unwrap().success);
    }

    #[tokio::test]
    async fn test_failure_re_enables() {
        let trigger = LabelingTrigger::new(Arc::new(FailingJob));
        for _ in 0..3 {
            let ClickOutcome::Settled(result) = trigger.click().await else {
                panic!("click should have started a run");
            };
            assert!(!result.success);
            assert_eq!(result.message, FAILURE_MESSAGE);
            assert!(trigger.state().enabled);
        }
    }

    #[tokio::test]
    async fn test_click_while_running_is_ignored() {
        let trigger = simulated(200);
        let handle = trigger.spawn_click().unwrap();

        let state = trigger.state();
        assert!(!state.enabled);
        assert!(state.in_progress);
        assert!(state.last_result.is_none());

        assert_eq!(trigger.click().await, ClickOutcome::Ignored);
        assert!(trigger.spawn_click().is_none());

        let result = handle.await.unwrap();
        assert!(result.success);
        assert!(trigger.state().enabled);
    }

    #[tokio::test]
    async fn test_dropped_run_re_enables() {
        let trigger = simulated(10_000);
        let click = trigger.click();
        let timed_out = tokio::time::timeout(Duration::from_millis(20), click).await;
        assert!(timed_out.is_err());

        let state = trigger.state();
        assert!(state.enabled);
        assert!(!state.in_progress);
        assert_eq!(state.last_result.unwrap().message, INTERRUPTED_MESSAGE);
    }

    #[tokio::test]
    async fn test_subscribers_see_progress() {
        let trigger = simulated(200);
        let mut rx = trigger.subscribe();

        let handle = trigger.spawn_click().unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().in_progress);

        handle.await.unwrap();
        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert!(state.enabled);
        assert!(!state.in_progress);
    }
}
