//! Countdown-gated, exactly-once verification dispatch.
//!
//! # Cycle
//!
//! A submit spawns one abortable task that owns both the countdown and the
//! network call. The task reports progress over a channel; the dispatcher
//! applies those events to [`SubmissionState`] only when [`DelayedDispatcher::poll`]
//! drains them on the UI loop.
//!
//! ```text
//! Idle --start--> CountingDown(20) --tick--> ... --> CountingDown(0)
//!      --> Dispatching --completed--> Succeeded | Failed(reason)
//! ```
//!
//! The task handle and the receiver live together in one `ActiveCycle`. Dropping
//! it (settle, or dropping the dispatcher) aborts the task and closes
//! the channel in one step, so nothing produced afterwards is ever observed.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use keygate_client::{TransportError, VerificationClient, VerificationResponse};
use keygate_types::{COUNTDOWN_SECS, Credential, CredentialKind, SubmissionState};

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum CycleEvent {
    Tick { remaining: u32 },
    Dispatching,
    Completed(Result<VerificationResponse, TransportError>),
}

/// The live countdown + dispatch pair for one submission.
#[derive(Debug)]
struct ActiveCycle {
    kind: CredentialKind,
    events: mpsc::UnboundedReceiver<CycleEvent>,
    abort_handle: AbortHandle,
}

impl Drop for ActiveCycle {
    fn drop(&mut self) {
        self.abort_handle.abort();
        self.events.close();
    }
}

/// Result of asking the dispatcher to start a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A fresh countdown began.
    Started,
    /// A cycle is already live; nothing was scheduled.
    Busy,
}

/// How a completed cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Succeeded(VerificationResponse),
    Failed(TransportError),
}

/// Owns the submission state and the single in-flight cycle of one flow.
pub struct DelayedDispatcher {
    client: Arc<dyn VerificationClient>,
    countdown_secs: u32,
    state: SubmissionState,
    cycle: Option<ActiveCycle>,
}

impl std::fmt::Debug for DelayedDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayedDispatcher")
            .field("countdown_secs", &self.countdown_secs)
            .field("state", &self.state)
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl DelayedDispatcher {
    #[must_use]
    pub fn new(client: Arc<dyn VerificationClient>) -> Self {
        Self {
            client,
            countdown_secs: COUNTDOWN_SECS,
            state: SubmissionState::Idle,
            cycle: None,
        }
    }

    /// Override the countdown window. Intended for tests and demos.
    pub fn with_countdown_secs(mut self, secs: u32) -> Self {
        self.countdown_secs = secs;
        self
    }

    #[must_use]
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    #[must_use]
    pub fn countdown_secs(&self) -> u32 {
        self.countdown_secs
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Begin a countdown for `credential`.
    ///
    /// Must be called from within a tokio runtime. A no-op while a cycle is live.
    pub fn start(&mut self, credential: Credential) -> SubmitOutcome {
        if self.is_busy() {
            tracing::debug!(kind = %credential.kind(), "Submit ignored; cycle already live");
            return SubmitOutcome::Busy;
        }

        let kind = credential.kind();
        let (tx, rx) = mpsc::unbounded_channel();
        let (abort_handle, abort_registration) = AbortHandle::new_pair();

        self.cycle = Some(ActiveCycle {
            kind,
            events: rx,
            abort_handle,
        });
        self.state = SubmissionState::CountingDown {
            remaining: self.countdown_secs,
        };

        let task = run_cycle(
            Arc::clone(&self.client),
            credential,
            self.countdown_secs,
            tx,
        );
        tokio::spawn(async move {
            let _ = Abortable::new(task, abort_registration).await;
        });

        tracing::info!(%kind, countdown_secs = self.countdown_secs, "Verification countdown started");
        SubmitOutcome::Started
    }

    /// Apply pending cycle events. Returns the resolution once, when the
    /// cycle's request completes.
    pub fn poll(&mut self) -> Option<Resolution> {
        loop {
            let cycle = self.cycle.as_mut()?;
            let event = match cycle.events.try_recv() {
                Ok(event) => event,
                Err(mpsc::error::TryRecvError::Empty) => return None,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    tracing::warn!(kind = %cycle.kind, "Verification cycle ended without a result");
                    let err = TransportError::Request("verification task ended unexpectedly".to_string());
                    return Some(self.settle(Err(err)));
                }
            };

            match event {
                CycleEvent::Tick { remaining } => {
                    self.state = SubmissionState::CountingDown { remaining };
                }
                CycleEvent::Dispatching => {
                    self.state = SubmissionState::Dispatching;
                }
                CycleEvent::Completed(result) => return Some(self.settle(result)),
            }
        }
    }

    /// Return a settled dispatcher to `Idle`. No effect while busy.
    pub fn reset(&mut self) {
        if self.state.is_settled() {
            self.state = SubmissionState::Idle;
        }
    }

    fn settle(&mut self, result: Result<VerificationResponse, TransportError>) -> Resolution {
        self.cycle = None;
        match result {
            Ok(response) => {
                self.state = SubmissionState::Succeeded;
                Resolution::Succeeded(response)
            }
            Err(err) => {
                self.state = SubmissionState::Failed {
                    reason: err.to_string(),
                };
                Resolution::Failed(err)
            }
        }
    }
}

async fn run_cycle(
    client: Arc<dyn VerificationClient>,
    credential: Credential,
    countdown_secs: u32,
    tx: mpsc::UnboundedSender<CycleEvent>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    for remaining in (0..countdown_secs).rev() {
        ticker.tick().await;
        if tx.send(CycleEvent::Tick { remaining }).is_err() {
            return;
        }
    }

    if tx.send(CycleEvent::Dispatching).is_err() {
        return;
    }
    let result = client.submit(credential).await;
    let _ = tx.send(CycleEvent::Completed(result));
}
