//! Submission state of a single flow.

/// Seconds a validated credential waits before it is sent.
pub const COUNTDOWN_SECS: u32 = 20;

/// Where a flow's current submission cycle stands.
///
/// `Succeeded` and `Failed` are settled: they accept a fresh submit just like
/// `Idle` does, and they only differ in what the status line reports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    /// The countdown window is running; `remaining` reaches 0 before dispatch.
    CountingDown { remaining: u32 },
    /// The single verification request is in flight.
    Dispatching,
    Succeeded,
    Failed { reason: String },
}

impl SubmissionState {
    /// True while a cycle is live and the submit control must stay disabled.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SubmissionState::CountingDown { .. } | SubmissionState::Dispatching
        )
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded | SubmissionState::Failed { .. }
        )
    }

    /// Seconds left on the visible countdown; 0 outside `CountingDown`.
    #[must_use]
    pub fn remaining_secs(&self) -> u32 {
        match self {
            SubmissionState::CountingDown { remaining } => *remaining,
            _ => 0,
        }
    }

    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// Label for the submit control.
    ///
    /// `idle_label` is shown whenever the control is enabled.
    #[must_use]
    pub fn submit_label(&self, idle_label: &str) -> String {
        match self {
            SubmissionState::CountingDown { remaining } if *remaining > 0 => {
                format!("Please wait... {remaining}s")
            }
            SubmissionState::CountingDown { .. } | SubmissionState::Dispatching => {
                "Processing...".to_string()
            }
            SubmissionState::Idle | SubmissionState::Succeeded | SubmissionState::Failed { .. } => {
                idle_label.to_string()
            }
        }
    }
}
