//! Run — one execution of an automation's action sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{AutomationId, RunId};
use crate::time::{Timestamp, now};

/// Lifecycle of a run.
///
/// `Idle → Triggered → Running → {Completed, StoppedByCondition, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Triggered,
    Running,
    Completed,
    StoppedByCondition,
    Failed,
}

impl RunState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::StoppedByCondition | Self::Failed
        )
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Triggered)
                | (Self::Triggered, Self::Running | Self::Failed)
                | (
                    Self::Running,
                    Self::Completed | Self::StoppedByCondition | Self::Failed
                )
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Triggered => "triggered",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::StoppedByCondition => "stopped_by_condition",
            Self::Failed => "failed",
        })
    }
}

/// Illegal state change requested on a [`Run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move run from {from} to {to}")]
pub struct InvalidTransition {
    pub from: RunState,
    pub to: RunState,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    /// A `stop_if` at `action_index` (zero-based) held.
    StoppedByCondition { action_index: usize },
    /// The action at `action_index` (zero-based) failed.
    Failed { action_index: usize, reason: String },
}

impl RunOutcome {
    /// Reason recorded when a suspended run is cancelled.
    pub const CANCELLED: &'static str = "cancelled";

    #[must_use]
    pub fn state(&self) -> RunState {
        match self {
            Self::Completed => RunState::Completed,
            Self::StoppedByCondition { .. } => RunState::StoppedByCondition,
            Self::Failed { .. } => RunState::Failed,
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Failed { reason, .. } if reason == Self::CANCELLED)
    }
}

/// Bookkeeping of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    pub id: RunId,
    pub automation_id: AutomationId,
    pub started_at: Timestamp,
    state: RunState,
}

impl Run {
    /// A run whose trigger has just matched.
    #[must_use]
    pub fn triggered(automation_id: AutomationId) -> Self {
        Self {
            id: RunId::new(),
            automation_id,
            started_at: now(),
            state: RunState::Triggered,
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when the state machine forbids the move.
    pub fn advance(&mut self, next: RunState) -> Result<(), InvalidTransition> {
        if !self.state.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}
