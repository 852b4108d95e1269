//! Event — an immutable record of something that happened.
//!
//! Events are published on the in-process bus when the automation snapshot
//! is saved and as runs start and finish.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{AutomationId, EventId, RunId};
use crate::run::RunOutcome;
use crate::time::{Timestamp, now};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    AutomationsSaved,
    RunStarted,
    RunCompleted,
    RunStopped,
    RunFailed,
}

impl EventType {
    /// Whether the event belongs to a run's lifecycle.
    #[must_use]
    pub fn is_run_event(self) -> bool {
        !matches!(self, Self::AutomationsSaved)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AutomationsSaved => "automations_saved",
            Self::RunStarted => "run_started",
            Self::RunCompleted => "run_completed",
            Self::RunStopped => "run_stopped",
            Self::RunFailed => "run_failed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<AutomationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    #[must_use]
    pub fn new(event_type: EventType, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            automation_id: None,
            run_id: None,
            data,
            timestamp: now(),
        }
    }

    /// `automations_saved` carrying the number of automations in the snapshot.
    #[must_use]
    pub fn automations_saved(count: usize) -> Self {
        Self::new(
            EventType::AutomationsSaved,
            serde_json::json!({ "count": count }),
        )
    }

    /// `run_started` for a run triggered by `trigger` (a display string of the
    /// device event).
    #[must_use]
    pub fn run_started(automation_id: AutomationId, run_id: RunId, trigger: &str) -> Self {
        Self {
            automation_id: Some(automation_id),
            run_id: Some(run_id),
            ..Self::new(
                EventType::RunStarted,
                serde_json::json!({ "trigger": trigger }),
            )
        }
    }

    /// Terminal event matching `outcome`.
    #[must_use]
    pub fn run_finished(automation_id: AutomationId, run_id: RunId, outcome: &RunOutcome) -> Self {
        let event_type = match outcome {
            RunOutcome::Completed => EventType::RunCompleted,
            RunOutcome::StoppedByCondition { .. } => EventType::RunStopped,
            RunOutcome::Failed { .. } => EventType::RunFailed,
        };
        let data = serde_json::to_value(outcome).unwrap_or(serde_json::Value::Null);
        Self {
            automation_id: Some(automation_id),
            run_id: Some(run_id),
            ..Self::new(event_type, data)
        }
    }
}
