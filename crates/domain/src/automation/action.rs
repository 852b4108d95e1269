//! Action — one step of an automation's effect sequence.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NotFoundError, ValidationError};
use crate::id::ActionId;
use crate::registry::{ActionDef, ConfigMap, actions};

/// Kind of effect an action has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SimulateKeyPress,
    SimulateMouseMove,
    SimulateGamepad,
    ExecuteCommand,
    WebRequest,
    AddCalendarEvent,
    WaitForTime,
    SetVariable,
    MapVariable,
    StopIf,
    FormatText,
}

impl ActionKind {
    pub const ALL: [Self; 11] = [
        Self::SimulateKeyPress,
        Self::SimulateMouseMove,
        Self::SimulateGamepad,
        Self::ExecuteCommand,
        Self::WebRequest,
        Self::AddCalendarEvent,
        Self::WaitForTime,
        Self::SetVariable,
        Self::MapVariable,
        Self::StopIf,
        Self::FormatText,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SimulateKeyPress => "simulate_key_press",
            Self::SimulateMouseMove => "simulate_mouse_move",
            Self::SimulateGamepad => "simulate_gamepad",
            Self::ExecuteCommand => "execute_command",
            Self::WebRequest => "web_request",
            Self::AddCalendarEvent => "add_calendar_event",
            Self::WaitForTime => "wait_for_time",
            Self::SetVariable => "set_variable",
            Self::MapVariable => "map_variable",
            Self::StopIf => "stop_if",
            Self::FormatText => "format_text",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = NotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        actions::get_definition(s).map(|def| def.kind)
    }
}

/// One configured step of an automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default)]
    pub id: ActionId,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default)]
    pub config: ConfigMap,
}

impl Action {
    #[must_use]
    pub fn new(kind: ActionKind, config: ConfigMap) -> Self {
        Self {
            id: ActionId::new(),
            kind,
            config,
        }
    }

    /// A new action whose config holds the declared parameter defaults.
    #[must_use]
    pub fn with_defaults(kind: ActionKind) -> Self {
        Self::new(kind, actions::default_config(kind))
    }

    #[must_use]
    pub fn definition(&self) -> &'static ActionDef {
        actions::definition(self.kind)
    }

    /// Edit-time validation; `index` is the zero-based position in the
    /// automation and is reported one-based.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConfig`] listing every bad field.
    pub fn validate(&self, index: usize) -> Result<(), ValidationError> {
        actions::validate_template(self.kind, &self.config)
            .map_err(|errors| invalid_config(index, self.kind, errors))
    }
}

pub(crate) fn invalid_config(
    index: usize,
    kind: ActionKind,
    errors: Vec<crate::error::FieldError>,
) -> ValidationError {
    ValidationError::InvalidConfig {
        subject: format!("action #{} {kind}", index + 1),
        errors,
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_create_action_with_declared_defaults() {
        let action = Action::with_defaults(ActionKind::WaitForTime);
        assert_eq!(
            serde_json::Value::Object(action.config),
            json!({"minutes": 0, "seconds": 0, "milliseconds": 0})
        );
    }

    #[test]
    fn should_roundtrip_kind_names() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                json!(kind.as_str())
            );
        }
    }

    #[test]
    fn should_generate_id_when_missing() {
        let action: Action =
            serde_json::from_value(json!({"type": "set_variable", "config": {}})).unwrap();
        assert_eq!(action.kind, ActionKind::SetVariable);
        assert!(action.validate(0).is_err());
    }

    #[test]
    fn should_reject_unknown_kind() {
        let result: Result<Action, _> =
            serde_json::from_value(json!({"type": "teleport", "config": {}}));
        assert!(result.is_err());
    }
}
