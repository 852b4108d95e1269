//! Catalog of action kinds.

use serde::Serialize;
use serde_json::Value;

use super::param::{
    self, ConfigMap, ParamDef, ValidationMode, json_value, present, value_as_number,
    value_as_text,
};
use crate::automation::ActionKind;
use crate::error::{FieldError, FieldErrorReason, NotFoundError};
use crate::variables;

/// Static description of one action kind.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ActionDef {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub name: &'static str,
    pub description: &'static str,
    /// Only meaningful when a PC agent is attached.
    pub pc_only: bool,
    pub params: &'static [ParamDef],
}

pub const STOP_IF_CONDITIONS: &[&str] = &["==", "!=", ">", "<", ">=", "<="];
pub const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE"];

/// Every action kind, in editor order.
pub static ACTION_DEFINITIONS: [ActionDef; 11] = [
    ActionDef {
        kind: ActionKind::SimulateKeyPress,
        name: "Simulate key press",
        description: "Send a key press to the connected PC",
        pc_only: true,
        params: &[
            ParamDef::text("key", "Key")
                .required()
                .placeholder("e.g., F13, ENTER"),
            ParamDef::number("duration", "Duration (ms)")
                .at_least(0.0)
                .placeholder("Optional: how long to press"),
        ],
    },
    ActionDef {
        kind: ActionKind::SimulateMouseMove,
        name: "Simulate mouse movement",
        description: "Move mouse cursor on PC",
        pc_only: true,
        params: &[
            ParamDef::number("x", "X position").required(),
            ParamDef::number("y", "Y position").required(),
        ],
    },
    ActionDef {
        kind: ActionKind::SimulateGamepad,
        name: "Simulate gamepad",
        description: "Send gamepad input to PC",
        pc_only: true,
        params: &[
            ParamDef::text("button", "Button")
                .required()
                .placeholder("Button ID"),
            ParamDef::number("value", "Value").required().range(0.0, 1.0),
        ],
    },
    ActionDef {
        kind: ActionKind::ExecuteCommand,
        name: "Execute command",
        description: "Execute a shell command on PC",
        pc_only: true,
        params: &[ParamDef::text("command", "Command")
            .required()
            .placeholder("e.g., poweroff")],
    },
    ActionDef {
        kind: ActionKind::WebRequest,
        name: "Send web request",
        description: "Make HTTP request to a URL",
        pc_only: false,
        params: &[
            ParamDef::url("url", "URL")
                .required()
                .placeholder("https://example.com/hook"),
            ParamDef::select("method", "Method", HTTP_METHODS).default_value("GET"),
            ParamDef::json("headers", "Headers")
                .placeholder("{\"Content-Type\": \"application/json\"}"),
            ParamDef::text("body", "Body").placeholder("Request body"),
        ],
    },
    ActionDef {
        kind: ActionKind::AddCalendarEvent,
        name: "Add calendar event",
        description: "Create calendar event",
        pc_only: false,
        params: &[
            ParamDef::number("time_from_now", "Time from now (min)")
                .required()
                .at_least(0.0),
            ParamDef::text("title", "Title").required(),
            ParamDef::text("description", "Description"),
        ],
    },
    ActionDef {
        kind: ActionKind::WaitForTime,
        name: "Wait",
        description: "Wait a specific amount of time",
        pc_only: false,
        params: &[
            ParamDef::number("minutes", "Minutes")
                .required()
                .at_least(0.0)
                .default_value("0"),
            ParamDef::number("seconds", "Seconds")
                .required()
                .at_least(0.0)
                .default_value("0"),
            ParamDef::number("milliseconds", "Milliseconds")
                .required()
                .at_least(0.0)
                .default_value("0"),
        ],
    },
    ActionDef {
        kind: ActionKind::SetVariable,
        name: "Set variable",
        description: "Set variable to value",
        pc_only: false,
        params: &[
            ParamDef::text("variable", "Variable name").required(),
            ParamDef::text("value", "Value").required(),
        ],
    },
    ActionDef {
        kind: ActionKind::MapVariable,
        name: "Map variable",
        description: "Map variable value to items in list",
        pc_only: false,
        params: &[
            ParamDef::text("variable_in", "Input variable").required(),
            ParamDef::text("variable_out", "Output variable").required(),
            ParamDef::number("min", "Minimum").required().default_value("0"),
            ParamDef::number("max", "Maximum").required().default_value("100"),
            ParamDef::json("mappings", "Mappings")
                .required()
                .default_value("[]")
                .placeholder("[{\"from\": 0, \"to\": \"low\"}, {\"from\": 100, \"to\": \"high\"}]"),
        ],
    },
    ActionDef {
        kind: ActionKind::StopIf,
        name: "Stop if condition met",
        description: "Stop automation if condition is true",
        pc_only: false,
        params: &[
            ParamDef::text("variable1", "First variable").required(),
            ParamDef::select("condition", "Condition", STOP_IF_CONDITIONS).required(),
            ParamDef::text("variable2", "Second variable/value").required(),
            ParamDef::checkbox("invert", "Invert condition"),
        ],
    },
    ActionDef {
        kind: ActionKind::FormatText,
        name: "Format text variable",
        description: "Format text with variable replacements",
        pc_only: false,
        params: &[
            ParamDef::text("output_variable", "Output variable").required(),
            ParamDef::text("format", "Format string")
                .required()
                .placeholder("Hello {name}, time is {time}"),
            ParamDef::json("replacements", "Replacements")
                .required()
                .default_value("[]")
                .placeholder("[{\"from\": \"{name}\", \"to\": \"user\"}]"),
        ],
    },
];

/// Definition of a known action kind.
#[must_use]
pub fn definition(kind: ActionKind) -> &'static ActionDef {
    // ACTION_DEFINITIONS follows the declaration order of ActionKind.
    &ACTION_DEFINITIONS[kind as usize]
}

/// Look up an action definition by its wire name.
///
/// # Errors
///
/// Returns [`NotFoundError`] when no action kind has that name.
pub fn get_definition(action_type: &str) -> Result<&'static ActionDef, NotFoundError> {
    ACTION_DEFINITIONS
        .iter()
        .find(|def| def.kind.as_str() == action_type)
        .ok_or_else(|| NotFoundError {
            entity: "ActionKind",
            id: action_type.to_string(),
        })
}

/// Strictly validate a fully-resolved config.
///
/// # Errors
///
/// Returns every field error found.
pub fn validate_config(kind: ActionKind, config: &ConfigMap) -> Result<(), Vec<FieldError>> {
    validate_with(kind, config, ValidationMode::Strict)
}

/// Validate a config as stored in the editor, deferring checks on values
/// that reference variables.
///
/// # Errors
///
/// Returns every field error found.
pub fn validate_template(kind: ActionKind, config: &ConfigMap) -> Result<(), Vec<FieldError>> {
    validate_with(kind, config, ValidationMode::DeferReferences)
}

fn validate_with(
    kind: ActionKind,
    config: &ConfigMap,
    mode: ValidationMode,
) -> Result<(), Vec<FieldError>> {
    let mut errors = param::validate_params(definition(kind).params, config, mode);
    match kind {
        ActionKind::MapVariable => check_map_variable(config, &mut errors),
        ActionKind::FormatText => check_pairs(config, "replacements", &mut errors, |item| {
            item.get("from").and_then(value_as_text).is_some_and(|f| !f.is_empty())
                && item.get("to").and_then(value_as_text).is_some()
        }),
        ActionKind::WebRequest => check_headers(config, &mut errors),
        _ => {}
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn has_error(errors: &[FieldError], field: &str) -> bool {
    errors.iter().any(|e| e.field == field)
}

fn check_map_variable(config: &ConfigMap, errors: &mut Vec<FieldError>) {
    if !has_error(errors, "min") && !has_error(errors, "max") {
        let min = present(config, "min").and_then(value_as_number);
        let max = present(config, "max").and_then(value_as_number);
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            errors.push(FieldError::new(
                "min",
                FieldErrorReason::Malformed {
                    detail: format!("min ({min}) is greater than max ({max})"),
                },
            ));
        }
    }
    check_pairs(config, "mappings", errors, |item| {
        item.get("from").and_then(value_as_number).is_some()
            && item.get("to").and_then(value_as_text).is_some()
    });
}

/// Check that a json field holds a list of `{from, to}` objects.
fn check_pairs(
    config: &ConfigMap,
    field: &'static str,
    errors: &mut Vec<FieldError>,
    item_is_valid: impl Fn(&serde_json::Map<String, Value>) -> bool,
) {
    if has_error(errors, field) {
        return;
    }
    let Some(raw) = present(config, field) else {
        return;
    };
    if raw.as_str().is_some_and(variables::has_reference) {
        return;
    }
    let Some(parsed) = json_value(raw) else {
        return;
    };
    let valid = match &parsed {
        Value::Array(items) => items
            .iter()
            .all(|item| item.as_object().is_some_and(&item_is_valid)),
        _ => false,
    };
    if !valid {
        errors.push(FieldError::new(
            field,
            FieldErrorReason::Malformed {
                detail: "expected a list of {from, to} entries".to_string(),
            },
        ));
    }
}

fn check_headers(config: &ConfigMap, errors: &mut Vec<FieldError>) {
    if has_error(errors, "headers") {
        return;
    }
    let Some(raw) = present(config, "headers") else {
        return;
    };
    if raw.as_str().is_some_and(variables::has_reference) {
        return;
    }
    if json_value(raw).is_some_and(|v| !v.is_object()) {
        errors.push(FieldError::new(
            "headers",
            FieldErrorReason::Malformed {
                detail: "expected a JSON object".to_string(),
            },
        ));
    }
}

/// Build the initial config of a new action from the declared defaults.
#[must_use]
pub fn default_config(kind: ActionKind) -> ConfigMap {
    let mut config = ConfigMap::new();
    for param in definition(kind).params {
        let value = match (param.kind, param.default) {
            (param::ParamType::Number, Some(default)) => {
                param::parse_number(default).map_or(Value::Null, param::number_value)
            }
            (param::ParamType::Json, Some(default)) => {
                serde_json::from_str(default).unwrap_or(Value::Null)
            }
            (param::ParamType::Checkbox, _) => Value::Bool(false),
            (_, Some(default)) => Value::String(default.to_string()),
            (_, None) => Value::String(String::new()),
        };
        config.insert(param.id.to_string(), value);
    }
    config
}
