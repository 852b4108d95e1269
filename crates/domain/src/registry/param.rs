//! Typed parameter schema shared by the action and trigger registries.

use serde::Serialize;
use serde_json::Value;

use crate::error::{FieldError, FieldErrorReason};
use crate::variables;

/// Raw config of a trigger or action as stored: parameter id → JSON value.
pub type ConfigMap = serde_json::Map<String, Value>;

/// The declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Text,
    Number,
    Url,
    Json,
    Select,
    Checkbox,
}

/// One entry of a parameter schema.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParamDef {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub options: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

impl ParamDef {
    const fn new(id: &'static str, name: &'static str, kind: ParamType) -> Self {
        Self {
            id,
            name,
            kind,
            required: false,
            min: None,
            max: None,
            options: &[],
            default: None,
            placeholder: None,
        }
    }

    pub(crate) const fn text(id: &'static str, name: &'static str) -> Self {
        Self::new(id, name, ParamType::Text)
    }

    pub(crate) const fn number(id: &'static str, name: &'static str) -> Self {
        Self::new(id, name, ParamType::Number)
    }

    pub(crate) const fn url(id: &'static str, name: &'static str) -> Self {
        Self::new(id, name, ParamType::Url)
    }

    pub(crate) const fn json(id: &'static str, name: &'static str) -> Self {
        Self::new(id, name, ParamType::Json)
    }

    pub(crate) const fn select(
        id: &'static str,
        name: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        let mut def = Self::new(id, name, ParamType::Select);
        def.options = options;
        def
    }

    pub(crate) const fn checkbox(id: &'static str, name: &'static str) -> Self {
        Self::new(id, name, ParamType::Checkbox)
    }

    pub(crate) const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub(crate) const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub(crate) const fn at_least(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub(crate) const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub(crate) const fn placeholder(mut self, text: &'static str) -> Self {
        self.placeholder = Some(text);
        self
    }
}

/// How strictly string values are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every value must satisfy its declared type (run time, after interpolation).
    Strict,
    /// String values that reference a `{variable}` are only checked for presence
    /// (edit time, before the values are known).
    DeferReferences,
}

/// Validate `config` against `params`, collecting every field error.
#[must_use]
pub fn validate_params(
    params: &[ParamDef],
    config: &ConfigMap,
    mode: ValidationMode,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for param in params {
        let Some(value) = present(config, param.id) else {
            if param.required {
                errors.push(FieldError::new(param.id, FieldErrorReason::Missing));
            }
            continue;
        };
        if mode == ValidationMode::DeferReferences
            && value.as_str().is_some_and(variables::has_reference)
        {
            continue;
        }
        if let Some(reason) = check_value(param, value) {
            errors.push(FieldError::new(param.id, reason));
        }
    }
    errors
}

fn check_value(param: &ParamDef, value: &Value) -> Option<FieldErrorReason> {
    match param.kind {
        ParamType::Text => value_as_text(value).is_none().then(|| FieldErrorReason::Malformed {
            detail: "expected text".to_string(),
        }),
        ParamType::Number => {
            let Some(number) = value_as_number(value) else {
                return Some(FieldErrorReason::NotANumber);
            };
            if let Some(min) = param.min
                && number < min
            {
                return Some(FieldErrorReason::BelowMin { min });
            }
            if let Some(max) = param.max
                && number > max
            {
                return Some(FieldErrorReason::AboveMax { max });
            }
            None
        }
        ParamType::Url => match value.as_str() {
            Some(url) if is_http_url(url) => None,
            _ => Some(FieldErrorReason::InvalidUrl),
        },
        ParamType::Json => json_value(value)
            .is_none()
            .then_some(FieldErrorReason::InvalidJson),
        ParamType::Select => {
            let text = value_as_text(value).unwrap_or_default();
            if param.options.contains(&text.as_str()) {
                None
            } else {
                Some(FieldErrorReason::NotAnOption {
                    options: param.options.iter().map(ToString::to_string).collect(),
                })
            }
        }
        ParamType::Checkbox => value_as_bool(value)
            .is_none()
            .then_some(FieldErrorReason::NotABoolean),
    }
}

/// Return the value of `key` unless it is absent, `null` or a blank string.
#[must_use]
pub fn present<'a>(config: &'a ConfigMap, key: &str) -> Option<&'a Value> {
    match config.get(key)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        other => Some(other),
    }
}

/// Textual form of a scalar value; `None` for arrays, objects and `null`.
#[must_use]
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n.as_f64().map(format_number),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Numeric form of a JSON number or numeric string.
#[must_use]
pub fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Parse a finite number, tolerating surrounding whitespace.
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Boolean form of a JSON bool or `"true"`/`"false"` string.
#[must_use]
pub fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" | "on" => Some(true),
            "false" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// JSON payload of a json-typed value: structured values as-is, strings parsed.
#[must_use]
pub fn json_value(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => serde_json::from_str(s).ok(),
        other => Some(other.clone()),
    }
}

/// Format a number without a trailing `.0` when it is integral.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

/// JSON form of a number, integral values as integers.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        Value::from(number as i64)
    } else {
        serde_json::Number::from_f64(number).map_or(Value::Null, Value::Number)
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    rest.is_some_and(|rest| {
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        !host.is_empty() && !host.contains(char::is_whitespace)
    })
}
