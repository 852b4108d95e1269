//! Typed form of a resolved action config.
//!
//! The executor never reads raw configs: each action's config is resolved,
//! strictly validated and parsed into an [`ActionCommand`] first.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde_json::Value;

use super::action::{ActionKind, invalid_config};
use crate::error::ValidationError;
use crate::registry::actions;
use crate::registry::param::{
    ConfigMap, format_number, json_value, parse_number, present, value_as_bool, value_as_number,
    value_as_text,
};

/// Largest absolute mouse coordinate the PC agent accepts.
pub const MOUSE_COORDINATE_MAX: u16 = u16::MAX;

/// A fully-resolved, validated action ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionCommand {
    SimulateKeyPress {
        key: String,
        duration: Option<Duration>,
    },
    SimulateMouseMove {
        x: u16,
        y: u16,
    },
    SimulateGamepad {
        button: String,
        value: f64,
    },
    ExecuteCommand {
        command: String,
    },
    WebRequest(WebRequest),
    AddCalendarEvent {
        offset: Duration,
        title: String,
        description: Option<String>,
    },
    WaitForTime {
        duration: Duration,
    },
    SetVariable {
        variable: String,
        value: String,
    },
    MapVariable(MapVariable),
    StopIf(StopIf),
    FormatText(FormatText),
}

impl ActionCommand {
    /// Validate a resolved config strictly and convert it.
    ///
    /// `index` is the zero-based position of the action, used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConfig`] when the config does not
    /// satisfy the kind's schema.
    pub fn parse(index: usize, kind: ActionKind, config: &ConfigMap) -> Result<Self, ValidationError> {
        actions::validate_config(kind, config).map_err(|errors| invalid_config(index, kind, errors))?;
        let fields = Fields(config);
        let command = match kind {
            ActionKind::SimulateKeyPress => Self::SimulateKeyPress {
                key: fields.text("key"),
                duration: fields.number("duration").map(millis),
            },
            ActionKind::SimulateMouseMove => Self::SimulateMouseMove {
                x: clamp_coordinate(fields.number_or_zero("x")),
                y: clamp_coordinate(fields.number_or_zero("y")),
            },
            ActionKind::SimulateGamepad => Self::SimulateGamepad {
                button: fields.text("button"),
                value: fields.number_or_zero("value"),
            },
            ActionKind::ExecuteCommand => Self::ExecuteCommand {
                command: fields.text("command"),
            },
            ActionKind::WebRequest => Self::WebRequest(WebRequest::from_fields(&fields)),
            ActionKind::AddCalendarEvent => {
                let title = fields.text("title").trim().to_string();
                Self::AddCalendarEvent {
                    offset: millis(fields.number_or_zero("time_from_now") * 60_000.0),
                    title,
                    description: fields.optional_text("description"),
                }
            }
            ActionKind::WaitForTime => Self::WaitForTime {
                duration: millis(
                    fields.number_or_zero("minutes") * 60_000.0
                        + fields.number_or_zero("seconds") * 1_000.0
                        + fields.number_or_zero("milliseconds"),
                ),
            },
            ActionKind::SetVariable => Self::SetVariable {
                variable: fields.text("variable").trim().to_string(),
                value: fields.text("value"),
            },
            ActionKind::MapVariable => Self::MapVariable(MapVariable {
                variable_in: fields.text("variable_in"),
                variable_out: fields.text("variable_out").trim().to_string(),
                min: fields.number_or_zero("min"),
                max: fields.number_or_zero("max"),
                mappings: fields
                    .pairs("mappings")
                    .into_iter()
                    .filter_map(|(from, to)| Some(Mapping { from: value_as_number(&from)?, to }))
                    .collect(),
            }),
            ActionKind::StopIf => Self::StopIf(StopIf {
                variable1: fields.text("variable1"),
                condition: fields
                    .text("condition")
                    .parse()
                    .map_err(|_| invalid_config(index, kind, Vec::new()))?,
                variable2: fields.text("variable2"),
                invert: fields.flag("invert"),
            }),
            ActionKind::FormatText => Self::FormatText(FormatText {
                output_variable: fields.text("output_variable").trim().to_string(),
                format: fields.text("format"),
                replacements: fields
                    .pairs("replacements")
                    .into_iter()
                    .filter_map(|(from, to)| Some(Replacement { from: value_as_text(&from)?, to }))
                    .collect(),
            }),
        };
        Ok(command)
    }

    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::SimulateKeyPress { .. } => ActionKind::SimulateKeyPress,
            Self::SimulateMouseMove { .. } => ActionKind::SimulateMouseMove,
            Self::SimulateGamepad { .. } => ActionKind::SimulateGamepad,
            Self::ExecuteCommand { .. } => ActionKind::ExecuteCommand,
            Self::WebRequest(_) => ActionKind::WebRequest,
            Self::AddCalendarEvent { .. } => ActionKind::AddCalendarEvent,
            Self::WaitForTime { .. } => ActionKind::WaitForTime,
            Self::SetVariable { .. } => ActionKind::SetVariable,
            Self::MapVariable(_) => ActionKind::MapVariable,
            Self::StopIf(_) => ActionKind::StopIf,
            Self::FormatText(_) => ActionKind::FormatText,
        }
    }
}

struct Fields<'a>(&'a ConfigMap);

impl Fields<'_> {
    fn text(&self, key: &str) -> String {
        self.optional_text(key).unwrap_or_default()
    }

    fn optional_text(&self, key: &str) -> Option<String> {
        present(self.0, key).and_then(value_as_text)
    }

    fn number(&self, key: &str) -> Option<f64> {
        present(self.0, key).and_then(value_as_number)
    }

    fn number_or_zero(&self, key: &str) -> f64 {
        self.number(key).unwrap_or_default()
    }

    fn flag(&self, key: &str) -> bool {
        present(self.0, key)
            .and_then(value_as_bool)
            .unwrap_or_default()
    }

    /// Entries of a json list of `{from, to}` objects, `to` as text.
    fn pairs(&self, key: &str) -> Vec<(Value, String)> {
        let Some(Value::Array(items)) = present(self.0, key).and_then(json_value) else {
            return Vec::new();
        };
        items
            .into_iter()
            .filter_map(|item| {
                let from = item.get("from")?.clone();
                let to = item.get("to").and_then(value_as_text)?;
                Some((from, to))
            })
            .collect()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn millis(ms: f64) -> Duration {
    Duration::from_millis(ms.max(0.0).round() as u64)
}

/// Clamp a raw coordinate into the range the PC agent accepts.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_coordinate(raw: f64) -> u16 {
    raw.round().clamp(0.0, f64::from(MOUSE_COORDINATE_MAX)) as u16
}

/// HTTP verb of a `web_request` action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(()),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outbound HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl WebRequest {
    fn from_fields(fields: &Fields<'_>) -> Self {
        let headers = match present(fields.0, "headers").and_then(json_value) {
            Some(Value::Object(map)) => map
                .into_iter()
                .filter_map(|(name, value)| Some((name, value_as_text(&value)?)))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            method: fields
                .optional_text("method")
                .and_then(|m| m.parse().ok())
                .unwrap_or_default(),
            url: fields.text("url").trim().to_string(),
            headers,
            body: fields.optional_text("body"),
        }
    }
}

/// One `from → to` entry of a `map_variable` action.
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    pub from: f64,
    pub to: String,
}

/// Map a numeric input onto a list of labelled points.
#[derive(Debug, Clone, PartialEq)]
pub struct MapVariable {
    /// Variable name or literal holding the input value.
    pub variable_in: String,
    pub variable_out: String,
    pub min: f64,
    pub max: f64,
    pub mappings: Vec<Mapping>,
}

impl MapVariable {
    /// Map `input` to its output value.
    ///
    /// Non-numeric input counts as `0`. The value is clamped to
    /// `[min, max]`; an exact `from` wins, otherwise the in-range mapping
    /// nearest to the value (lower `from` on ties). With no in-range
    /// mapping the clamped number itself is returned.
    #[must_use]
    pub fn apply(&self, input: &str) -> String {
        let value = parse_number(input)
            .unwrap_or_default()
            .max(self.min)
            .min(self.max);
        if let Some(exact) = self.mappings.iter().find(|m| m.from == value) {
            return exact.to.clone();
        }
        self.mappings
            .iter()
            .filter(|m| (self.min..=self.max).contains(&m.from))
            .min_by(|a, b| {
                let da = (a.from - value).abs();
                let db = (b.from - value).abs();
                da.total_cmp(&db).then(a.from.total_cmp(&b.from))
            })
            .map_or_else(|| format_number(value), |m| m.to.clone())
    }
}

/// Comparison operator of a `stop_if` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Comparison {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        }
    }

    /// Compare two operands, numerically when both parse as numbers.
    ///
    /// Otherwise `==`/`!=` compare the strings and ordering operators are
    /// false.
    #[must_use]
    pub fn evaluate(self, lhs: &str, rhs: &str) -> bool {
        if let (Some(a), Some(b)) = (parse_number(lhs), parse_number(rhs)) {
            let ordering = a.total_cmp(&b);
            return match self {
                Self::Eq => ordering == Ordering::Equal,
                Self::Ne => ordering != Ordering::Equal,
                Self::Gt => ordering == Ordering::Greater,
                Self::Lt => ordering == Ordering::Less,
                Self::Ge => ordering != Ordering::Less,
                Self::Le => ordering != Ordering::Greater,
            };
        }
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Gt | Self::Lt | Self::Ge | Self::Le => false,
        }
    }
}

impl FromStr for Comparison {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            ">=" => Ok(Self::Ge),
            "<=" => Ok(Self::Le),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Halt the run when a comparison holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopIf {
    pub variable1: String,
    pub condition: Comparison,
    pub variable2: String,
    pub invert: bool,
}

impl StopIf {
    /// Whether the run should stop, given the operand values.
    #[must_use]
    pub fn should_stop(&self, lhs: &str, rhs: &str) -> bool {
        self.condition.evaluate(lhs, rhs) != self.invert
    }
}

/// One literal replacement of a `format_text` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

/// Build a string from a format and a list of literal replacements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatText {
    pub output_variable: String,
    pub format: String,
    pub replacements: Vec<Replacement>,
}

impl FormatText {
    /// Apply the replacements in order; `resolve` interpolates each `to`.
    #[must_use]
    pub fn render(&self, resolve: impl Fn(&str) -> String) -> String {
        self.replacements
            .iter()
            .filter(|r| !r.from.is_empty())
            .fold(self.format.clone(), |out, r| out.replace(&r.from, &resolve(&r.to)))
    }
}
