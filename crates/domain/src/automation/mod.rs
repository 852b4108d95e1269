//! Automation — trigger → ordered action rules.
//!
//! Each automation has a [`Trigger`] that determines when it fires and an
//! ordered list of [`Action`]s that run, one after the other, in a fresh
//! variable scope. `pc` automations may drive the PC agent; `autonomous`
//! ones run on the device alone and must not contain PC-only actions.

mod action;
pub mod command;
mod trigger;

pub use action::{Action, ActionKind};
pub use command::ActionCommand;
pub use trigger::{Trigger, TriggerKind};

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{InkSyncError, ValidationError};
use crate::id::AutomationId;
use crate::variables;

/// Where an automation is allowed to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationKind {
    /// Requires the PC agent.
    #[default]
    Pc,
    /// Runs on the device without a PC.
    Autonomous,
}

impl fmt::Display for AutomationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pc => "pc",
            Self::Autonomous => "autonomous",
        })
    }
}

/// A rule that reacts to device events by executing actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Automation {
    #[serde(default)]
    pub id: AutomationId,
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "type", default)]
    pub kind: AutomationKind,
    pub trigger: Trigger,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Automation {
    /// Create a builder for constructing an [`Automation`].
    #[must_use]
    pub fn builder() -> AutomationBuilder {
        AutomationBuilder::default()
    }

    /// The automation the editor starts from when `existing` automations
    /// are already defined: enabled, `pc`, firing on key 1 of module 1.
    #[must_use]
    pub fn new_default(existing: usize) -> Self {
        Self {
            id: AutomationId::new(),
            name: format!("Automation {}", existing + 1),
            enabled: true,
            kind: AutomationKind::Pc,
            trigger: Trigger::default(),
            actions: Vec::new(),
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::Validation`] when:
    /// - `name` is blank ([`ValidationError::EmptyName`])
    /// - the trigger or an action config violates its schema
    ///   ([`ValidationError::InvalidConfig`])
    /// - an autonomous automation contains a PC-only action
    ///   ([`ValidationError::PcOnlyAction`])
    pub fn validate(&self) -> Result<(), InkSyncError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.trigger.validate()?;
        for (index, action) in self.actions.iter().enumerate() {
            if self.kind == AutomationKind::Autonomous && action.definition().pc_only {
                return Err(ValidationError::PcOnlyAction {
                    action: action.kind,
                }
                .into());
            }
            action.validate(index)?;
        }
        Ok(())
    }

    /// User variable names this automation reads or writes, sorted.
    ///
    /// Covers every `{name}` reference in string configs plus the outputs of
    /// `set_variable`, `map_variable` and `format_text`.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for action in &self.actions {
            for value in action.config.values() {
                if let Some(text) = value.as_str() {
                    names.extend(variables::references(text).map(str::to_string));
                }
            }
            let output = match action.kind {
                ActionKind::SetVariable => action.config.get("variable"),
                ActionKind::MapVariable => action.config.get("variable_out"),
                ActionKind::FormatText => action.config.get("output_variable"),
                _ => None,
            };
            if let Some(name) = output.and_then(|v| v.as_str()).map(str::trim)
                && !name.is_empty()
            {
                names.insert(name.to_string());
            }
        }
        names
    }

    /// Variable names the editor offers for this automation: the ambient
    /// built-ins, those of its trigger kind and every user variable its
    /// actions use, sorted.
    #[must_use]
    pub fn available_variables(&self) -> BTreeSet<String> {
        let used = self.variables();
        variables::available_names(self.trigger.kind, used.iter().map(String::as_str))
    }
}

/// Validate a full snapshot as the editor saves it.
///
/// # Errors
///
/// Returns the first invariant violation found, including
/// [`ValidationError::DuplicateId`] when two automations share an id.
pub fn validate_snapshot(automations: &[Automation]) -> Result<(), InkSyncError> {
    let mut seen = HashSet::with_capacity(automations.len());
    for automation in automations {
        if !seen.insert(automation.id) {
            return Err(ValidationError::DuplicateId(automation.id.to_string()).into());
        }
        automation.validate()?;
    }
    Ok(())
}

/// Step-by-step builder for [`Automation`].
#[derive(Debug, Default)]
pub struct AutomationBuilder {
    id: Option<AutomationId>,
    name: Option<String>,
    enabled: Option<bool>,
    kind: AutomationKind,
    trigger: Option<Trigger>,
    actions: Vec<Action>,
}

impl AutomationBuilder {
    #[must_use]
    pub fn id(mut self, id: AutomationId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: AutomationKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Consume the builder, validate, and return an [`Automation`].
    ///
    /// # Errors
    ///
    /// Returns [`InkSyncError::Validation`] if the result violates an invariant.
    pub fn build(self) -> Result<Automation, InkSyncError> {
        let automation = Automation {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            kind: self.kind,
            trigger: self.trigger.unwrap_or_default(),
            actions: self.actions,
        };
        automation.validate()?;
        Ok(automation)
    }
}
