//! Mapping rules: what a controller symbol does when pressed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::symbol::InputSymbol;
use crate::keymap::{KeyCode, Modifiers};

/// Structural problems with a single rule, independent of the rest of the table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    /// A forwarding rule lists its own source among its targets.
    #[error("rule for {0} forwards to itself")]
    SelfTarget(InputSymbol),

    /// A keyboard rule with no keys and no modifiers, or a forwarding rule
    /// with no targets.
    #[error("rule for {0} has no target")]
    EmptyTarget(InputSymbol),
}

/// What a rule produces when its source fires.
///
/// In TOML the variant is selected by a `kind` field:
///
/// ```toml
/// [rules.target]
/// kind = "keyboard"
/// keys = ["s"]
/// modifiers = ["ctrl"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetKind {
    /// Hold `modifiers` plus `keys` on the output keyboard while the source is held.
    Keyboard {
        keys: Vec<KeyCode>,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Behave as if each target symbol were pressed and released along with the source.
    Forward { targets: Vec<InputSymbol> },
}

/// One user-defined mapping from a source symbol to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    pub id: String,
    /// Optional label shown in listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source: InputSymbol,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub target: TargetKind,
}

fn default_enabled() -> bool {
    true
}

impl MappingRule {
    /// Creates an enabled keyboard rule.
    pub fn keyboard(
        id: impl Into<String>,
        source: InputSymbol,
        keys: Vec<KeyCode>,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            source,
            enabled: true,
            target: TargetKind::Keyboard { keys, modifiers },
        }
    }

    /// Creates an enabled forwarding rule.  Duplicate targets are dropped,
    /// keeping first occurrence order.
    pub fn forward(id: impl Into<String>, source: InputSymbol, targets: Vec<InputSymbol>) -> Self {
        let mut unique = Vec::with_capacity(targets.len());
        for t in targets {
            if !unique.contains(&t) {
                unique.push(t);
            }
        }
        Self {
            id: id.into(),
            name: None,
            source,
            enabled: true,
            target: TargetKind::Forward { targets: unique },
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn is_keyboard(&self) -> bool {
        matches!(self.target, TargetKind::Keyboard { .. })
    }

    pub fn is_forward(&self) -> bool {
        matches!(self.target, TargetKind::Forward { .. })
    }

    /// `true` for a chord (more than one key) or a fan-out to several symbols.
    pub fn has_multiple_targets(&self) -> bool {
        match &self.target {
            TargetKind::Keyboard { keys, .. } => keys.len() > 1,
            TargetKind::Forward { targets } => targets.len() > 1,
        }
    }

    /// Checks the rule on its own, without looking at other rules.
    ///
    /// # Errors
    ///
    /// [`RuleError::SelfTarget`] if a forwarding rule targets its own source,
    /// [`RuleError::EmptyTarget`] if the rule would do nothing.
    pub fn validate(&self) -> Result<(), RuleError> {
        match &self.target {
            TargetKind::Keyboard { keys, modifiers } => {
                if keys.is_empty() && modifiers.is_empty() {
                    return Err(RuleError::EmptyTarget(self.source));
                }
            }
            TargetKind::Forward { targets } => {
                if targets.is_empty() {
                    return Err(RuleError::EmptyTarget(self.source));
                }
                if targets.contains(&self.source) {
                    return Err(RuleError::SelfTarget(self.source));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = match self {
            TargetKind::Keyboard { keys, modifiers } => modifiers
                .iter()
                .map(|m| m.to_string())
                .chain(keys.iter().map(|k| k.to_string()))
                .collect(),
            TargetKind::Forward { targets } => targets.iter().map(|t| t.to_string()).collect(),
        };
        f.write_str(&parts.join("+"))
    }
}

impl fmt::Display for MappingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = if self.is_forward() { "⇒" } else { "→" };
        write!(f, "{} {} {}", self.source, arrow, self.target)?;
        if let Some(name) = &self.name {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
