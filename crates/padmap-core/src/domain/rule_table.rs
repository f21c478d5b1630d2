//! The ordered, shared rule table.
//!
//! The table is read on every dispatched event and written only when the
//! user edits rules, so it is stored copy-on-write: readers clone an `Arc`
//! to the current rule list under a short read lock, and writers build a new
//! list before swapping it in.  A reader therefore never observes a
//! half-applied edit, and a long dispatch never blocks an edit.

use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::debug;

use super::rule::MappingRule;
use super::symbol::InputSymbol;

/// An immutable view of the rule table at one instant.
#[derive(Debug, Clone, Default)]
pub struct RuleSnapshot {
    rules: Arc<Vec<MappingRule>>,
}

impl RuleSnapshot {
    /// First enabled rule (in table order) whose source is `symbol`, skipping
    /// the rule whose id equals `exclude_id`.
    pub fn find_enabled(&self, symbol: InputSymbol, exclude_id: Option<&str>) -> Option<&MappingRule> {
        self.rules
            .iter()
            .find(|r| r.enabled && r.source == symbol && Some(r.id.as_str()) != exclude_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MappingRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn to_vec(&self) -> Vec<MappingRule> {
        self.rules.as_ref().clone()
    }
}

/// Why a checked edit was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleEditError {
    /// Another enabled rule already claims this source.
    #[error("an enabled rule for {0} already exists")]
    Conflict(InputSymbol),

    #[error("no rule with id {0}")]
    NotFound(String),
}

/// Thread-safe, ordered collection of [`MappingRule`]s.
///
/// The plain edits (`add`, `replace`, `set_enabled`, `replace_all`) enforce
/// nothing about uniqueness of sources.  The `try_*` edits keep at most one
/// enabled rule per source: each checks and writes under a single write
/// lock, so two concurrent edits cannot both pass the check.
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: RwLock<Arc<Vec<MappingRule>>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: Vec<MappingRule>) -> Self {
        Self {
            rules: RwLock::new(Arc::new(rules)),
        }
    }

    /// Returns the current rule list.  Cheap: clones one `Arc`.
    pub fn snapshot(&self) -> RuleSnapshot {
        let guard = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        RuleSnapshot {
            rules: Arc::clone(&guard),
        }
    }

    /// Appends `rule` without any conflict check.
    pub fn add(&self, rule: MappingRule) {
        debug!(id = %rule.id, source = ?rule.source, "rule added");
        self.write(|rules| rules.push(rule));
    }

    /// Removes the rule with `id`.  Returns `false` if no rule matched.
    pub fn remove(&self, id: &str) -> bool {
        self.write(|rules| {
            let before = rules.len();
            rules.retain(|r| r.id != id);
            let removed = rules.len() != before;
            if removed {
                debug!(%id, "rule removed");
            }
            removed
        })
    }

    /// Copies out every rule in table order.
    pub fn all(&self) -> Vec<MappingRule> {
        self.snapshot().to_vec()
    }

    /// Atomically swaps the whole rule list.
    pub fn replace_all(&self, rules: Vec<MappingRule>) {
        debug!(count = rules.len(), "rule table replaced");
        let mut guard = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(rules);
    }

    /// Replaces the rule with the same id in place, keeping its position.
    /// Returns `false` if no rule has that id.
    pub fn replace(&self, rule: MappingRule) -> bool {
        self.write(|rules| match rules.iter_mut().find(|r| r.id == rule.id) {
            Some(slot) => {
                *slot = rule;
                true
            }
            None => false,
        })
    }

    /// Sets the `enabled` flag of the rule with `id`.  Returns `false` if no
    /// rule has that id.
    pub fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        self.write(|rules| match rules.iter_mut().find(|r| r.id == id) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        })
    }

    /// Appends `rule` unless it is enabled and another enabled rule already
    /// claims its source.
    ///
    /// # Errors
    ///
    /// [`RuleEditError::Conflict`]; the table is left unchanged.
    pub fn try_add(&self, rule: MappingRule) -> Result<(), RuleEditError> {
        self.checked_write(|current| {
            if rule.enabled && conflicts(current, rule.source, &rule.id) {
                return Err(RuleEditError::Conflict(rule.source));
            }
            Ok(true)
        })?
        .map(|rules| {
            debug!(id = %rule.id, source = ?rule.source, "rule added");
            rules.push(rule);
        });
        Ok(())
    }

    /// Replaces the rule with the same id in place, refusing an enabled
    /// replacement whose source another enabled rule already claims.
    ///
    /// # Errors
    ///
    /// [`RuleEditError::NotFound`] or [`RuleEditError::Conflict`]; the table
    /// is left unchanged.
    pub fn try_replace(&self, rule: MappingRule) -> Result<(), RuleEditError> {
        self.checked_write(|current| {
            if !current.iter().any(|r| r.id == rule.id) {
                return Err(RuleEditError::NotFound(rule.id.clone()));
            }
            if rule.enabled && conflicts(current, rule.source, &rule.id) {
                return Err(RuleEditError::Conflict(rule.source));
            }
            Ok(true)
        })?
        .map(|rules| {
            if let Some(slot) = rules.iter_mut().find(|r| r.id == rule.id) {
                *slot = rule;
            }
        });
        Ok(())
    }

    /// Sets the `enabled` flag of the rule with `id`, refusing to enable it
    /// while another enabled rule claims the same source.  Returns whether
    /// the flag changed.
    ///
    /// # Errors
    ///
    /// [`RuleEditError::NotFound`] or [`RuleEditError::Conflict`]; the table
    /// is left unchanged.
    pub fn try_set_enabled(&self, id: &str, enabled: bool) -> Result<bool, RuleEditError> {
        let edit = self.checked_write(|current| {
            let rule = current
                .iter()
                .find(|r| r.id == id)
                .ok_or_else(|| RuleEditError::NotFound(id.to_string()))?;
            if rule.enabled == enabled {
                return Ok(false);
            }
            if enabled && conflicts(current, rule.source, id) {
                return Err(RuleEditError::Conflict(rule.source));
            }
            Ok(true)
        })?;
        Ok(edit
            .map(|rules| {
                if let Some(rule) = rules.iter_mut().find(|r| r.id == id) {
                    rule.enabled = enabled;
                }
            })
            .is_some())
    }

    pub fn clear(&self) {
        self.replace_all(Vec::new());
    }

    /// `true` iff some *enabled* rule other than `exclude_id` already claims
    /// `source`.  Pass `""` to check against every rule.
    pub fn has_conflict(&self, source: InputSymbol, exclude_id: &str) -> bool {
        self.snapshot().find_enabled(source, Some(exclude_id)).is_some()
    }

    /// First rule (enabled or not) whose source is `symbol`.
    pub fn find_by_source(&self, symbol: InputSymbol) -> Option<MappingRule> {
        self.snapshot().iter().find(|r| r.source == symbol).cloned()
    }

    pub fn find_by_id(&self, id: &str) -> Option<MappingRule> {
        self.snapshot().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Runs `f` on a private copy of the list (if any snapshot still shares
    /// it) and publishes the result.  Holding the write lock for the whole
    /// edit keeps writers serialized.
    fn write<T>(&self, f: impl FnOnce(&mut Vec<MappingRule>) -> T) -> T {
        let mut guard = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        f(Arc::make_mut(&mut guard))
    }

    /// Takes the write lock and runs `check` on the current list.  If it
    /// returns `Ok(true)`, the returned [`CheckedEdit`] applies the edit under
    /// the same lock; `Ok(false)` means there is nothing to write.  A refused
    /// or empty check never copies the list.
    fn checked_write<E>(
        &self,
        check: impl FnOnce(&[MappingRule]) -> Result<bool, E>,
    ) -> Result<CheckedEdit<'_>, E> {
        let guard = self.rules.write().unwrap_or_else(PoisonError::into_inner);
        let proceed = check(guard.as_slice())?;
        Ok(CheckedEdit { guard, proceed })
    }
}

/// A write lock whose check already passed.
struct CheckedEdit<'a> {
    guard: std::sync::RwLockWriteGuard<'a, Arc<Vec<MappingRule>>>,
    proceed: bool,
}

impl CheckedEdit<'_> {
    /// Applies `f` if the check asked for a write.  Returns `None` otherwise.
    fn map<T>(mut self, f: impl FnOnce(&mut Vec<MappingRule>) -> T) -> Option<T> {
        if !self.proceed {
            return None;
        }
        Some(f(Arc::make_mut(&mut self.guard)))
    }
}

fn conflicts(rules: &[MappingRule], source: InputSymbol, exclude_id: &str) -> bool {
    rules
        .iter()
        .any(|r| r.enabled && r.source == source && r.id != exclude_id)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
