//! DispatchEngine: resolves one controller event against the rule table.
//!
//! Keyboard rules go straight to the output sink.  Forwarding rules re-run
//! the rules of their target symbols as if those had been pressed too, which
//! means a table like `A ⇒ B`, `B ⇒ A` could recurse forever.  Each top-level
//! event therefore carries a [`RecursionGuard`] naming the symbols whose
//! forwarding rules are currently being expanded; a forward into one of them
//! is skipped.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use padmap_core::{
    ButtonEvent, InputSymbol, KeyCode, MappingRule, Modifiers, RuleSnapshot, RuleTable, TargetKind,
};
use tracing::{debug, trace, warn};

use super::key_state::{EmulationError, KeyboardOutput};

/// Callback for output failures during dispatch.
pub type EmissionErrorHook = Arc<dyn Fn(&EmulationError) + Send + Sync>;

/// Symbols currently being expanded by a forwarding rule, scoped to the
/// dispatch of one external event.
#[derive(Debug, Default)]
pub struct RecursionGuard {
    in_flight: Vec<InputSymbol>,
}

impl RecursionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, symbol: InputSymbol) -> bool {
        self.in_flight.contains(&symbol)
    }

    /// Marks `symbol` in flight until the returned scope is dropped.
    /// Returns `None` if it already is.
    pub fn enter(&mut self, symbol: InputSymbol) -> Option<InFlight<'_>> {
        if self.contains(symbol) {
            return None;
        }
        self.in_flight.push(symbol);
        Some(InFlight { guard: self, symbol })
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

/// A symbol marked in flight.  Unmarks it on drop, whichever way the scope
/// is left.
pub struct InFlight<'a> {
    guard: &'a mut RecursionGuard,
    symbol: InputSymbol,
}

impl Deref for InFlight<'_> {
    type Target = RecursionGuard;

    fn deref(&self) -> &RecursionGuard {
        &*self.guard
    }
}

impl DerefMut for InFlight<'_> {
    fn deref_mut(&mut self) -> &mut RecursionGuard {
        &mut *self.guard
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(pos) = self.guard.in_flight.iter().rposition(|&s| s == self.symbol) {
            self.guard.in_flight.remove(pos);
        }
    }
}

/// Turns controller events into keyboard output according to the rule table.
pub struct DispatchEngine {
    rules: Arc<RuleTable>,
    output: Arc<KeyboardOutput>,
    on_error: Option<EmissionErrorHook>,
}

impl DispatchEngine {
    pub fn new(rules: Arc<RuleTable>, output: Arc<KeyboardOutput>) -> Self {
        Self {
            rules,
            output,
            on_error: None,
        }
    }

    /// Installs a callback invoked for every failed key injection.
    pub fn with_error_hook(mut self, hook: EmissionErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }

    /// Applies the first enabled rule for `event.symbol`, if any.
    ///
    /// The whole call tree reads one rule snapshot.  Output failures are
    /// logged and passed to the error hook; dispatch carries on with the
    /// remaining targets and never retries.
    pub fn dispatch(&self, event: &ButtonEvent) {
        let snapshot = self.rules.snapshot();
        let mut guard = RecursionGuard::new();
        self.resolve(&snapshot, event, &mut guard);
    }

    fn resolve(&self, snapshot: &RuleSnapshot, event: &ButtonEvent, guard: &mut RecursionGuard) {
        if guard.contains(event.symbol) {
            trace!(symbol = ?event.symbol, "already in flight");
            return;
        }
        let Some(rule) = snapshot.find_enabled(event.symbol, None) else {
            trace!(symbol = ?event.symbol, "no rule");
            return;
        };
        self.apply(snapshot, rule, event, guard);
    }

    fn apply(
        &self,
        snapshot: &RuleSnapshot,
        rule: &MappingRule,
        event: &ButtonEvent,
        guard: &mut RecursionGuard,
    ) {
        match &rule.target {
            TargetKind::Keyboard { keys, modifiers } => {
                self.emit(rule, event.pressed, keys, *modifiers);
            }
            TargetKind::Forward { targets } => {
                let Some(mut scope) = guard.enter(rule.source) else {
                    return;
                };
                debug!(rule = %rule.id, from = ?rule.source, ?targets, pressed = event.pressed, "forwarding");
                for &target in targets {
                    let Some(next) = snapshot.find_enabled(target, Some(&rule.id)) else {
                        continue;
                    };
                    match &next.target {
                        TargetKind::Keyboard { keys, modifiers } => {
                            self.emit(next, event.pressed, keys, *modifiers);
                        }
                        TargetKind::Forward { .. } => {
                            if scope.contains(target) {
                                debug!(symbol = ?target, "forwarding cycle cut");
                                continue;
                            }
                            self.apply(snapshot, next, &event.retarget(target), &mut scope);
                        }
                    }
                }
            }
        }
    }

    fn emit(&self, rule: &MappingRule, pressed: bool, keys: &[KeyCode], modifiers: Modifiers) {
        let result = if pressed {
            self.output.press_keys(keys, modifiers)
        } else {
            self.output.release_keys(keys, modifiers)
        };
        if let Err(e) = result {
            warn!(rule = %rule.id, pressed, "key injection failed: {e}");
            if let Some(hook) = &self.on_error {
                hook(&e);
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
