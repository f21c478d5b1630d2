//! MapperController: the one object a front end talks to.
//!
//! Owns the rule table and the output sink, starts and stops the poll and
//! dispatch tasks, validates rule edits, and notifies subscribers through
//! three hooks:
//!
//! - `on_state_change` after every Stopped ↔ Running transition,
//! - `on_rules_change` after every successful rule edit, with the new rules,
//! - `on_error` for start failures and key injection failures.
//!
//! Hooks run synchronously on the thread or task that caused them, so they
//! should be quick (log, save a file, post to a UI queue).

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, PoisonError, RwLock,
};

use padmap_core::{InputSymbol, KeyCode, MappingRule, Modifiers, RuleEditError, RuleError, RuleTable};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::dispatch::DispatchEngine;
use super::key_state::{EmulationError, KeyboardEmulator, KeyboardOutput};
use super::poll_device::{spawn_poller, DeviceError, DeviceStateSource, PollSettings, PollerHandle};

/// Error type for controller operations.
#[derive(Debug, Error)]
pub enum MapperError {
    /// The device source could not be initialized at start.
    #[error("device unavailable: {0}")]
    DeviceUnavailable(#[from] DeviceError),

    /// Another enabled rule already claims this source.
    #[error("an enabled rule for {0} already exists")]
    ConflictingSourceRule(InputSymbol),

    /// A forwarding rule lists its own source among its targets.
    #[error("a forwarding rule for {0} cannot target itself")]
    SelfTargetingRule(InputSymbol),

    /// The rule would do nothing.
    #[error("the rule for {0} has no target")]
    EmptyTarget(InputSymbol),

    #[error("no rule with id {0}")]
    RuleNotFound(String),

    /// Key injection failed.  Reported, never retried.
    #[error("output emission failed: {0}")]
    OutputEmissionFailure(#[from] EmulationError),
}

impl From<RuleError> for MapperError {
    fn from(e: RuleError) -> Self {
        match e {
            RuleError::SelfTarget(s) => MapperError::SelfTargetingRule(s),
            RuleError::EmptyTarget(s) => MapperError::EmptyTarget(s),
        }
    }
}

impl From<RuleEditError> for MapperError {
    fn from(e: RuleEditError) -> Self {
        match e {
            RuleEditError::Conflict(s) => MapperError::ConflictingSourceRule(s),
            RuleEditError::NotFound(id) => MapperError::RuleNotFound(id),
        }
    }
}

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperState {
    Stopped,
    Running,
}

pub type StateHook = Arc<dyn Fn(MapperState) + Send + Sync>;
pub type RulesHook = Arc<dyn Fn(&[MappingRule]) + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(&MapperError) + Send + Sync>;

#[derive(Default)]
struct Hooks {
    on_state_change: Option<StateHook>,
    on_rules_change: Option<RulesHook>,
    on_error: Option<ErrorHook>,
}

/// Hook registry shared with the dispatch task.
///
/// A hook is cloned out of the lock before it runs, so it may replace any
/// hook (itself included) without deadlocking.
#[derive(Default)]
struct HookSet(RwLock<Hooks>);

impl HookSet {
    fn state(&self, state: MapperState) {
        if let Some(hook) = self.get(|h| h.on_state_change.clone()) {
            hook(state);
        }
    }

    fn rules(&self, rules: &[MappingRule]) {
        if let Some(hook) = self.get(|h| h.on_rules_change.clone()) {
            hook(rules);
        }
    }

    fn error(&self, err: &MapperError) {
        if let Some(hook) = self.get(|h| h.on_error.clone()) {
            hook(err);
        }
    }

    fn get<T>(&self, f: impl FnOnce(&Hooks) -> T) -> T {
        f(&self.0.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn edit(&self, f: impl FnOnce(&mut Hooks)) {
        f(&mut self.0.write().unwrap_or_else(PoisonError::into_inner));
    }
}

struct RunningTasks {
    poller: PollerHandle,
    consumer: JoinHandle<()>,
}

/// Top-level controller for the mapping pipeline.
pub struct MapperController {
    device: Arc<dyn DeviceStateSource>,
    rules: Arc<RuleTable>,
    output: Arc<KeyboardOutput>,
    settings: PollSettings,
    hooks: Arc<HookSet>,
    tasks: Mutex<Option<RunningTasks>>,
    running: AtomicBool,
}

impl MapperController {
    /// Creates a stopped controller with an empty rule table.
    pub fn new(
        device: Arc<dyn DeviceStateSource>,
        keyboard: Arc<dyn KeyboardEmulator>,
        settings: PollSettings,
    ) -> Self {
        Self {
            device,
            rules: Arc::new(RuleTable::new()),
            output: Arc::new(KeyboardOutput::new(keyboard)),
            settings,
            hooks: Arc::new(HookSet::default()),
            tasks: Mutex::new(None),
            running: AtomicBool::new(false),
        }
    }

    // ── Hooks ─────────────────────────────────────────────────────────────────

    pub fn set_on_state_change(&self, hook: impl Fn(MapperState) + Send + Sync + 'static) {
        self.hooks.edit(|h| h.on_state_change = Some(Arc::new(hook)));
    }

    pub fn set_on_rules_change(&self, hook: impl Fn(&[MappingRule]) + Send + Sync + 'static) {
        self.hooks.edit(|h| h.on_rules_change = Some(Arc::new(hook)));
    }

    pub fn set_on_error(&self, hook: impl Fn(&MapperError) + Send + Sync + 'static) {
        self.hooks.edit(|h| h.on_error = Some(Arc::new(hook)));
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    pub fn state(&self) -> MapperState {
        if self.is_running() {
            MapperState::Running
        } else {
            MapperState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Starts polling and dispatching.  A no-op while already running.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::DeviceUnavailable`] if the device source cannot
    /// be initialized; the error hook fires too and the controller stays
    /// stopped.
    pub async fn start(&self) -> Result<(), MapperError> {
        let mut tasks = self.tasks.lock().await;
        if tasks.is_some() {
            debug!("start ignored: already running");
            return Ok(());
        }

        if let Err(e) = self.device.init(self.settings.device_index) {
            let err = MapperError::from(e);
            error!("failed to start mapping: {err}");
            self.hooks.error(&err);
            return Err(err);
        }

        let (poller, events) = spawn_poller(Arc::clone(&self.device), &self.settings);
        let hooks = Arc::clone(&self.hooks);
        let engine = DispatchEngine::new(Arc::clone(&self.rules), Arc::clone(&self.output))
            .with_error_hook(Arc::new(move |e: &EmulationError| {
                hooks.error(&MapperError::OutputEmissionFailure(e.clone()));
            }));
        let consumer = tokio::spawn(consume_events(events, engine));

        *tasks = Some(RunningTasks { poller, consumer });
        self.running.store(true, Ordering::Release);
        drop(tasks);

        info!(
            device = self.settings.device_index,
            rules = self.rules.len(),
            "mapping started"
        );
        self.hooks.state(MapperState::Running);
        Ok(())
    }

    /// Stops polling, lets the dispatcher drain queued events, then releases
    /// every key padmap still holds.  A no-op while stopped.
    ///
    /// The task lock is held until the controller is fully stopped, so a
    /// `start` issued meanwhile waits and then starts afresh.
    pub async fn stop(&self) {
        let mut tasks = self.tasks.lock().await;
        let Some(RunningTasks { poller, consumer }) = tasks.take() else {
            debug!("stop ignored: not running");
            return;
        };

        poller.stop().await;
        if let Err(e) = consumer.await {
            warn!("dispatch task ended abnormally: {e}");
        }
        let released = self.output.release_all();
        self.running.store(false, Ordering::Release);
        drop(tasks);

        if let Err(e) = released {
            let err = MapperError::from(e);
            warn!("failed to release held keys: {err}");
            self.hooks.error(&err);
        }
        info!("mapping stopped");
        self.hooks.state(MapperState::Stopped);
    }

    // ── Rules ─────────────────────────────────────────────────────────────────

    /// Adds a rule after validating it.  An empty id is replaced with a
    /// fresh UUID.  Returns the id the rule was stored under.
    ///
    /// # Errors
    ///
    /// - [`MapperError::SelfTargetingRule`] / [`MapperError::EmptyTarget`] for
    ///   a malformed rule.
    /// - [`MapperError::ConflictingSourceRule`] if the rule is enabled and
    ///   another enabled rule already claims its source.
    pub fn add_rule(&self, mut rule: MappingRule) -> Result<String, MapperError> {
        if rule.id.is_empty() {
            rule.id = generate_rule_id();
        }
        rule.validate()?;

        let id = rule.id.clone();
        let shown = rule.to_string();
        self.rules.try_add(rule)?;
        info!(%id, "rule added: {shown}");
        self.notify_rules();
        Ok(id)
    }

    /// Adds an enabled keyboard rule with a generated id.
    ///
    /// # Errors
    ///
    /// See [`add_rule`](Self::add_rule).
    pub fn add_keyboard_rule(
        &self,
        source: InputSymbol,
        keys: Vec<KeyCode>,
        modifiers: Modifiers,
    ) -> Result<String, MapperError> {
        self.add_rule(MappingRule::keyboard(generate_rule_id(), source, keys, modifiers))
    }

    /// Adds an enabled forwarding rule with a generated id.
    ///
    /// # Errors
    ///
    /// See [`add_rule`](Self::add_rule).
    pub fn add_forward_rule(
        &self,
        source: InputSymbol,
        targets: Vec<InputSymbol>,
    ) -> Result<String, MapperError> {
        self.add_rule(MappingRule::forward(generate_rule_id(), source, targets))
    }

    /// # Errors
    ///
    /// Returns [`MapperError::RuleNotFound`] if no rule has `id`.
    pub fn remove_rule(&self, id: &str) -> Result<(), MapperError> {
        if !self.rules.remove(id) {
            return Err(MapperError::RuleNotFound(id.to_string()));
        }
        info!(%id, "rule removed");
        self.notify_rules();
        Ok(())
    }

    /// Replaces the rule with the same id in place, with the same checks as
    /// [`add_rule`](Self::add_rule).
    ///
    /// # Errors
    ///
    /// As for `add_rule`, plus [`MapperError::RuleNotFound`].
    pub fn replace_rule(&self, rule: MappingRule) -> Result<(), MapperError> {
        rule.validate()?;
        let id = rule.id.clone();
        self.rules.try_replace(rule)?;
        info!(%id, "rule replaced");
        self.notify_rules();
        Ok(())
    }

    /// Enables or disables a rule.  Enabling re-checks the source conflict.
    ///
    /// # Errors
    ///
    /// [`MapperError::RuleNotFound`] or [`MapperError::ConflictingSourceRule`].
    pub fn set_rule_enabled(&self, id: &str, enabled: bool) -> Result<(), MapperError> {
        if !self.rules.try_set_enabled(id, enabled)? {
            return Ok(());
        }
        info!(%id, enabled, "rule toggled");
        self.notify_rules();
        Ok(())
    }

    /// `true` iff an enabled rule other than `exclude_id` claims `source`.
    pub fn has_conflict(&self, source: InputSymbol, exclude_id: &str) -> bool {
        self.rules.has_conflict(source, exclude_id)
    }

    pub fn get_rules(&self) -> Vec<MappingRule> {
        self.rules.all()
    }

    /// Replaces the whole rule table without validation.  Sources claimed by
    /// more than one enabled rule are logged; dispatch uses the first.
    pub fn set_rules(&self, rules: Vec<MappingRule>) {
        warn_on_duplicate_sources(&rules);
        info!(count = rules.len(), "rules replaced");
        self.rules.replace_all(rules);
        self.notify_rules();
    }

    /// Rules in persistable form.
    pub fn export_rules(&self) -> Vec<MappingRule> {
        self.get_rules()
    }

    /// Loads rules from a persisted form.  Same semantics as
    /// [`set_rules`](Self::set_rules).
    pub fn import_rules(&self, rules: Vec<MappingRule>) {
        self.set_rules(rules);
    }

    // ── Output ────────────────────────────────────────────────────────────────

    /// Taps a key chord once, independent of any rule.
    ///
    /// # Errors
    ///
    /// Returns [`MapperError::OutputEmissionFailure`] if injection fails.
    pub fn tap(&self, keys: &[KeyCode], modifiers: Modifiers) -> Result<(), MapperError> {
        self.output.simulate_one_shot(keys, modifiers)?;
        Ok(())
    }

    /// Keys and modifiers currently held by padmap.
    pub fn held_keys(&self) -> super::key_state::HeldKeys {
        self.output.held()
    }

    fn notify_rules(&self) {
        let snapshot = self.rules.snapshot();
        let rules: Vec<MappingRule> = snapshot.iter().cloned().collect();
        self.hooks.rules(&rules);
    }
}

/// Dispatches queued events in order until the poll task closes the queue.
async fn consume_events(mut events: mpsc::Receiver<padmap_core::ButtonEvent>, engine: DispatchEngine) {
    while let Some(event) = events.recv().await {
        engine.dispatch(&event);
    }
    debug!("dispatch task drained");
}

fn generate_rule_id() -> String {
    Uuid::new_v4().to_string()
}

fn warn_on_duplicate_sources(rules: &[MappingRule]) {
    let mut seen: Vec<InputSymbol> = Vec::new();
    for rule in rules.iter().filter(|r| r.enabled) {
        if seen.contains(&rule.source) {
            warn!(source = ?rule.source, id = %rule.id, "multiple enabled rules for one source; only the first is used");
        } else {
            seen.push(rule.source);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
