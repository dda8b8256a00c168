//! The mission runtime.
//!
//! [`MissionRuntime`] owns every piece of runtime state and is driven from a
//! single control thread. Definition loads are the only asynchronous part:
//! their completions queue up inside the [`DefinitionLoader`] and are applied
//! when the host calls [`MissionRuntime::pump_loads`] or awaits
//! [`MissionRuntime::settle_loads`].
//!
//! Every operation that can be refused returns the reason as a
//! [`MissionError`] and logs it at `warn`. A refused call leaves all state
//! untouched, so hosts that only care about gameplay continuing can ignore
//! the result.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::runtime::Handle;

use crate::config::{Config, EngineConfig};
use crate::logutil::escape_log;
use crate::mission::action::{
    run_actions, ActionContext, ActionHandler, ActionPhase, LoggingActionHandler,
};
use crate::mission::definition::MissionDefinition;
use crate::mission::errors::MissionError;
use crate::mission::history::EventHistory;
use crate::mission::loader::{DefinitionLoader, JsonDirectorySource, LoadCompletion};
use crate::mission::notify::{MissionNotification, MissionObserver, ObserverRegistry, SubscriptionId};
use crate::mission::rules::{ObjectiveRule, RuleContext};
use crate::mission::snapshot::MissionSnapshot;
use crate::mission::storage::SaveStore;
use crate::mission::tag::Tag;
use crate::mission::types::{
    EventSource, MissionRuntimeState, ObjectiveRuntimeState, ProgressState, SNAPSHOT_SCHEMA_VERSION,
};

fn rejected<T>(error: MissionError) -> Result<T, MissionError> {
    warn!("{}", error);
    Err(error)
}

fn check_tag(tag: &Tag, what: &str) -> Result<(), MissionError> {
    if tag.is_valid() {
        Ok(())
    } else {
        Err(MissionError::InvalidIdentifier(format!("empty {} id", what)))
    }
}

/// Objectives of `mission` that completed without failing.
fn succeeded_objectives(mission: &MissionRuntimeState) -> BTreeSet<Tag> {
    mission
        .completed_objective_ids
        .difference(&mission.failed_objective_ids)
        .cloned()
        .collect()
}

pub struct MissionRuntime {
    config: EngineConfig,
    loader: DefinitionLoader,
    /// Definitions referenced by active or archived runtime state.
    definitions: HashMap<Tag, Arc<MissionDefinition>>,
    active: BTreeMap<Tag, MissionRuntimeState>,
    completed: BTreeMap<Tag, MissionRuntimeState>,
    history: EventHistory,
    /// Missions whose definition is still being resolved.
    pending_starts: BTreeSet<Tag>,
    /// Missions currently chaining into their successor, innermost last.
    chaining: Vec<Tag>,
    actions: Box<dyn ActionHandler + Send>,
    observers: ObserverRegistry,
}

impl MissionRuntime {
    pub fn new(config: EngineConfig, loader: DefinitionLoader) -> Self {
        Self {
            config,
            loader,
            definitions: HashMap::new(),
            active: BTreeMap::new(),
            completed: BTreeMap::new(),
            history: EventHistory::new(),
            pending_starts: BTreeSet::new(),
            chaining: Vec::new(),
            actions: Box::new(LoggingActionHandler),
            observers: ObserverRegistry::new(),
        }
    }

    /// Runtime reading definitions from `definitions.dir`. With
    /// `async_loading` set and a tokio runtime available, reads happen on the
    /// blocking pool.
    pub fn from_config(config: &Config) -> Self {
        let mut loader =
            DefinitionLoader::new().with_source(JsonDirectorySource::new(&config.definitions.dir));
        if config.definitions.async_loading {
            match Handle::try_current() {
                Ok(handle) => loader = loader.with_runtime(handle),
                Err(_) => warn!("async definition loading requested outside a tokio runtime; loading inline"),
            }
        }
        Self::new(config.engine.clone(), loader)
    }

    pub fn with_action_handler(mut self, handler: impl ActionHandler + Send + 'static) -> Self {
        self.actions = Box::new(handler);
        self
    }

    pub fn set_action_handler(&mut self, handler: impl ActionHandler + Send + 'static) {
        self.actions = Box::new(handler);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn loader(&self) -> &DefinitionLoader {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut DefinitionLoader {
        &mut self.loader
    }

    /// Add a definition to the resident store.
    pub fn register_definition(&mut self, definition: MissionDefinition) -> Result<(), MissionError> {
        self.loader.store_mut().insert(definition).or_else(rejected)
    }

    pub fn subscribe(&mut self, observer: impl MissionObserver + Send + 'static) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ---------------------------------------------------------------------
    // Mission lifecycle
    // ---------------------------------------------------------------------

    /// Start a mission. Resident definitions start it before this returns;
    /// otherwise it starts once its load completes and is pumped.
    pub fn start_mission(&mut self, mission_id: &Tag) -> Result<(), MissionError> {
        check_tag(mission_id, "mission").or_else(rejected)?;
        if self.active.contains_key(mission_id) {
            return rejected(MissionError::AlreadyActive(mission_id.to_string()));
        }
        if self.pending_starts.contains(mission_id) {
            return rejected(MissionError::AlreadyActive(format!("{} (loading)", mission_id)));
        }

        self.pending_starts.insert(mission_id.clone());
        self.loader.request(mission_id);
        self.drain_ready(Some(mission_id)).unwrap_or(Ok(()))
    }

    /// Drop a start that is still waiting for its definition. Its load, when
    /// it lands, is discarded as stale.
    pub fn cancel_start(&mut self, mission_id: &Tag) -> bool {
        let cancelled = self.pending_starts.remove(mission_id);
        if cancelled {
            info!("mission {} start cancelled while loading", mission_id);
        }
        cancelled
    }

    /// Apply every load completion that is ready. Returns how many were handled.
    pub fn pump_loads(&mut self) -> usize {
        let mut handled = 0;
        while let Some(completion) = self.loader.try_next() {
            let _ = self.on_definition_loaded(completion);
            handled += 1;
        }
        handled
    }

    /// Wait until no mission start is waiting on a definition.
    pub async fn settle_loads(&mut self) {
        self.pump_loads();
        while !self.pending_starts.is_empty() {
            let Some(completion) = self.loader.next().await else {
                break;
            };
            let _ = self.on_definition_loaded(completion);
        }
    }

    fn drain_ready(&mut self, wanted: Option<&Tag>) -> Option<Result<(), MissionError>> {
        let mut outcome = None;
        while let Some(completion) = self.loader.try_next() {
            let id = completion.mission_id.clone();
            let result = self.on_definition_loaded(completion);
            if wanted == Some(&id) {
                outcome = Some(result);
            }
        }
        outcome
    }

    fn on_definition_loaded(&mut self, completion: LoadCompletion) -> Result<(), MissionError> {
        let LoadCompletion { mission_id, result } = completion;
        if !self.pending_starts.remove(&mission_id) || self.active.contains_key(&mission_id) {
            return rejected(MissionError::StaleLoad(mission_id.to_string()));
        }
        let definition = result?;
        self.definitions.insert(mission_id.clone(), definition.clone());
        self.begin_mission(&mission_id, &definition);
        Ok(())
    }

    fn begin_mission(&mut self, mission_id: &Tag, definition: &MissionDefinition) {
        self.active
            .insert(mission_id.clone(), MissionRuntimeState::new(mission_id.clone()));
        info!(
            "mission {} started ({} objectives)",
            mission_id,
            definition.objectives.len()
        );
        self.observers.publish(&MissionNotification::MissionStarted {
            mission_id: mission_id.clone(),
        });

        for objective in definition.objectives.iter().filter(|obj| obj.auto_start) {
            if !self.is_mission_active(mission_id) {
                break;
            }
            if let Err(e) = self.activate_inner(mission_id, &objective.id, None, 0) {
                warn!("auto-start of {} in {} failed: {}", objective.id, mission_id, e);
            }
        }
        self.finish_if_done(mission_id);
    }

    /// Archive a running mission. On success its follow-up mission starts.
    pub fn finish_mission(&mut self, mission_id: &Tag, success: bool) -> Result<(), MissionError> {
        self.finish_inner(mission_id, success).or_else(rejected)
    }

    fn finish_inner(&mut self, mission_id: &Tag, success: bool) -> Result<(), MissionError> {
        check_tag(mission_id, "mission")?;
        let Some(mut state) = self.active.remove(mission_id) else {
            if self.completed.contains_key(mission_id) {
                return Err(MissionError::InvalidTransition(format!(
                    "mission {} already finished",
                    mission_id
                )));
            }
            return Err(MissionError::NotFound(format!("active mission {}", mission_id)));
        };

        if !state.active_objectives.is_empty() {
            debug!(
                "mission {} finished with {} objectives still running",
                mission_id,
                state.active_objectives.len()
            );
            state.active_objectives.clear();
        }
        state.mark_finished(success);
        info!(
            "mission {} {}",
            mission_id,
            if success { "completed" } else { "failed" }
        );
        self.completed.insert(mission_id.clone(), state);
        self.observers.publish(&MissionNotification::MissionCompleted {
            mission_id: mission_id.clone(),
            success,
        });

        if !success {
            return Ok(());
        }
        let next = self
            .definitions
            .get(mission_id)
            .and_then(|definition| definition.next_mission().cloned());
        if let Some(next) = next {
            if self.chaining.contains(&next) {
                warn!("mission chain {} -> {} loops; not restarting", mission_id, next);
                return Ok(());
            }
            info!("mission {} chains into {}", mission_id, next);
            self.chaining.push(mission_id.clone());
            let _ = self.start_mission(&next);
            self.chaining.pop();
        }
        Ok(())
    }

    fn finish_if_done(&mut self, mission_id: &Tag) {
        let Some(definition) = self.definitions.get(mission_id).cloned() else {
            return;
        };
        let Some(mission) = self.active.get(mission_id) else {
            return;
        };
        if !mission.is_in_progress() || !mission.active_objectives.is_empty() {
            return;
        }
        if !definition
            .objectives
            .iter()
            .all(|objective| mission.is_objective_completed(&objective.id))
        {
            return;
        }
        let success = mission.failed_objective_ids.is_empty();
        if let Err(e) = self.finish_inner(mission_id, success) {
            warn!("could not finish mission {}: {}", mission_id, e);
        }
    }

    // ---------------------------------------------------------------------
    // Objectives
    // ---------------------------------------------------------------------

    /// Activate (or restart) an objective of a running mission.
    pub fn activate_objective(&mut self, mission_id: &Tag, objective_id: &Tag) -> Result<(), MissionError> {
        self.activate_inner(mission_id, objective_id, None, 0)
            .or_else(rejected)
    }

    fn running_definition(&self, mission_id: &Tag) -> Result<Arc<MissionDefinition>, MissionError> {
        let Some(mission) = self.active.get(mission_id) else {
            return Err(MissionError::NotFound(format!("active mission {}", mission_id)));
        };
        if !mission.is_in_progress() {
            return Err(MissionError::InvalidTransition(format!(
                "mission {} is {:?}",
                mission_id, mission.progress_state
            )));
        }
        self.definitions
            .get(mission_id)
            .cloned()
            .ok_or_else(|| MissionError::NotFound(format!("definition for mission {}", mission_id)))
    }

    fn activate_inner(
        &mut self,
        mission_id: &Tag,
        objective_id: &Tag,
        source: Option<&EventSource>,
        depth: usize,
    ) -> Result<(), MissionError> {
        check_tag(mission_id, "mission")?;
        check_tag(objective_id, "objective")?;
        let definition = self.running_definition(mission_id)?;
        let Some(objective) = definition.objective(objective_id) else {
            return Err(MissionError::NotFound(format!(
                "objective {} in mission {}",
                objective_id, mission_id
            )));
        };
        let Some(mission) = self.active.get_mut(mission_id) else {
            return Err(MissionError::NotFound(format!("active mission {}", mission_id)));
        };
        if mission.is_objective_completed(objective_id) {
            return Err(MissionError::InvalidTransition(format!(
                "objective {}/{} already completed",
                mission_id, objective_id
            )));
        }

        let succeeded = succeeded_objectives(mission);
        let mut state = ObjectiveRuntimeState::new(objective_id.clone());
        let mut ctx = RuleContext {
            mission_id,
            objective_id,
            source,
            history: &self.history,
            primary_actor: &self.config.primary_actor,
            succeeded_objectives: &succeeded,
            actions: &mut *self.actions,
        };
        objective.rule.initialize_runtime(&mut state, &mut ctx);
        let already_done = objective.rule.is_complete(&state);
        if mission
            .active_objectives
            .insert(objective_id.clone(), state)
            .is_some()
        {
            debug!("objective {}/{} restarted", mission_id, objective_id);
        }

        info!(
            "objective {}/{} started ({})",
            mission_id,
            objective_id,
            objective.rule.kind()
        );
        let context = ActionContext::new(mission_id, objective_id, ActionPhase::ObjectiveStart)
            .with_source(source);
        run_actions(&mut *self.actions, &objective.start_actions, &context);
        self.observers.publish(&MissionNotification::ObjectiveStarted {
            mission_id: mission_id.clone(),
            objective_id: objective_id.clone(),
        });

        if already_done {
            debug!(
                "objective {}/{} satisfied on activation",
                mission_id, objective_id
            );
            self.complete_inner(mission_id, objective_id, true, source, depth)?;
        }
        Ok(())
    }

    /// Force an active objective into a terminal state.
    pub fn complete_objective(
        &mut self,
        mission_id: &Tag,
        objective_id: &Tag,
        success: bool,
    ) -> Result<(), MissionError> {
        self.complete_inner(mission_id, objective_id, success, None, 0)
            .or_else(rejected)
    }

    fn complete_inner(
        &mut self,
        mission_id: &Tag,
        objective_id: &Tag,
        success: bool,
        source: Option<&EventSource>,
        depth: usize,
    ) -> Result<(), MissionError> {
        check_tag(mission_id, "mission")?;
        check_tag(objective_id, "objective")?;
        let definition = self.running_definition(mission_id)?;
        if depth > definition.objectives.len() {
            return Err(MissionError::InvalidTransition(format!(
                "completion chain in mission {} deeper than its {} objectives",
                mission_id,
                definition.objectives.len()
            )));
        }
        let Some(objective) = definition.objective(objective_id) else {
            return Err(MissionError::NotFound(format!(
                "objective {} in mission {}",
                objective_id, mission_id
            )));
        };
        let Some(mission) = self.active.get_mut(mission_id) else {
            return Err(MissionError::NotFound(format!("active mission {}", mission_id)));
        };
        let in_progress = mission
            .active_objectives
            .get(objective_id)
            .is_some_and(ObjectiveRuntimeState::is_in_progress);
        if !in_progress {
            let why = if mission.is_objective_completed(objective_id) {
                "already completed"
            } else {
                "not active"
            };
            return Err(MissionError::InvalidTransition(format!(
                "objective {}/{} {}",
                mission_id, objective_id, why
            )));
        }

        mission.active_objectives.remove(objective_id);
        mission.completed_objective_ids.insert(objective_id.clone());
        if !success {
            mission.failed_objective_ids.insert(objective_id.clone());
        }
        info!(
            "objective {}/{} {}",
            mission_id,
            objective_id,
            if success { "completed" } else { "failed" }
        );
        self.observers.publish(&MissionNotification::ObjectiveCompleted {
            mission_id: mission_id.clone(),
            objective_id: objective_id.clone(),
            success,
        });

        if success {
            let context = ActionContext::new(mission_id, objective_id, ActionPhase::ObjectiveComplete)
                .with_source(source);
            run_actions(&mut *self.actions, &objective.complete_actions, &context);

            self.notify_siblings(&definition, mission_id, objective_id, source, depth);

            for next in &objective.next_objective_ids {
                let Some(mission) = self.active.get(mission_id) else {
                    break;
                };
                if mission.active_objectives.contains_key(next) || mission.is_objective_completed(next) {
                    debug!("{}/{} already reached; not reactivating", mission_id, next);
                    continue;
                }
                if let Err(e) = self.activate_inner(mission_id, next, source, depth + 1) {
                    warn!(
                        "could not activate {}/{} after {}: {}",
                        mission_id, next, objective_id, e
                    );
                }
            }
        }

        self.finish_if_done(mission_id);
        Ok(())
    }

    /// Tell still-running siblings that `completed_id` succeeded, completing
    /// any that become satisfied.
    fn notify_siblings(
        &mut self,
        definition: &MissionDefinition,
        mission_id: &Tag,
        completed_id: &Tag,
        source: Option<&EventSource>,
        depth: usize,
    ) {
        for sibling in &definition.objectives {
            if &sibling.id == completed_id {
                continue;
            }
            let Some(mission) = self.active.get_mut(mission_id) else {
                break;
            };
            let Some(state) = mission.active_objectives.get_mut(&sibling.id) else {
                continue;
            };
            if !state.is_in_progress() {
                continue;
            }
            if sibling.rule.on_objective_completed(completed_id, state) && sibling.rule.is_complete(state) {
                debug!(
                    "{}/{} satisfied by completion of {}",
                    mission_id, sibling.id, completed_id
                );
                if let Err(e) = self.complete_inner(mission_id, &sibling.id, true, source, depth + 1) {
                    warn!(
                        "could not complete {}/{} after {}: {}",
                        mission_id, sibling.id, completed_id, e
                    );
                }
            }
        }
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    /// Fan an event out to every running objective.
    ///
    /// Missions and objectives are those running when the call begins;
    /// objectives activated by this event do not see it.
    pub fn emit_event(&mut self, source: &EventSource, event_tag: &Tag) -> Result<(), MissionError> {
        check_tag(event_tag, "event").or_else(rejected)?;
        debug!("event {} from '{}'", event_tag, escape_log(&source.id));
        self.observers.publish(&MissionNotification::EventBroadcast {
            event_tag: event_tag.clone(),
            source: source.clone(),
        });

        let mission_ids: Vec<Tag> = self.active.keys().cloned().collect();
        for mission_id in mission_ids {
            let Some(definition) = self.definitions.get(&mission_id).cloned() else {
                debug!("mission {} has no resolved definition; skipping", mission_id);
                continue;
            };
            let listening: BTreeSet<Tag> = match self.active.get(&mission_id) {
                Some(mission) => mission.active_objectives.keys().cloned().collect(),
                None => continue,
            };

            for objective in &definition.objectives {
                if !listening.contains(&objective.id) {
                    continue;
                }
                let Some(mission) = self.active.get_mut(&mission_id) else {
                    break;
                };
                if !mission.is_in_progress() {
                    break;
                }
                let succeeded = succeeded_objectives(mission);
                let Some(state) = mission.active_objectives.get_mut(&objective.id) else {
                    continue;
                };
                if !state.is_in_progress() {
                    continue;
                }

                let mut ctx = RuleContext {
                    mission_id: &mission_id,
                    objective_id: &objective.id,
                    source: Some(source),
                    history: &self.history,
                    primary_actor: &self.config.primary_actor,
                    succeeded_objectives: &succeeded,
                    actions: &mut *self.actions,
                };
                if !objective.rule.on_event(event_tag, state, &mut ctx) {
                    continue;
                }
                let done = objective.rule.is_complete(state);
                debug!(
                    "{}/{} consumed {}{}",
                    mission_id,
                    objective.id,
                    event_tag,
                    if done { " and is complete" } else { "" }
                );
                if done {
                    if let Err(e) = self.complete_inner(&mission_id, &objective.id, true, Some(source), 0) {
                        warn!("completing {}/{} failed: {}", mission_id, objective.id, e);
                    }
                }
            }
        }

        if self.config.record_event_history {
            self.history.record(event_tag, source);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn is_mission_active(&self, mission_id: &Tag) -> bool {
        self.active
            .get(mission_id)
            .is_some_and(MissionRuntimeState::is_in_progress)
    }

    /// `NotStarted` for unknown and still-loading missions; archived missions
    /// report how they ended.
    pub fn mission_state(&self, mission_id: &Tag) -> ProgressState {
        self.mission_runtime(mission_id)
            .map(|mission| mission.progress_state)
            .unwrap_or_default()
    }

    pub fn is_objective_active(&self, mission_id: &Tag, objective_id: &Tag) -> bool {
        self.objective_runtime(mission_id, objective_id)
            .is_some_and(ObjectiveRuntimeState::is_in_progress)
    }

    pub fn objective_state(&self, mission_id: &Tag, objective_id: &Tag) -> ProgressState {
        let Some(mission) = self.mission_runtime(mission_id) else {
            return ProgressState::NotStarted;
        };
        if let Some(state) = mission.active_objectives.get(objective_id) {
            return state.progress_state;
        }
        if mission.failed_objective_ids.contains(objective_id) {
            ProgressState::Failed
        } else if mission.is_objective_completed(objective_id) {
            ProgressState::Completed
        } else {
            ProgressState::NotStarted
        }
    }

    /// First running mission whose definition declares `objective_id`.
    pub fn find_mission_by_objective(&self, objective_id: &Tag) -> Option<&Tag> {
        self.active.keys().find(|mission_id| {
            self.definitions
                .get(*mission_id)
                .is_some_and(|definition| definition.contains_objective(objective_id))
        })
    }

    pub fn active_missions(&self) -> &BTreeMap<Tag, MissionRuntimeState> {
        &self.active
    }

    pub fn completed_missions(&self) -> &BTreeMap<Tag, MissionRuntimeState> {
        &self.completed
    }

    /// Runtime state of a running mission, or the archived state of a
    /// finished one.
    pub fn mission_runtime(&self, mission_id: &Tag) -> Option<&MissionRuntimeState> {
        self.active
            .get(mission_id)
            .or_else(|| self.completed.get(mission_id))
    }

    pub fn objective_runtime(&self, mission_id: &Tag, objective_id: &Tag) -> Option<&ObjectiveRuntimeState> {
        self.active.get(mission_id)?.active_objectives.get(objective_id)
    }

    pub fn is_loading(&self, mission_id: &Tag) -> bool {
        self.pending_starts.contains(mission_id)
    }

    pub fn definition(&self, mission_id: &Tag) -> Option<Arc<MissionDefinition>> {
        self.definitions.get(mission_id).cloned()
    }

    pub fn history(&self) -> &EventHistory {
        &self.history
    }

    /// Drop all runtime state. With `clear_definitions`, cached definitions
    /// go too and will be resolved again on the next start.
    pub fn reset(&mut self, clear_definitions: bool) {
        self.active.clear();
        self.completed.clear();
        self.history.clear();
        self.pending_starts.clear();
        self.loader.forget_in_flight();
        if clear_definitions {
            self.definitions.clear();
            self.loader.clear_cache();
        }
        info!("mission runtime reset");
    }

    // ---------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------

    pub fn save_snapshot(&self) -> MissionSnapshot {
        MissionSnapshot::new(self.active.clone(), self.completed.clone(), self.history.clone())
    }

    /// Replace all runtime state with `snapshot` and re-resolve every
    /// mission definition it references. Missions whose definition cannot be
    /// resolved keep their state but do not react to events.
    pub fn restore_snapshot(&mut self, snapshot: MissionSnapshot) -> Result<(), MissionError> {
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return rejected(MissionError::SchemaMismatch {
                entity: "snapshot",
                expected: SNAPSHOT_SCHEMA_VERSION,
                found: snapshot.schema_version,
            });
        }

        let mission_ids = snapshot.mission_ids();
        self.pending_starts.clear();
        self.active = snapshot.active_missions;
        self.completed = snapshot.completed_missions;
        self.history = snapshot.event_history;

        for mission_id in mission_ids {
            match self.loader.resolve_now(&mission_id) {
                Ok(definition) => {
                    self.definitions.insert(mission_id, definition);
                }
                Err(e) => warn!("restored mission {} has no definition: {}", mission_id, e),
            }
        }
        info!(
            "restored {} active and {} completed missions",
            self.active.len(),
            self.completed.len()
        );
        Ok(())
    }

    pub fn save_to(&self, store: &SaveStore, slot: &str) -> Result<(), MissionError> {
        store.put_snapshot(slot, &self.save_snapshot())
    }

    pub fn load_from(&mut self, store: &SaveStore, slot: &str) -> Result<(), MissionError> {
        let snapshot = store.get_snapshot(slot)?;
        self.restore_snapshot(snapshot)
    }

    /// Save into the store's default slot.
    pub fn autosave(&self, store: &SaveStore) -> Result<(), MissionError> {
        self.save_to(store, store.default_slot())
    }

    pub fn load_autosave(&mut self, store: &SaveStore) -> Result<(), MissionError> {
        self.load_from(store, store.default_slot())
    }
}
