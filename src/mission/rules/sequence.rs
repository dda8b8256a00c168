//! Ordered multi-step objectives.
//!
//! Only the step under `current_step_index` listens to events. A step is
//! done when each of its requirements reached its count; the rule then runs
//! the step's complete actions, moves the cursor and runs the next step's
//! start actions. A step without requirements is satisfied the moment the
//! cursor enters it.

use log::debug;
use serde::{Deserialize, Serialize};

use super::{ObjectiveRule, RuleContext};
use crate::mission::action::{run_actions, Action, ActionContext, ActionPhase};
use crate::mission::tag::Tag;
use crate::mission::types::{ObjectiveRuntimeState, ProgressState};

fn default_count() -> u32 {
    1
}

/// One event a step waits for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRequirement {
    pub event: Tag,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub require_unique_sources: bool,
}

impl StepRequirement {
    pub fn new(event: Tag, count: u32) -> Self {
        Self {
            event,
            count,
            require_unique_sources: false,
        }
    }

    pub fn unique_sources(mut self) -> Self {
        self.require_unique_sources = true;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepDefinition {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_actions: Vec<Action>,
    #[serde(default)]
    pub complete_actions: Vec<Action>,
    #[serde(default)]
    pub requirements: Vec<StepRequirement>,
}

impl StepDefinition {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            description: String::new(),
            start_actions: Vec::new(),
            complete_actions: Vec::new(),
            requirements: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_requirement(mut self, requirement: StepRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn with_start_action(mut self, action: Action) -> Self {
        self.start_actions.push(action);
        self
    }

    pub fn with_complete_action(mut self, action: Action) -> Self {
        self.complete_actions.push(action);
        self
    }

    fn is_satisfied(&self, state: &ObjectiveRuntimeState) -> bool {
        let step = state.step(&self.id);
        self.requirements.iter().all(|req| {
            step.map(|step| step.occurrences_of(&req.event)).unwrap_or(0) >= req.count
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SequenceRule {
    pub steps: Vec<StepDefinition>,
}

impl SequenceRule {
    pub fn new(steps: impl IntoIterator<Item = StepDefinition>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    pub fn current_step<'a>(&'a self, state: &ObjectiveRuntimeState) -> Option<&'a StepDefinition> {
        self.steps.get(state.current_step_index)
    }

    fn step_context(ctx: &RuleContext<'_>, step: &StepDefinition, phase: ActionPhase) -> ActionContext {
        ActionContext::new(ctx.mission_id, ctx.objective_id, phase)
            .with_step(&step.id)
            .with_source(ctx.source)
    }

    /// Run the start actions of the step under the cursor, then keep
    /// advancing through steps that have nothing left to wait for.
    fn enter_current_step(&self, state: &mut ObjectiveRuntimeState, ctx: &mut RuleContext<'_>) {
        while let Some(step) = self.steps.get(state.current_step_index) {
            let start = Self::step_context(ctx, step, ActionPhase::StepStart);
            run_actions(ctx.actions, &step.start_actions, &start);
            if !step.is_satisfied(state) {
                break;
            }
            self.finish_current_step(state, ctx);
        }
    }

    fn finish_current_step(&self, state: &mut ObjectiveRuntimeState, ctx: &mut RuleContext<'_>) {
        let Some(step) = self.steps.get(state.current_step_index) else {
            return;
        };
        state.step_mut(&step.id).completed = true;
        let complete = Self::step_context(ctx, step, ActionPhase::StepComplete);
        run_actions(ctx.actions, &step.complete_actions, &complete);
        state.current_step_index += 1;
        debug!(
            "{}/{}: step '{}' done, cursor at {}",
            ctx.mission_id, ctx.objective_id, step.id, state.current_step_index
        );
    }
}

impl ObjectiveRule for SequenceRule {
    fn initialize_runtime(&self, state: &mut ObjectiveRuntimeState, ctx: &mut RuleContext<'_>) {
        state.progress_state = ProgressState::InProgress;
        state.current_step_index = 0;
        for step in &self.steps {
            state.step_mut(&step.id);
        }
        self.enter_current_step(state, ctx);
    }

    fn on_event(
        &self,
        event_tag: &Tag,
        state: &mut ObjectiveRuntimeState,
        ctx: &mut RuleContext<'_>,
    ) -> bool {
        let Some(step) = self.steps.get(state.current_step_index) else {
            return false;
        };

        let mut progressed = false;
        for (index, req) in step.requirements.iter().enumerate() {
            if !event_tag.matches_exact(&req.event) {
                continue;
            }
            let step_state = state.step_mut(&step.id);
            if req.require_unique_sources {
                let Some(source) = ctx.source.filter(|source| !source.is_anonymous()) else {
                    continue;
                };
                let marker = format!("{}:{}/{}", index, req.event, source.id);
                if !step_state.counted_sources.insert(marker) {
                    continue;
                }
            }
            let seen = step_state.occurrences.entry(req.event.clone()).or_insert(0);
            *seen = seen.saturating_add(1);
            progressed = true;
        }

        if progressed && step.is_satisfied(state) {
            self.finish_current_step(state, ctx);
            self.enter_current_step(state, ctx);
        }
        progressed
    }

    fn is_complete(&self, state: &ObjectiveRuntimeState) -> bool {
        state.current_step_index >= self.steps.len()
    }
}
