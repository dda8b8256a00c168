//! Immutable mission content.
//!
//! Definitions are loaded once, validated, and shared behind `Arc` by every
//! runtime state that references them. Nothing here changes at runtime.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::mission::action::Action;
use crate::mission::errors::MissionError;
use crate::mission::rules::{CompletionRule, ManualRule};
use crate::mission::tag::Tag;

pub use crate::mission::rules::{StepDefinition, StepRequirement};

/// One unit of progress inside a mission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectiveDefinition {
    pub id: Tag,
    #[serde(default)]
    pub description: String,
    /// Activate when the owning mission starts.
    #[serde(default)]
    pub auto_start: bool,
    #[serde(default)]
    pub start_actions: Vec<Action>,
    #[serde(default)]
    pub complete_actions: Vec<Action>,
    /// Activated, in order, after this objective succeeds.
    #[serde(default)]
    pub next_objective_ids: Vec<Tag>,
    pub rule: CompletionRule,
}

impl ObjectiveDefinition {
    pub fn new(id: Tag, rule: impl Into<CompletionRule>) -> Self {
        Self {
            id,
            description: String::new(),
            auto_start: false,
            start_actions: Vec::new(),
            complete_actions: Vec::new(),
            next_objective_ids: Vec::new(),
            rule: rule.into(),
        }
    }

    /// Objective that only completes through an explicit `complete_objective`.
    pub fn manual(id: Tag) -> Self {
        Self::new(id, ManualRule::default())
    }

    pub fn auto_start(mut self) -> Self {
        self.auto_start = true;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
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

    pub fn then(mut self, next: Tag) -> Self {
        self.next_objective_ids.push(next);
        self
    }
}

/// Ordered objectives plus an optional follow-up mission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionDefinition {
    pub id: Tag,
    #[serde(default)]
    pub title: String,
    pub objectives: Vec<ObjectiveDefinition>,
    /// Started automatically when this mission finishes successfully.
    #[serde(default)]
    pub next_mission_id: Option<Tag>,
}

impl MissionDefinition {
    pub fn new(id: Tag) -> Self {
        Self {
            id,
            title: String::new(),
            objectives: Vec::new(),
            next_mission_id: None,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_objective(mut self, objective: ObjectiveDefinition) -> Self {
        self.objectives.push(objective);
        self
    }

    pub fn then_mission(mut self, next: Tag) -> Self {
        self.next_mission_id = Some(next);
        self
    }

    pub fn objective(&self, objective_id: &Tag) -> Option<&ObjectiveDefinition> {
        self.objectives.iter().find(|obj| &obj.id == objective_id)
    }

    pub fn contains_objective(&self, objective_id: &Tag) -> bool {
        self.objective(objective_id).is_some()
    }

    /// Follow-up mission, ignoring an empty link.
    pub fn next_mission(&self) -> Option<&Tag> {
        self.next_mission_id.as_ref().filter(|tag| tag.is_valid())
    }

    /// Structural checks run on every definition before it becomes resident.
    pub fn validate(&self) -> Result<(), MissionError> {
        if !self.id.is_valid() {
            return Err(MissionError::InvalidIdentifier(
                "mission definition without id".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for objective in &self.objectives {
            if !objective.id.is_valid() {
                return Err(MissionError::definition(&self.id, "objective without id"));
            }
            if !seen.insert(&objective.id) {
                return Err(MissionError::definition(
                    &self.id,
                    format!("duplicate objective '{}'", objective.id),
                ));
            }
        }

        for objective in &self.objectives {
            for next in &objective.next_objective_ids {
                if !seen.contains(next) {
                    return Err(MissionError::definition(
                        &self.id,
                        format!("'{}' links to unknown objective '{}'", objective.id, next),
                    ));
                }
            }
            self.validate_rule(objective, &seen)?;
        }
        Ok(())
    }

    fn validate_rule(
        &self,
        objective: &ObjectiveDefinition,
        known: &BTreeSet<&Tag>,
    ) -> Result<(), MissionError> {
        let fail = |reason: String| Err(MissionError::definition(&self.id, reason));
        match &objective.rule {
            CompletionRule::Simple(rule) if !rule.target_event.is_valid() => {
                fail(format!("'{}' has no target event", objective.id))
            }
            CompletionRule::Counter(rule) if !rule.target_event.is_valid() || rule.target_count == 0 => {
                fail(format!("'{}' needs a target event and a non-zero count", objective.id))
            }
            CompletionRule::KillCounter(rule)
                if !rule.death_event.is_valid() || rule.required_kills == 0 =>
            {
                fail(format!("'{}' needs a death event and a non-zero kill count", objective.id))
            }
            CompletionRule::Checklist(rule) if rule.required_tags.is_empty() => {
                fail(format!("checklist '{}' has no required tags", objective.id))
            }
            CompletionRule::Checklist(rule) if rule.required_tags.iter().any(|t| !t.is_valid()) => {
                fail(format!("'{}' lists an empty checklist tag", objective.id))
            }
            CompletionRule::Gatekeeper(rule) if rule.required_objectives.is_empty() => {
                fail(format!("gatekeeper '{}' waits on no objectives", objective.id))
            }
            CompletionRule::Gatekeeper(rule) => {
                for required in &rule.required_objectives {
                    if required == &objective.id || !known.contains(required) {
                        return fail(format!(
                            "gatekeeper '{}' waits on unknown objective '{}'",
                            objective.id, required
                        ));
                    }
                }
                Ok(())
            }
            CompletionRule::Sequence(rule) => {
                let mut step_ids = BTreeSet::new();
                for step in &rule.steps {
                    if step.id.is_empty() || !step_ids.insert(step.id.as_str()) {
                        return fail(format!(
                            "'{}' has an empty or duplicate step id '{}'",
                            objective.id, step.id
                        ));
                    }
                    if step.requirements.iter().any(|req| !req.event.is_valid()) {
                        return fail(format!(
                            "step '{}' of '{}' has a requirement without event",
                            step.id, objective.id
                        ));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
