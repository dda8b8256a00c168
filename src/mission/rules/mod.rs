//! Completion rules for objectives.
//!
//! Every objective carries one [`CompletionRule`]. A rule owns only its
//! configuration; all progress lives in the objective's
//! [`ObjectiveRuntimeState`], which is the same shape for every variant.
//! The engine talks to rules exclusively through the four hooks of
//! [`ObjectiveRule`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::mission::action::ActionHandler;
use crate::mission::history::EventHistory;
use crate::mission::tag::Tag;
use crate::mission::types::{EventSource, ObjectiveRuntimeState, ProgressState};

pub mod checklist;
pub mod counter;
pub mod gatekeeper;
pub mod kill;
pub mod sequence;
pub mod simple;

pub use checklist::ChecklistRule;
pub use counter::CounterRule;
pub use gatekeeper::GatekeeperRule;
pub use kill::KillCounterRule;
pub use sequence::{SequenceRule, StepDefinition, StepRequirement};
pub use simple::SimpleRule;

/// What a rule may look at (and trigger) while a hook runs.
pub struct RuleContext<'a> {
    pub mission_id: &'a Tag,
    pub objective_id: &'a Tag,
    /// Source of the event being processed, if any.
    pub source: Option<&'a EventSource>,
    pub history: &'a EventHistory,
    /// Source identity the kill counter treats as the primary actor.
    pub primary_actor: &'a str,
    /// Sibling objectives of the same mission that already completed successfully.
    pub succeeded_objectives: &'a BTreeSet<Tag>,
    /// Step actions of sequence objectives run through this handler.
    pub actions: &'a mut dyn ActionHandler,
}

/// The four hooks every completion rule implements.
pub trait ObjectiveRule {
    /// Prepare freshly created state. Must leave it `InProgress`.
    fn initialize_runtime(&self, state: &mut ObjectiveRuntimeState, _ctx: &mut RuleContext<'_>) {
        state.progress_state = ProgressState::InProgress;
    }

    /// React to an emitted event; returns true if `state` changed.
    fn on_event(
        &self,
        event_tag: &Tag,
        state: &mut ObjectiveRuntimeState,
        ctx: &mut RuleContext<'_>,
    ) -> bool;

    /// React to a sibling objective completing successfully; returns true if
    /// `state` changed.
    fn on_objective_completed(&self, _completed_id: &Tag, _state: &mut ObjectiveRuntimeState) -> bool {
        false
    }

    fn is_complete(&self, state: &ObjectiveRuntimeState) -> bool;
}

/// Completes only when the host calls `complete_objective` itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ManualRule {}

impl ObjectiveRule for ManualRule {
    fn on_event(&self, _: &Tag, _: &mut ObjectiveRuntimeState, _: &mut RuleContext<'_>) -> bool {
        false
    }

    fn is_complete(&self, _state: &ObjectiveRuntimeState) -> bool {
        false
    }
}

/// Tagged union of the rule variants, as written in content files:
///
/// ```json
/// { "kind": "counter", "target_event": "Crate.Broken", "target_count": 3 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletionRule {
    Simple(SimpleRule),
    Counter(CounterRule),
    Checklist(ChecklistRule),
    Sequence(SequenceRule),
    Gatekeeper(GatekeeperRule),
    KillCounter(KillCounterRule),
    Manual(ManualRule),
}

impl CompletionRule {
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionRule::Simple(_) => "simple",
            CompletionRule::Counter(_) => "counter",
            CompletionRule::Checklist(_) => "checklist",
            CompletionRule::Sequence(_) => "sequence",
            CompletionRule::Gatekeeper(_) => "gatekeeper",
            CompletionRule::KillCounter(_) => "kill_counter",
            CompletionRule::Manual(_) => "manual",
        }
    }

    fn as_rule(&self) -> &dyn ObjectiveRule {
        match self {
            CompletionRule::Simple(rule) => rule,
            CompletionRule::Counter(rule) => rule,
            CompletionRule::Checklist(rule) => rule,
            CompletionRule::Sequence(rule) => rule,
            CompletionRule::Gatekeeper(rule) => rule,
            CompletionRule::KillCounter(rule) => rule,
            CompletionRule::Manual(rule) => rule,
        }
    }
}

impl ObjectiveRule for CompletionRule {
    fn initialize_runtime(&self, state: &mut ObjectiveRuntimeState, ctx: &mut RuleContext<'_>) {
        self.as_rule().initialize_runtime(state, ctx)
    }

    fn on_event(
        &self,
        event_tag: &Tag,
        state: &mut ObjectiveRuntimeState,
        ctx: &mut RuleContext<'_>,
    ) -> bool {
        self.as_rule().on_event(event_tag, state, ctx)
    }

    fn on_objective_completed(&self, completed_id: &Tag, state: &mut ObjectiveRuntimeState) -> bool {
        self.as_rule().on_objective_completed(completed_id, state)
    }

    fn is_complete(&self, state: &ObjectiveRuntimeState) -> bool {
        self.as_rule().is_complete(state)
    }
}

impl From<SimpleRule> for CompletionRule {
    fn from(rule: SimpleRule) -> Self {
        Self::Simple(rule)
    }
}

impl From<CounterRule> for CompletionRule {
    fn from(rule: CounterRule) -> Self {
        Self::Counter(rule)
    }
}

impl From<ChecklistRule> for CompletionRule {
    fn from(rule: ChecklistRule) -> Self {
        Self::Checklist(rule)
    }
}

impl From<SequenceRule> for CompletionRule {
    fn from(rule: SequenceRule) -> Self {
        Self::Sequence(rule)
    }
}

impl From<GatekeeperRule> for CompletionRule {
    fn from(rule: GatekeeperRule) -> Self {
        Self::Gatekeeper(rule)
    }
}

impl From<KillCounterRule> for CompletionRule {
    fn from(rule: KillCounterRule) -> Self {
        Self::KillCounter(rule)
    }
}

impl From<ManualRule> for CompletionRule {
    fn from(rule: ManualRule) -> Self {
        Self::Manual(rule)
    }
}
