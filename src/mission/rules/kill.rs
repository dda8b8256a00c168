use serde::{Deserialize, Serialize};

use super::counter::{count_occurrence, saturating_i32};
use super::{ObjectiveRule, RuleContext};
use crate::mission::tag::{Tag, TagMatch};
use crate::mission::types::{ObjectiveRuntimeState, ProgressState};

const KILL_KEY: &str = "KillCount";

fn default_true() -> bool {
    true
}

/// Counter restricted to a death event, optionally counting only deaths
/// caused by the primary actor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KillCounterRule {
    pub death_event: Tag,
    pub required_kills: u32,
    #[serde(default = "default_true")]
    pub require_primary_source: bool,
    #[serde(default)]
    pub matching: TagMatch,
    #[serde(default)]
    pub count_past_events: bool,
}

impl KillCounterRule {
    pub fn new(death_event: Tag, required_kills: u32) -> Self {
        Self {
            death_event,
            required_kills,
            require_primary_source: true,
            matching: TagMatch::Exact,
            count_past_events: false,
        }
    }

    pub fn any_source(mut self) -> Self {
        self.require_primary_source = false;
        self
    }

    pub fn hierarchical(mut self) -> Self {
        self.matching = TagMatch::Hierarchical;
        self
    }

    pub fn counting_past_events(mut self) -> Self {
        self.count_past_events = true;
        self
    }
}

impl ObjectiveRule for KillCounterRule {
    fn initialize_runtime(&self, state: &mut ObjectiveRuntimeState, ctx: &mut RuleContext<'_>) {
        state.progress_state = ProgressState::InProgress;
        if !self.count_past_events {
            return;
        }
        let past = if self.require_primary_source {
            ctx.history
                .count_from(&self.death_event, self.matching, ctx.primary_actor)
        } else {
            ctx.history.count(&self.death_event, self.matching)
        };
        state.set_int(KILL_KEY, saturating_i32(past));
    }

    fn on_event(
        &self,
        event_tag: &Tag,
        state: &mut ObjectiveRuntimeState,
        ctx: &mut RuleContext<'_>,
    ) -> bool {
        if !event_tag.matches_with(&self.death_event, self.matching) {
            return false;
        }
        if self.require_primary_source {
            let attributable = ctx
                .source
                .is_some_and(|source| !source.is_anonymous() && source.id == ctx.primary_actor);
            if !attributable {
                return false;
            }
        }
        count_occurrence(state, KILL_KEY, ctx.source, false)
    }

    fn is_complete(&self, state: &ObjectiveRuntimeState) -> bool {
        state.int(KILL_KEY) >= saturating_i32(self.required_kills)
    }
}
