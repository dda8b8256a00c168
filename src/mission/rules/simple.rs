use serde::{Deserialize, Serialize};

use super::{ObjectiveRule, RuleContext};
use crate::mission::tag::{Tag, TagMatch};
use crate::mission::types::{ObjectiveRuntimeState, ProgressState};

const DONE_KEY: &str = "IsDone";

/// Wait for one event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimpleRule {
    pub target_event: Tag,
    #[serde(default)]
    pub matching: TagMatch,
    /// Complete on activation if the event already happened earlier.
    #[serde(default)]
    pub count_past_events: bool,
}

impl SimpleRule {
    pub fn new(target_event: Tag) -> Self {
        Self {
            target_event,
            matching: TagMatch::Exact,
            count_past_events: false,
        }
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

impl ObjectiveRule for SimpleRule {
    fn initialize_runtime(&self, state: &mut ObjectiveRuntimeState, ctx: &mut RuleContext<'_>) {
        state.progress_state = ProgressState::InProgress;
        if self.count_past_events && ctx.history.count(&self.target_event, self.matching) >= 1 {
            state.raise_flag(DONE_KEY);
        }
    }

    fn on_event(
        &self,
        event_tag: &Tag,
        state: &mut ObjectiveRuntimeState,
        _ctx: &mut RuleContext<'_>,
    ) -> bool {
        event_tag.matches_with(&self.target_event, self.matching) && state.raise_flag(DONE_KEY)
    }

    fn is_complete(&self, state: &ObjectiveRuntimeState) -> bool {
        state.flag(DONE_KEY)
    }
}
