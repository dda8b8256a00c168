use serde::{Deserialize, Serialize};

use super::{ObjectiveRule, RuleContext};
use crate::mission::tag::{Tag, TagMatch};
use crate::mission::types::ObjectiveRuntimeState;

/// Observe every listed event at least once, in any order.
///
/// Each required tag owns a flag keyed by its dotted path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChecklistRule {
    pub required_tags: Vec<Tag>,
    #[serde(default)]
    pub matching: TagMatch,
}

impl ChecklistRule {
    pub fn new(required_tags: impl IntoIterator<Item = Tag>) -> Self {
        Self {
            required_tags: required_tags.into_iter().collect(),
            matching: TagMatch::Exact,
        }
    }
}

impl ObjectiveRule for ChecklistRule {
    fn on_event(
        &self,
        event_tag: &Tag,
        state: &mut ObjectiveRuntimeState,
        _ctx: &mut RuleContext<'_>,
    ) -> bool {
        let mut changed = false;
        for required in &self.required_tags {
            if event_tag.matches_with(required, self.matching) {
                changed |= state.raise_flag(required.as_str());
            }
        }
        changed
    }

    fn is_complete(&self, state: &ObjectiveRuntimeState) -> bool {
        self.required_tags
            .iter()
            .all(|required| state.flag(required.as_str()))
    }
}
