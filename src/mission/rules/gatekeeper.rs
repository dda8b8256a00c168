use serde::{Deserialize, Serialize};

use super::{ObjectiveRule, RuleContext};
use crate::mission::tag::Tag;
use crate::mission::types::{ObjectiveRuntimeState, ProgressState};

/// Fan-in point: completes once every listed sibling objective has
/// completed successfully. Ordinary events are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatekeeperRule {
    pub required_objectives: Vec<Tag>,
}

impl GatekeeperRule {
    pub fn new(required_objectives: impl IntoIterator<Item = Tag>) -> Self {
        Self {
            required_objectives: required_objectives.into_iter().collect(),
        }
    }
}

impl ObjectiveRule for GatekeeperRule {
    /// Siblings that finished before this objective activated count as
    /// already satisfied.
    fn initialize_runtime(&self, state: &mut ObjectiveRuntimeState, ctx: &mut RuleContext<'_>) {
        state.progress_state = ProgressState::InProgress;
        for required in &self.required_objectives {
            if ctx.succeeded_objectives.contains(required) {
                state.raise_flag(required.as_str());
            }
        }
    }

    fn on_event(&self, _: &Tag, _: &mut ObjectiveRuntimeState, _: &mut RuleContext<'_>) -> bool {
        false
    }

    fn on_objective_completed(&self, completed_id: &Tag, state: &mut ObjectiveRuntimeState) -> bool {
        self.required_objectives.contains(completed_id) && state.raise_flag(completed_id.as_str())
    }

    fn is_complete(&self, state: &ObjectiveRuntimeState) -> bool {
        self.required_objectives
            .iter()
            .all(|required| state.flag(required.as_str()))
    }
}
