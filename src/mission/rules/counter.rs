use serde::{Deserialize, Serialize};

use super::{ObjectiveRule, RuleContext};
use crate::mission::tag::{Tag, TagMatch};
use crate::mission::types::{EventSource, ObjectiveRuntimeState, ProgressState};

const COUNT_KEY: &str = "Count";

/// Observe an event `target_count` times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CounterRule {
    pub target_event: Tag,
    pub target_count: u32,
    /// Count each source identity at most once.
    #[serde(default)]
    pub require_unique_sources: bool,
    #[serde(default)]
    pub matching: TagMatch,
    #[serde(default)]
    pub count_past_events: bool,
}

impl CounterRule {
    pub fn new(target_event: Tag, target_count: u32) -> Self {
        Self {
            target_event,
            target_count,
            require_unique_sources: false,
            matching: TagMatch::Exact,
            count_past_events: false,
        }
    }

    pub fn unique_sources(mut self) -> Self {
        self.require_unique_sources = true;
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

/// Count one occurrence under `key`, deduplicating by source when asked.
///
/// Returns false when the occurrence was rejected as a repeat (or as an
/// anonymous source under the unique requirement).
pub(crate) fn count_occurrence(
    state: &mut ObjectiveRuntimeState,
    key: &str,
    source: Option<&EventSource>,
    require_unique_sources: bool,
) -> bool {
    if require_unique_sources {
        let Some(source) = source.filter(|source| !source.is_anonymous()) else {
            return false;
        };
        if !state.insert_string(source.id.clone()) {
            return false;
        }
    }
    state.increment(key);
    true
}

pub(crate) fn saturating_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl ObjectiveRule for CounterRule {
    fn initialize_runtime(&self, state: &mut ObjectiveRuntimeState, ctx: &mut RuleContext<'_>) {
        state.progress_state = ProgressState::InProgress;
        if !self.count_past_events {
            return;
        }
        if self.require_unique_sources {
            let sources = ctx.history.distinct_sources(&self.target_event, self.matching);
            let seen = u32::try_from(sources.len()).unwrap_or(u32::MAX);
            state.strings.extend(sources);
            state.set_int(COUNT_KEY, saturating_i32(seen));
        } else {
            let past = ctx.history.count(&self.target_event, self.matching);
            state.set_int(COUNT_KEY, saturating_i32(past));
        }
    }

    fn on_event(
        &self,
        event_tag: &Tag,
        state: &mut ObjectiveRuntimeState,
        ctx: &mut RuleContext<'_>,
    ) -> bool {
        if !event_tag.matches_with(&self.target_event, self.matching) {
            return false;
        }
        count_occurrence(state, COUNT_KEY, ctx.source, self.require_unique_sources)
    }

    fn is_complete(&self, state: &ObjectiveRuntimeState) -> bool {
        state.int(COUNT_KEY) >= saturating_i32(self.target_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::rules::testing::{tag, Harness};

    #[test]
    fn counts_to_threshold() {
        let mut h = Harness::new();
        let rule = CounterRule::new(tag("Crate.Broken"), 3);
        let mut state = ObjectiveRuntimeState::new(h.objective_id.clone());
        rule.initialize_runtime(&mut state, &mut h.ctx(None));

        let crate_a = EventSource::new("Crate_A");
        for _ in 0..2 {
            assert!(rule.on_event(&tag("Crate.Broken"), &mut state, &mut h.ctx(Some(&crate_a))));
        }
        assert!(!rule.is_complete(&state));
        assert!(rule.on_event(&tag("Crate.Broken"), &mut state, &mut h.ctx(Some(&crate_a))));
        assert!(rule.is_complete(&state));
    }

    #[test]
    fn unique_sources_dedup_by_identity() {
        let mut h = Harness::new();
        let rule = CounterRule::new(tag("Crate.Broken"), 2).unique_sources();
        let mut state = ObjectiveRuntimeState::new(h.objective_id.clone());
        rule.initialize_runtime(&mut state, &mut h.ctx(None));

        let a = EventSource::new("Crate_A");
        let b = EventSource::new("Crate_B");
        assert!(rule.on_event(&tag("Crate.Broken"), &mut state, &mut h.ctx(Some(&a))));
        assert!(!rule.on_event(&tag("Crate.Broken"), &mut state, &mut h.ctx(Some(&a))));
        assert!(!rule.on_event(&tag("Crate.Broken"), &mut state, &mut h.ctx(None)));
        assert!(!rule.is_complete(&state));
        assert!(rule.on_event(&tag("Crate.Broken"), &mut state, &mut h.ctx(Some(&b))));
        assert!(rule.is_complete(&state));
    }

    #[test]
    fn backfill_respects_uniqueness() {
        let mut h = Harness::new();
        for id in ["A", "A", "B"] {
            h.history.record(&tag("Crate.Broken"), &EventSource::new(id));
        }
        let mut state = ObjectiveRuntimeState::new(h.objective_id.clone());
        let plain = CounterRule::new(tag("Crate.Broken"), 3).counting_past_events();
        plain.initialize_runtime(&mut state, &mut h.ctx(None));
        assert!(plain.is_complete(&state));

        let mut state = ObjectiveRuntimeState::new(h.objective_id.clone());
        let unique = CounterRule::new(tag("Crate.Broken"), 3)
            .unique_sources()
            .counting_past_events();
        unique.initialize_runtime(&mut state, &mut h.ctx(None));
        assert_eq!(state.int(COUNT_KEY), 2);
        // "A" was already counted during backfill.
        let a = EventSource::new("A");
        assert!(!unique.on_event(&tag("Crate.Broken"), &mut state, &mut h.ctx(Some(&a))));
    }
}
