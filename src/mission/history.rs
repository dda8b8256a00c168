use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mission::tag::{Tag, TagMatch};
use crate::mission::types::EventSource;

/// Occurrences of one event tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagHistory {
    pub total: u32,
    /// Per non-anonymous source id.
    pub by_source: BTreeMap<String, u32>,
}

/// Record of every event emitted so far in the playthrough.
///
/// Rules with `count_past_events` read it when they activate, so an
/// objective that asks for something the player already did can complete
/// on the spot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventHistory {
    tags: BTreeMap<Tag, TagHistory>,
}

impl EventHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, tag: &Tag, source: &EventSource) {
        let entry = self.tags.entry(tag.clone()).or_default();
        entry.total = entry.total.saturating_add(1);
        if !source.is_anonymous() {
            let count = entry.by_source.entry(source.id.clone()).or_insert(0);
            *count = count.saturating_add(1);
        }
    }

    fn matching<'a>(&'a self, tag: &'a Tag, policy: TagMatch) -> impl Iterator<Item = &'a TagHistory> {
        self.tags
            .iter()
            .filter(move |(seen, _)| seen.matches_with(tag, policy))
            .map(|(_, history)| history)
    }

    /// Total occurrences of `tag` (or its descendants, under `Hierarchical`).
    pub fn count(&self, tag: &Tag, policy: TagMatch) -> u32 {
        self.matching(tag, policy)
            .fold(0u32, |acc, history| acc.saturating_add(history.total))
    }

    /// Occurrences of `tag` caused by one source.
    pub fn count_from(&self, tag: &Tag, policy: TagMatch, source_id: &str) -> u32 {
        self.matching(tag, policy)
            .filter_map(|history| history.by_source.get(source_id))
            .fold(0u32, |acc, count| acc.saturating_add(*count))
    }

    /// Distinct non-anonymous sources that caused `tag`.
    pub fn distinct_sources(&self, tag: &Tag, policy: TagMatch) -> Vec<String> {
        let mut sources: Vec<String> = self
            .matching(tag, policy)
            .flat_map(|history| history.by_source.keys().cloned())
            .collect();
        sources.sort();
        sources.dedup();
        sources
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }
}
