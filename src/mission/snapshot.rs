use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mission::history::EventHistory;
use crate::mission::tag::Tag;
use crate::mission::types::{MissionRuntimeState, SNAPSHOT_SCHEMA_VERSION};

/// Persistence container for in-flight progress.
///
/// Holds identifiers and runtime counters only. Definitions are content and
/// are re-resolved by id when a snapshot is restored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionSnapshot {
    pub schema_version: u8,
    pub saved_at: DateTime<Utc>,
    pub active_missions: BTreeMap<Tag, MissionRuntimeState>,
    pub completed_missions: BTreeMap<Tag, MissionRuntimeState>,
    pub event_history: EventHistory,
}

impl MissionSnapshot {
    pub fn new(
        active_missions: BTreeMap<Tag, MissionRuntimeState>,
        completed_missions: BTreeMap<Tag, MissionRuntimeState>,
        event_history: EventHistory,
    ) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            saved_at: Utc::now(),
            active_missions,
            completed_missions,
            event_history,
        }
    }

    /// Every mission id the snapshot references, active ones first.
    pub fn mission_ids(&self) -> Vec<Tag> {
        let mut ids: Vec<Tag> = self.active_missions.keys().cloned().collect();
        for id in self.completed_missions.keys() {
            if !self.active_missions.contains_key(id) {
                ids.push(id.clone());
            }
        }
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.active_missions.is_empty() && self.completed_missions.is_empty()
    }
}

impl Default for MissionSnapshot {
    fn default() -> Self {
        Self::new(BTreeMap::new(), BTreeMap::new(), EventHistory::new())
    }
}
