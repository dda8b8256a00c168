use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mission::tag::Tag;

pub const SNAPSHOT_SCHEMA_VERSION: u8 = 1;

/// Lifecycle of a mission or objective instance.
///
/// `NotStarted -> InProgress` is the only entry transition; `Completed` and
/// `Failed` are terminal for the instance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl ProgressState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn from_success(success: bool) -> Self {
        if success {
            Self::Completed
        } else {
            Self::Failed
        }
    }
}

/// Who caused an event.
///
/// The id is the stable identity unique-source rules deduplicate on. An empty
/// id is an anonymous source, which unique-source rules never count.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventSource {
    pub id: String,
}

impl EventSource {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.id.is_empty()
    }
}

impl From<&str> for EventSource {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Progress inside one step of a sequence objective.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StepRuntimeState {
    /// `"<requirement index>:<tag>/<source id>"` markers for unique-source requirements.
    pub counted_sources: BTreeSet<String>,
    /// Occurrences seen per requirement tag.
    pub occurrences: BTreeMap<Tag, u32>,
    pub completed: bool,
}

impl StepRuntimeState {
    pub fn occurrences_of(&self, tag: &Tag) -> u32 {
        self.occurrences.get(tag).copied().unwrap_or(0)
    }
}

/// Mutable progress of one active objective.
///
/// Every completion rule stores its progress in the same generic maps, so
/// the engine handles a single state shape regardless of rule variant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObjectiveRuntimeState {
    pub objective_id: Tag,
    pub progress_state: ProgressState,
    pub ints: BTreeMap<String, i32>,
    pub flags: BTreeMap<String, bool>,
    pub floats: BTreeMap<String, f32>,
    /// Seen-source markers and other unique strings.
    pub strings: BTreeSet<String>,
    pub current_step_index: usize,
    /// Keyed by step id.
    pub steps: BTreeMap<String, StepRuntimeState>,
}

impl ObjectiveRuntimeState {
    pub fn new(objective_id: Tag) -> Self {
        Self {
            objective_id,
            ..Self::default()
        }
    }

    pub fn int(&self, key: &str) -> i32 {
        self.ints.get(key).copied().unwrap_or(0)
    }

    pub fn set_int(&mut self, key: &str, value: i32) {
        self.ints.insert(key.to_string(), value);
    }

    /// Increment a counter and return its new value.
    pub fn increment(&mut self, key: &str) -> i32 {
        let slot = self.ints.entry(key.to_string()).or_insert(0);
        *slot = slot.saturating_add(1);
        *slot
    }

    pub fn flag(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    /// Set a flag, returning true if it was previously unset.
    pub fn raise_flag(&mut self, key: &str) -> bool {
        !self.flags.insert(key.to_string(), true).unwrap_or(false)
    }

    pub fn float(&self, key: &str) -> f32 {
        self.floats.get(key).copied().unwrap_or(0.0)
    }

    pub fn set_float(&mut self, key: &str, value: f32) {
        self.floats.insert(key.to_string(), value);
    }

    pub fn has_string(&self, value: &str) -> bool {
        self.strings.contains(value)
    }

    /// Insert a string marker, returning true if it was new.
    pub fn insert_string(&mut self, value: impl Into<String>) -> bool {
        self.strings.insert(value.into())
    }

    pub fn step(&self, step_id: &str) -> Option<&StepRuntimeState> {
        self.steps.get(step_id)
    }

    pub fn step_mut(&mut self, step_id: &str) -> &mut StepRuntimeState {
        self.steps.entry(step_id.to_string()).or_default()
    }

    pub fn is_in_progress(&self) -> bool {
        self.progress_state == ProgressState::InProgress
    }
}

/// Mutable progress of one mission, from `StartMission` to the archive.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MissionRuntimeState {
    pub mission_id: Tag,
    pub progress_state: ProgressState,
    /// Present only while the objective is in progress.
    pub active_objectives: BTreeMap<Tag, ObjectiveRuntimeState>,
    /// Append-only for the life of the mission; includes failed objectives.
    pub completed_objective_ids: BTreeSet<Tag>,
    /// Subset of `completed_objective_ids` that ended in failure.
    pub failed_objective_ids: BTreeSet<Tag>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl MissionRuntimeState {
    pub fn new(mission_id: Tag) -> Self {
        Self {
            mission_id,
            progress_state: ProgressState::InProgress,
            started_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.progress_state == ProgressState::InProgress
    }

    pub fn is_objective_completed(&self, objective_id: &Tag) -> bool {
        self.completed_objective_ids.contains(objective_id)
    }

    pub fn mark_finished(&mut self, success: bool) {
        self.progress_state = ProgressState::from_success(success);
        self.finished_at = Some(Utc::now());
    }
}
