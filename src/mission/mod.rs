//! Mission and objective progression runtime.
//! Missions are ordered objectives; objectives complete through one of the
//! rule variants in [`rules`]; the [`engine`] routes events to them, fires
//! actions on transitions and persists progress through [`storage`].

pub mod action;
pub mod definition;
pub mod engine;
pub mod errors;
pub mod history;
pub mod loader;
pub mod notify;
pub mod rules;
pub mod snapshot;
pub mod storage;
pub mod tag;
pub mod types;

pub use action::{
    run_actions, Action, ActionContext, ActionHandler, ActionPhase, ExecutedAction,
    LoggingActionHandler, RecordingActionHandler,
};
pub use definition::{MissionDefinition, ObjectiveDefinition};
pub use engine::MissionRuntime;
pub use errors::MissionError;
pub use history::EventHistory;
pub use loader::{
    parse_definition, DefinitionLoader, DefinitionSource, DefinitionStore, JsonDirectorySource,
    LoadCompletion,
};
pub use notify::{MissionNotification, MissionObserver, ObserverRegistry, SubscriptionId};
pub use rules::{
    ChecklistRule, CompletionRule, CounterRule, GatekeeperRule, KillCounterRule, ManualRule,
    ObjectiveRule, RuleContext, SequenceRule, SimpleRule, StepDefinition, StepRequirement,
};
pub use snapshot::MissionSnapshot;
pub use storage::SaveStore;
pub use tag::{Tag, TagMatch, TAG_SEPARATOR};
pub use types::*;
