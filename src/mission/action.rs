//! Side effects fired on mission, objective and step transitions.
//!
//! Actions are content: the engine never interprets them. Each one is handed,
//! together with an [`ActionContext`] describing where it fired, to the
//! [`ActionHandler`] the host injected into the runtime. Handlers are
//! fire-and-forget; failures stay inside the handler.

use std::fmt;
use std::sync::{Arc, Mutex};

use log::info;
use serde::{Deserialize, Serialize};

use crate::logutil::escape_log;
use crate::mission::tag::Tag;
use crate::mission::types::EventSource;

/// One externally implemented side effect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Deliver a named command to every actor registered under `target`.
    SendCommand { target: Tag, command: String },
    /// Show the widget if hidden, hide it if shown.
    ToggleWidget { widget: Tag },
    CreateWidget { widget: Tag },
    CloseWidget { widget: Tag },
    PlayOrStopSequence { sequence: Tag },
    /// Switch a level-state channel to a named phase.
    ApplyLevelPhase { channel: String, phase: String },
    SetDataLayer { layer: String, active: bool },
    PlaySound { sound: String },
    /// Spawn `class`, optionally at the actor registered under `at`.
    SpawnActor {
        class: String,
        #[serde(default)]
        at: Option<Tag>,
    },
    /// Hand an opaque payload to the actor registered under `target`.
    SendData {
        target: Tag,
        payload: String,
        #[serde(default)]
        context: Option<Tag>,
    },
    SaveGame { slot: String },
}

impl Action {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SendCommand { .. } => "send_command",
            Action::ToggleWidget { .. } => "toggle_widget",
            Action::CreateWidget { .. } => "create_widget",
            Action::CloseWidget { .. } => "close_widget",
            Action::PlayOrStopSequence { .. } => "play_or_stop_sequence",
            Action::ApplyLevelPhase { .. } => "apply_level_phase",
            Action::SetDataLayer { .. } => "set_data_layer",
            Action::PlaySound { .. } => "play_sound",
            Action::SpawnActor { .. } => "spawn_actor",
            Action::SendData { .. } => "send_data",
            Action::SaveGame { .. } => "save_game",
        }
    }
}

/// Which transition fired an action list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionPhase {
    ObjectiveStart,
    ObjectiveComplete,
    StepStart,
    StepComplete,
}

impl fmt::Display for ActionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionPhase::ObjectiveStart => "objective_start",
            ActionPhase::ObjectiveComplete => "objective_complete",
            ActionPhase::StepStart => "step_start",
            ActionPhase::StepComplete => "step_complete",
        };
        f.write_str(name)
    }
}

/// Everything an action handler is told about where an action fired.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionContext {
    pub mission_id: Tag,
    pub objective_id: Tag,
    /// Set for step actions of sequence objectives.
    pub step_id: Option<String>,
    /// The source of the event that caused the transition, if any.
    pub source: Option<EventSource>,
    pub phase: ActionPhase,
}

impl ActionContext {
    pub fn new(mission_id: &Tag, objective_id: &Tag, phase: ActionPhase) -> Self {
        Self {
            mission_id: mission_id.clone(),
            objective_id: objective_id.clone(),
            step_id: None,
            source: None,
            phase,
        }
    }

    pub fn with_step(mut self, step_id: &str) -> Self {
        self.step_id = Some(step_id.to_string());
        self
    }

    pub fn with_source(mut self, source: Option<&EventSource>) -> Self {
        self.source = source.cloned();
        self
    }
}

/// Host-side executor for [`Action`]s.
pub trait ActionHandler {
    fn execute(&mut self, action: &Action, context: &ActionContext);
}

/// Run a list of actions in order against one context.
pub fn run_actions(handler: &mut dyn ActionHandler, actions: &[Action], context: &ActionContext) {
    for action in actions {
        handler.execute(action, context);
    }
}

/// Default handler: records each action in the log and does nothing else.
#[derive(Debug, Default)]
pub struct LoggingActionHandler;

impl ActionHandler for LoggingActionHandler {
    fn execute(&mut self, action: &Action, context: &ActionContext) {
        info!(
            "action {} ({}) for {}/{}{}",
            action.kind(),
            context.phase,
            context.mission_id,
            context.objective_id,
            context
                .step_id
                .as_deref()
                .map(|step| format!(" step {}", escape_log(step)))
                .unwrap_or_default()
        );
    }
}

/// An executed action together with its context.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedAction {
    pub action: Action,
    pub context: ActionContext,
}

/// Handler that appends every executed action to a shared buffer.
///
/// Clones share the buffer, so a test can keep one clone and give the other
/// to the runtime.
#[derive(Debug, Clone, Default)]
pub struct RecordingActionHandler {
    executed: Arc<Mutex<Vec<ExecutedAction>>>,
}

impl RecordingActionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executed(&self) -> Vec<ExecutedAction> {
        self.executed
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.executed().into_iter().map(|entry| entry.action).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.executed.lock() {
            guard.clear();
        }
    }
}

impl ActionHandler for RecordingActionHandler {
    fn execute(&mut self, action: &Action, context: &ActionContext) {
        if let Ok(mut guard) = self.executed.lock() {
            guard.push(ExecutedAction {
                action: action.clone(),
                context: context.clone(),
            });
        }
    }
}
