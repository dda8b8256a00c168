//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use questline::config::EngineConfig;
use questline::mission::{
    DefinitionLoader, MissionDefinition, MissionNotification, MissionRuntime,
    RecordingActionHandler, Tag,
};

pub fn tag(s: &str) -> Tag {
    Tag::parse(s).unwrap()
}

/// Runtime with the given definitions resident and a recording action handler.
pub fn runtime_with(definitions: Vec<MissionDefinition>) -> (MissionRuntime, RecordingActionHandler) {
    let recorder = RecordingActionHandler::new();
    let mut runtime = MissionRuntime::new(EngineConfig::default(), DefinitionLoader::new())
        .with_action_handler(recorder.clone());
    for definition in definitions {
        runtime.register_definition(definition).unwrap();
    }
    (runtime, recorder)
}

/// Subscribe an observer that keeps every notification.
pub fn capture_notifications(runtime: &mut MissionRuntime) -> Arc<Mutex<Vec<MissionNotification>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    runtime.subscribe(move |n: &MissionNotification| sink.lock().unwrap().push(n.clone()));
    seen
}
