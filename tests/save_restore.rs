//! Snapshots of in-flight progress, in memory and through sled save slots.

mod common;

use common::{runtime_with, tag};
use questline::config::Config;
use questline::mission::{
    CounterRule, EventSource, MissionDefinition, MissionError, MissionSnapshot,
    ObjectiveDefinition, ProgressState, SaveStore, SequenceRule, StepDefinition, StepRequirement,
    SNAPSHOT_SCHEMA_VERSION,
};
use tempfile::TempDir;

fn heist_mission() -> MissionDefinition {
    MissionDefinition::new(tag("Mission.Heist"))
        .with_objective(
            ObjectiveDefinition::new(
                tag("Obj.Vault"),
                SequenceRule::new([
                    StepDefinition::new("Guards")
                        .with_requirement(StepRequirement::new(tag("Guard.Distracted"), 2).unique_sources()),
                    StepDefinition::new("Lock")
                        .with_requirement(StepRequirement::new(tag("Lock.Picked"), 3)),
                ]),
            )
            .auto_start(),
        )
        .with_objective(
            ObjectiveDefinition::new(tag("Obj.Loot"), CounterRule::new(tag("Gold.Taken"), 5))
                .auto_start(),
        )
}

/// Runtime with the vault sequence on its second step and some loot taken.
fn mid_heist() -> questline::mission::MissionRuntime {
    let (mut runtime, _) = runtime_with(vec![heist_mission()]);
    runtime.start_mission(&tag("Mission.Heist")).unwrap();
    runtime.emit_event(&EventSource::new("Guard_A"), &tag("Guard.Distracted")).unwrap();
    runtime.emit_event(&EventSource::new("Guard_B"), &tag("Guard.Distracted")).unwrap();
    runtime.emit_event(&EventSource::anonymous(), &tag("Lock.Picked")).unwrap();
    runtime.emit_event(&EventSource::anonymous(), &tag("Gold.Taken")).unwrap();
    runtime
}

#[test]
fn sequence_progress_survives_round_trip() {
    let m = tag("Mission.Heist");
    let vault = tag("Obj.Vault");
    let snapshot = mid_heist().save_snapshot();

    let (mut restored, _) = runtime_with(vec![heist_mission()]);
    restored.restore_snapshot(snapshot.clone()).unwrap();

    let state = restored.objective_runtime(&m, &vault).unwrap();
    assert_eq!(state.current_step_index, 1);
    assert_eq!(state.step("Lock").unwrap().occurrences_of(&tag("Lock.Picked")), 1);
    assert_eq!(
        state,
        snapshot.active_missions[&m].active_objectives.get(&vault).unwrap()
    );

    // Step 0 requirements no longer apply.
    restored
        .emit_event(&EventSource::new("Guard_C"), &tag("Guard.Distracted"))
        .unwrap();
    assert_eq!(
        restored.objective_runtime(&m, &vault).unwrap().step("Guards").unwrap().counted_sources.len(),
        2
    );

    restored.emit_event(&EventSource::anonymous(), &tag("Lock.Picked")).unwrap();
    restored.emit_event(&EventSource::anonymous(), &tag("Lock.Picked")).unwrap();
    assert_eq!(restored.objective_state(&m, &vault), ProgressState::Completed);
    assert!(restored.is_objective_active(&m, &tag("Obj.Loot")));
}

#[test]
fn save_store_round_trip_through_sled() {
    let dir = TempDir::new().unwrap();
    let m = tag("Mission.Heist");
    {
        let store = SaveStore::open(dir.path()).unwrap();
        mid_heist().save_to(&store, "AutoSave").unwrap();
    }

    let store = SaveStore::open(dir.path()).unwrap();
    assert_eq!(store.list_slots().unwrap(), vec!["AutoSave".to_string()]);
    let (mut restored, _) = runtime_with(vec![heist_mission()]);
    restored.load_from(&store, "AutoSave").unwrap();

    assert!(restored.is_mission_active(&m));
    assert!(restored.definition(&m).is_some());
    let loot = restored.objective_runtime(&m, &tag("Obj.Loot")).unwrap();
    assert_eq!(loot.int("Count"), 1);
    assert_eq!(restored.history().count(&tag("Gold.Taken"), Default::default()), 1);

    assert!(matches!(
        restored.load_from(&store, "Missing"),
        Err(MissionError::NotFound(_))
    ));
    assert!(restored.is_mission_active(&m));
}

#[test]
fn autosave_uses_configured_slot() {
    let dir = TempDir::new().unwrap();
    let config: Config = toml::from_str(&format!(
        "[saves]\ndir = \"{}\"\ndefault_slot = \"Checkpoint\"\n",
        dir.path().join("saves").display().to_string().escape_default()
    ))
    .unwrap();
    config.validate().unwrap();
    let m = tag("Mission.Heist");

    let store = SaveStore::from_config(&config.saves).unwrap();
    assert_eq!(store.default_slot(), "Checkpoint");
    mid_heist().autosave(&store).unwrap();
    assert_eq!(store.list_slots().unwrap(), vec!["Checkpoint".to_string()]);

    let (mut restored, _) = runtime_with(vec![heist_mission()]);
    restored.load_autosave(&store).unwrap();
    assert!(restored.is_mission_active(&m));
    assert_eq!(
        restored.objective_runtime(&m, &tag("Obj.Loot")).unwrap().int("Count"),
        1
    );

    let defaults = SaveStore::open(dir.path().join("plain")).unwrap();
    assert_eq!(defaults.default_slot(), Config::default().saves.default_slot);
}

#[test]
fn restore_keeps_state_without_definition() {
    let snapshot = mid_heist().save_snapshot();
    let (mut restored, _) = runtime_with(vec![]);
    restored.restore_snapshot(snapshot).unwrap();

    let m = tag("Mission.Heist");
    assert!(restored.is_mission_active(&m));
    assert!(restored.definition(&m).is_none());
    restored.emit_event(&EventSource::anonymous(), &tag("Gold.Taken")).unwrap();
    assert_eq!(
        restored.objective_runtime(&m, &tag("Obj.Loot")).unwrap().int("Count"),
        1
    );
}

#[test]
fn restore_rejects_foreign_schema() {
    let (mut runtime, _) = runtime_with(vec![heist_mission()]);
    runtime.start_mission(&tag("Mission.Heist")).unwrap();
    let mut snapshot = MissionSnapshot::default();
    snapshot.schema_version = SNAPSHOT_SCHEMA_VERSION + 1;
    assert!(matches!(
        runtime.restore_snapshot(snapshot),
        Err(MissionError::SchemaMismatch { .. })
    ));
    assert!(runtime.is_mission_active(&tag("Mission.Heist")));
}

#[test]
fn completed_missions_are_archived_in_snapshots() {
    let (mut runtime, _) = runtime_with(vec![heist_mission()]);
    let m = tag("Mission.Heist");
    runtime.start_mission(&m).unwrap();
    runtime.finish_mission(&m, true).unwrap();

    let snapshot = runtime.save_snapshot();
    assert!(snapshot.active_missions.is_empty());
    assert_eq!(snapshot.mission_ids(), vec![m.clone()]);

    let (mut restored, _) = runtime_with(vec![heist_mission()]);
    restored.restore_snapshot(snapshot).unwrap();
    assert_eq!(restored.mission_state(&m), ProgressState::Completed);
}
