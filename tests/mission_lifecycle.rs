//! End-to-end mission flow: starting, event fan-out, completion chains,
//! gatekeeper fan-in and mission chaining.

mod common;

use common::{capture_notifications, runtime_with, tag};
use questline::mission::{
    Action, ChecklistRule, CounterRule, EventSource, GatekeeperRule, MissionDefinition,
    MissionError, MissionNotification, ObjectiveDefinition, ProgressState, SimpleRule,
};

fn generator_mission() -> MissionDefinition {
    MissionDefinition::new(tag("Mission.Generator"))
        .with_title("Restore power")
        .with_objective(
            ObjectiveDefinition::new(tag("Obj.Fuel"), CounterRule::new(tag("Fuel.Poured"), 2))
                .auto_start(),
        )
        .with_objective(
            ObjectiveDefinition::new(
                tag("Obj.Fuses"),
                ChecklistRule::new([tag("Fuse.A"), tag("Fuse.B")]),
            )
            .auto_start(),
        )
        .with_objective(
            ObjectiveDefinition::new(
                tag("Obj.Ready"),
                GatekeeperRule::new([tag("Obj.Fuel"), tag("Obj.Fuses")]),
            )
            .auto_start()
            .then(tag("Obj.Start")),
        )
        .with_objective(
            ObjectiveDefinition::new(tag("Obj.Start"), SimpleRule::new(tag("Generator.Started")))
                .with_complete_action(Action::ApplyLevelPhase {
                    channel: "Power".to_string(),
                    phase: "On".to_string(),
                }),
        )
        .then_mission(tag("Mission.Lights"))
}

fn lights_mission() -> MissionDefinition {
    MissionDefinition::new(tag("Mission.Lights")).with_objective(
        ObjectiveDefinition::new(tag("Obj.Switch"), SimpleRule::new(tag("Switch.On"))).auto_start(),
    )
}

#[test]
fn starting_twice_yields_one_mission_and_one_notification() {
    let (mut runtime, _) = runtime_with(vec![lights_mission()]);
    let seen = capture_notifications(&mut runtime);
    let m = tag("Mission.Lights");

    runtime.start_mission(&m).unwrap();
    assert!(matches!(
        runtime.start_mission(&m),
        Err(MissionError::AlreadyActive(_))
    ));

    assert_eq!(runtime.active_missions().len(), 1);
    let started = seen
        .lock()
        .unwrap()
        .iter()
        .filter(|n| matches!(n, MissionNotification::MissionStarted { .. }))
        .count();
    assert_eq!(started, 1);
}

#[test]
fn gatekeeper_fans_in_regardless_of_order() {
    for fuses_first in [true, false] {
        let (mut runtime, recorder) = runtime_with(vec![generator_mission(), lights_mission()]);
        let m = tag("Mission.Generator");
        runtime.start_mission(&m).unwrap();
        let player = EventSource::new("Player");

        let fuel = || {
            vec![tag("Fuel.Poured"), tag("Fuel.Poured")]
        };
        let fuses = || vec![tag("Fuse.B"), tag("Fuse.A")];
        let order = if fuses_first {
            [fuses(), fuel()].concat()
        } else {
            [fuel(), fuses()].concat()
        };

        let (last, head) = order.split_last().unwrap();
        for event in head {
            runtime.emit_event(&player, event).unwrap();
            assert!(runtime.is_objective_active(&m, &tag("Obj.Ready")));
        }
        runtime.emit_event(&player, last).unwrap();

        assert_eq!(runtime.objective_state(&m, &tag("Obj.Ready")), ProgressState::Completed);
        assert!(runtime.is_objective_active(&m, &tag("Obj.Start")));
        assert!(recorder.actions().is_empty());
    }
}

#[test]
fn finishing_every_objective_chains_into_next_mission() {
    let (mut runtime, recorder) = runtime_with(vec![generator_mission(), lights_mission()]);
    let seen = capture_notifications(&mut runtime);
    let m = tag("Mission.Generator");
    runtime.start_mission(&m).unwrap();
    let player = EventSource::new("Player");

    for event in ["Fuel.Poured", "Fuel.Poured", "Fuse.A", "Fuse.B", "Generator.Started"] {
        runtime.emit_event(&player, &tag(event)).unwrap();
    }

    assert_eq!(runtime.mission_state(&m), ProgressState::Completed);
    assert!(runtime.is_mission_active(&tag("Mission.Lights")));
    assert!(runtime.is_objective_active(&tag("Mission.Lights"), &tag("Obj.Switch")));
    assert_eq!(
        recorder.actions(),
        vec![Action::ApplyLevelPhase {
            channel: "Power".to_string(),
            phase: "On".to_string(),
        }]
    );

    let archived = runtime.mission_runtime(&m).unwrap();
    assert!(archived.active_objectives.is_empty());
    assert_eq!(archived.completed_objective_ids.len(), 4);
    assert!(archived.finished_at.is_some());

    let seen = seen.lock().unwrap();
    let finished_at = seen
        .iter()
        .position(|n| {
            *n == MissionNotification::MissionCompleted {
                mission_id: tag("Mission.Generator"),
                success: true,
            }
        })
        .unwrap();
    let next_started = seen
        .iter()
        .position(|n| {
            *n == MissionNotification::MissionStarted {
                mission_id: tag("Mission.Lights"),
            }
        })
        .unwrap();
    assert!(finished_at < next_started);
}

#[test]
fn repeatable_mission_restarts_itself() {
    let patrol = MissionDefinition::new(tag("Mission.Patrol"))
        .with_objective(ObjectiveDefinition::manual(tag("Obj.Walk")).auto_start())
        .then_mission(tag("Mission.Patrol"));
    let (mut runtime, _) = runtime_with(vec![patrol]);
    let seen = capture_notifications(&mut runtime);
    let m = tag("Mission.Patrol");
    runtime.start_mission(&m).unwrap();

    runtime.complete_objective(&m, &tag("Obj.Walk"), true).unwrap();
    assert!(runtime.is_mission_active(&m));
    assert_eq!(runtime.mission_state(&m), ProgressState::InProgress);
    assert!(runtime.is_objective_active(&m, &tag("Obj.Walk")));
    assert!(runtime.completed_missions().contains_key(&m));

    let started = seen
        .lock()
        .unwrap()
        .iter()
        .filter(|n| matches!(n, MissionNotification::MissionStarted { .. }))
        .count();
    assert_eq!(started, 2);

    runtime.finish_mission(&m, false).unwrap();
    assert!(!runtime.is_mission_active(&m));
    assert_eq!(runtime.mission_state(&m), ProgressState::Failed);
}

#[test]
fn completion_is_monotonic() {
    let (mut runtime, _) = runtime_with(vec![lights_mission()]);
    let m = tag("Mission.Lights");
    let obj = tag("Obj.Switch");
    runtime.start_mission(&m).unwrap();
    let seen = capture_notifications(&mut runtime);

    runtime.emit_event(&EventSource::anonymous(), &tag("Switch.On")).unwrap();
    assert!(matches!(
        runtime.complete_objective(&m, &obj, true),
        Err(MissionError::NotFound(_))
    ));
    runtime.emit_event(&EventSource::anonymous(), &tag("Switch.On")).unwrap();

    let completions = seen
        .lock()
        .unwrap()
        .iter()
        .filter(|n| matches!(n, MissionNotification::ObjectiveCompleted { .. }))
        .count();
    assert_eq!(completions, 1);
    assert_eq!(runtime.objective_state(&m, &obj), ProgressState::Completed);
}

#[test]
fn event_broadcast_fires_even_when_nothing_listens() {
    let (mut runtime, _) = runtime_with(vec![]);
    let seen = capture_notifications(&mut runtime);
    runtime
        .emit_event(&EventSource::new("Bird"), &tag("Ambient.Chirp"))
        .unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![MissionNotification::EventBroadcast {
            event_tag: tag("Ambient.Chirp"),
            source: EventSource::new("Bird"),
        }]
    );
    assert_eq!(
        runtime
            .history()
            .count(&tag("Ambient.Chirp"), questline::mission::TagMatch::Exact),
        1
    );
}

#[test]
fn manual_activation_and_queries() {
    let mission = MissionDefinition::new(tag("Mission.Side"))
        .with_objective(ObjectiveDefinition::manual(tag("Obj.Talk")))
        .with_objective(ObjectiveDefinition::manual(tag("Obj.Deliver")).auto_start());
    let (mut runtime, _) = runtime_with(vec![mission]);
    let m = tag("Mission.Side");

    assert!(matches!(
        runtime.activate_objective(&m, &tag("Obj.Talk")),
        Err(MissionError::NotFound(_))
    ));
    runtime.start_mission(&m).unwrap();
    assert!(!runtime.is_objective_active(&m, &tag("Obj.Talk")));
    assert!(matches!(
        runtime.activate_objective(&m, &tag("Obj.Missing")),
        Err(MissionError::NotFound(_))
    ));

    runtime.activate_objective(&m, &tag("Obj.Talk")).unwrap();
    assert_eq!(runtime.objective_state(&m, &tag("Obj.Talk")), ProgressState::InProgress);
    assert_eq!(runtime.find_mission_by_objective(&tag("Obj.Talk")), Some(&m));
    assert_eq!(runtime.find_mission_by_objective(&tag("Obj.Nowhere")), None);

    runtime.complete_objective(&m, &tag("Obj.Talk"), true).unwrap();
    assert!(matches!(
        runtime.activate_objective(&m, &tag("Obj.Talk")),
        Err(MissionError::InvalidTransition(_))
    ));
    runtime.complete_objective(&m, &tag("Obj.Deliver"), true).unwrap();
    assert_eq!(runtime.mission_state(&m), ProgressState::Completed);
    assert!(runtime.completed_missions().contains_key(&m));
}

#[test]
fn explicit_finish_archives_and_rejects_repeats() {
    let (mut runtime, _) = runtime_with(vec![lights_mission()]);
    let m = tag("Mission.Lights");
    runtime.start_mission(&m).unwrap();
    runtime.finish_mission(&m, false).unwrap();
    assert_eq!(runtime.mission_state(&m), ProgressState::Failed);
    assert!(matches!(
        runtime.finish_mission(&m, true),
        Err(MissionError::InvalidTransition(_))
    ));
    assert!(runtime
        .emit_event(&EventSource::anonymous(), &tag("Switch.On"))
        .is_ok());
    assert_eq!(runtime.mission_state(&m), ProgressState::Failed);

    // A finished mission may be started again.
    runtime.start_mission(&m).unwrap();
    assert!(runtime.is_mission_active(&m));
}

#[test]
fn reset_clears_runtime_state() {
    let (mut runtime, _) = runtime_with(vec![lights_mission()]);
    runtime.start_mission(&tag("Mission.Lights")).unwrap();
    runtime
        .emit_event(&EventSource::anonymous(), &tag("Other"))
        .unwrap();
    runtime.reset(false);
    assert!(runtime.active_missions().is_empty());
    assert!(runtime.history().is_empty());
    runtime.start_mission(&tag("Mission.Lights")).unwrap();
    assert!(runtime.is_mission_active(&tag("Mission.Lights")));
}
