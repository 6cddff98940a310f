//! Ranger → scanner → decider plumbing over the simulated chassis.
//!
//! The scanner runs on the test thread here so each hand-over can be
//! checked between steps.

use rover::adapters::sim::Echo;
use rover::app::commands::MotorCommand;
use rover::app::events::RoverEvent;
use rover::app::ports::Clock;
use rover::config::SystemConfig;
use rover::fsm::StateId;
use rover::sensors::Angle;

use crate::mock_hw::Rig;

fn open_room(rig: &Rig, cm: f32) {
    rig.world.set_relative(0, 180, Echo::Reflect { cm });
}

#[test]
fn one_sweep_lands_in_the_queue_in_angle_order() {
    let mut rig = Rig::new(SystemConfig::default());
    open_room(&rig, 100.0);
    rig.spawn_ranger();
    let mut scanner = rig.scanner.take().unwrap();

    let stats = scanner.scan_to_end();

    assert_eq!(stats.published, 46);
    assert_eq!(stats.dropped, 0);
    assert_eq!(rig.link.queued(), 46);
    let ranged = rig.sink.ranged();
    let angles: Vec<u8> = ranged.iter().map(|(a, _)| a.degrees()).collect();
    let expected: Vec<u8> = (0..=180).step_by(4).collect();
    assert_eq!(angles, expected);
    assert_eq!(rig.world.pings(), 46);
}

#[test]
fn measured_distance_tracks_the_world() {
    let mut rig = Rig::new(SystemConfig::default());
    open_room(&rig, 100.0);
    rig.spawn_ranger();
    let mut scanner = rig.scanner.take().unwrap();
    scanner.scan_to_end();

    for (angle, cm) in rig.sink.ranged() {
        let cm = cm.unwrap_or_else(|| panic!("no reading at {angle}"));
        assert!((cm - 100.0).abs() < 0.05, "{angle}: {cm}");
    }
}

#[test]
fn ranger_paces_every_measurement() {
    let config = SystemConfig::default();
    let mut rig = Rig::new(config.clone());
    open_room(&rig, 100.0);
    rig.spawn_ranger();
    let mut scanner = rig.scanner.take().unwrap();
    scanner.scan_to_end();

    // The reply is sent before the pause, so the last one may still be running.
    let paced_us = 45 * u64::from(config.ranging_interval_ms) * 1_000;
    assert!(rig.world_clock.now_us() >= paced_us);
}

#[test]
fn decider_consumes_the_sweep_and_releases_the_scanner() {
    let mut rig = Rig::new(SystemConfig::default());
    open_room(&rig, 100.0);
    rig.spawn_ranger();
    let mut scanner = rig.scanner.take().unwrap();
    rig.decider.start();

    scanner.scan_to_end();
    assert!(!rig.link.scanner_released());

    let command = rig.decider.decide_once();

    assert_eq!(command, MotorCommand::Forward);
    assert_eq!(rig.link.queued(), 0);
    assert!(rig.link.scanner_released());
    assert_eq!(rig.decider.last_map().samples(), 46);
    assert_eq!(rig.decider.current_state(), StateId::Scanning);
    assert_eq!(rig.world.wheels(), (true, true));

    // Next sweep heads back from the far end.
    assert_eq!(scanner.sweep().angle(), Angle::new(176).unwrap());
}

#[test]
fn events_follow_the_cycle() {
    let mut rig = Rig::new(SystemConfig::default());
    open_room(&rig, 100.0);
    rig.spawn_ranger();
    let mut scanner = rig.scanner.take().unwrap();
    rig.decider.start();
    scanner.scan_to_end();
    rig.decider.decide_once();

    let events = rig.sink.events();
    assert!(matches!(events.first(), Some(RoverEvent::Started(StateId::Scanning))));
    let sweep_at = events
        .iter()
        .position(|e| matches!(e, RoverEvent::SweepComplete { published: 46, dropped: 0 }))
        .unwrap();
    let decision_at = events
        .iter()
        .position(|e| matches!(e, RoverEvent::Decision { command: MotorCommand::Forward, .. }))
        .unwrap();
    assert!(sweep_at < decision_at);
    match events.last() {
        Some(RoverEvent::Telemetry(t)) => {
            assert_eq!(t.decisions, 1);
            assert_eq!(t.samples, 46);
            assert_eq!(t.invalid_samples, 0);
            assert_eq!(t.last_command, MotorCommand::Forward);
        }
        other => panic!("expected telemetry last, got {other:?}"),
    }
}
