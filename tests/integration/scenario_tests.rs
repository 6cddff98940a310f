//! End-to-end scenarios with all three tasks running.
//!
//! Ranger and scanner run on their own threads; the decider is stepped
//! from the test thread one sweep at a time.

use rover::adapters::sim::Echo;
use rover::app::commands::MotorCommand;
use rover::app::events::RoverEvent;
use rover::app::obstacle_map::Sector;
use rover::app::ports::Clock;
use rover::config::SystemConfig;
use rover::error::{Edge, SensorError};
use rover::fsm::StateId;
use rover::link::QUEUE_CAPACITY;

use crate::mock_hw::{Rig, sample};

fn rig_with(setup: impl FnOnce(&Rig)) -> Rig {
    let mut rig = Rig::new(SystemConfig::default());
    setup(&rig);
    rig.spawn_ranger();
    rig.spawn_scanner();
    rig.decider.start();
    rig
}

// ── Single obstacle on one side ───────────────────────────────

#[test]
fn obstacle_on_the_right_turns_left_then_resumes() {
    let mut rig = rig_with(|rig| {
        rig.world.set_relative(0, 180, Echo::Reflect { cm: 150.0 });
        rig.world.set_relative(40, 50, Echo::Reflect { cm: 20.0 });
    });

    let command = rig.decider.decide_once();

    assert_eq!(command, MotorCommand::TurnLeft);
    let map = rig.decider.last_map();
    // Map is cleared on leaving Avoiding.
    assert_eq!(map.samples(), 0);

    let events = rig.sink.events();
    let decided = events.iter().find_map(|e| match e {
        RoverEvent::Decision { map, command } => Some((*map, *command)),
        _ => None,
    });
    let (map, _) = decided.unwrap();
    assert!(map.is_blocked(Sector::Right));
    assert!(!map.is_blocked(Sector::Left));
    assert!(!map.is_blocked(Sector::Front));
    let nearest = map.right.nearest_cm.unwrap();
    assert!((nearest - 20.0).abs() < 0.05, "nearest {nearest}");

    assert!(events.contains(&RoverEvent::StateChanged { from: StateId::Scanning, to: StateId::Avoiding }));
    assert!(events.contains(&RoverEvent::StateChanged { from: StateId::Avoiding, to: StateId::Scanning }));
    assert!(events.contains(&RoverEvent::ManeuverComplete(MotorCommand::TurnLeft)));

    assert_eq!(rig.decider_clock.now_us(), 500_000);
    assert_eq!(rig.world.wheels(), (true, true));
    assert_eq!(rig.decider.current_state(), StateId::Scanning);
    assert_eq!(rig.decider.stats().maneuvers, 1);
}

#[test]
fn obstacle_on_the_left_turns_right() {
    let mut rig = rig_with(|rig| {
        rig.world.set_relative(0, 180, Echo::Reflect { cm: 150.0 });
        rig.world.set_relative(150, 170, Echo::Reflect { cm: 12.0 });
    });

    assert_eq!(rig.decider.decide_once(), MotorCommand::TurnRight);
    assert!(rig.sink.events().contains(&RoverEvent::ManeuverComplete(MotorCommand::TurnRight)));
}

#[test]
fn both_sides_blocked_stops() {
    let mut rig = rig_with(|rig| {
        rig.world.set_relative(0, 180, Echo::Reflect { cm: 150.0 });
        rig.world.set_relative(10, 20, Echo::Reflect { cm: 8.0 });
        rig.world.set_relative(160, 170, Echo::Reflect { cm: 8.0 });
    });

    assert_eq!(rig.decider.decide_once(), MotorCommand::Stop);
    assert!(rig.sink.events().contains(&RoverEvent::ManeuverComplete(MotorCommand::Stop)));
    // Stop is held, then forward again.
    assert_eq!(rig.world.wheels(), (true, true));
}

#[test]
fn wall_dead_ahead_escapes_toward_more_room() {
    let mut rig = rig_with(|rig| {
        rig.world.set_relative(0, 87, Echo::Reflect { cm: 60.0 });
        rig.world.set_relative(88, 92, Echo::Reflect { cm: 10.0 });
        rig.world.set_relative(93, 180, Echo::Reflect { cm: 120.0 });
    });

    assert_eq!(rig.decider.decide_once(), MotorCommand::TurnLeft);
}

// ── Nothing comes back ────────────────────────────────────────

#[test]
fn silent_room_reads_invalid_and_keeps_driving() {
    let mut rig = rig_with(|_| {});

    let command = rig.decider.decide_once();

    assert_eq!(command, MotorCommand::Forward);
    let map = *rig.decider.last_map();
    assert_eq!(map.samples(), 46);
    assert_eq!(map.invalid_samples(), 46);
    for sector in [Sector::Right, Sector::Front, Sector::Left] {
        assert!(!map.is_blocked(sector));
    }
    let timeouts = rig
        .sink
        .first_cycle()
        .iter()
        .filter(|e| {
            matches!(e, RoverEvent::RangeFailed { error: SensorError::EchoTimeout(Edge::Rising), .. })
        })
        .count();
    assert_eq!(timeouts, 46);
    assert_eq!(rig.world.wheels(), (true, true));
}

#[test]
fn stuck_echo_line_is_invalid() {
    let mut rig = rig_with(|rig| rig.world.set_relative(0, 180, Echo::Stuck));

    assert_eq!(rig.decider.decide_once(), MotorCommand::Forward);
    let falling = rig
        .sink
        .first_cycle()
        .iter()
        .filter(|e| {
            matches!(e, RoverEvent::RangeFailed { error: SensorError::EchoTimeout(Edge::Falling), .. })
        })
        .count();
    assert_eq!(falling, 46);
}

// ── Sweep direction ───────────────────────────────────────────

#[test]
fn second_sweep_runs_back_from_176_to_zero() {
    let mut rig = rig_with(|rig| rig.world.set_relative(0, 180, Echo::Reflect { cm: 150.0 }));

    assert_eq!(rig.decider.decide_once(), MotorCommand::Forward);
    assert_eq!(rig.decider.decide_once(), MotorCommand::Forward);

    // A third sweep may already be under way.
    let ranged = rig.sink.ranged();
    assert!(ranged.len() >= 46 + 45);
    let second: Vec<u8> = ranged[46..91].iter().map(|(a, _)| a.degrees()).collect();
    let expected: Vec<u8> = (0..=176).rev().step_by(4).collect();
    assert_eq!(second, expected);
    assert_eq!(rig.decider.last_map().samples(), 45);
    assert_eq!(rig.decider.stats().decisions, 2);
}

#[test]
fn sweep_resumes_its_direction_after_a_turn() {
    let mut rig = rig_with(|rig| {
        rig.world.set_relative(0, 180, Echo::Reflect { cm: 150.0 });
        rig.world.set_relative(40, 50, Echo::Reflect { cm: 15.0 });
    });

    assert_eq!(rig.decider.decide_once(), MotorCommand::TurnLeft);
    assert_eq!(rig.decider.decide_once(), MotorCommand::TurnLeft);

    let ranged = rig.sink.ranged();
    assert!(ranged.len() >= 46 + 45);
    let second: Vec<u8> = ranged[46..91].iter().map(|(a, _)| a.degrees()).collect();
    let expected: Vec<u8> = (0..=176).rev().step_by(4).collect();
    assert_eq!(second, expected);
    assert_eq!(rig.decider.stats().maneuvers, 2);
}

// ── Back-pressure ─────────────────────────────────────────────

#[test]
fn full_queue_drops_the_whole_sweep() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.world.set_relative(0, 180, Echo::Reflect { cm: 150.0 });
    let mut filler = rover::adapters::sim::VirtualDelay::new(rover::adapters::sim::VirtualClock::new());
    for _ in 0..QUEUE_CAPACITY {
        rig.link.publish(sample(90, 150.0), 0, &mut filler).unwrap();
    }
    rig.spawn_ranger();
    rig.spawn_scanner();
    rig.decider.start();

    rig.decider.decide_once();

    assert_eq!(rig.sink.count(|e| matches!(e, RoverEvent::SampleDropped(_))), 46);
    assert!(rig.sink.events().contains(&RoverEvent::SweepComplete { published: 0, dropped: 46 }));
    // The decider only saw what was queued before the sweep.
    let decided = rig.sink.events().into_iter().find_map(|e| match e {
        RoverEvent::Decision { map, .. } => Some(map),
        _ => None,
    });
    assert_eq!(decided.unwrap().front.valid as usize, QUEUE_CAPACITY);
}
