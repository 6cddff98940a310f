//! Fuzz target: `ObstacleMap` folding and decision
//!
//! Every 4 input bytes become one sample: angle, distance (u16 centi-cm),
//! validity flag.  Checks that:
//! - counts add up across the three sectors
//! - a sector is blocked only by a valid reading at or under the threshold
//! - the command is `Forward` whenever nothing is blocked
//!
//! cargo fuzz run fuzz_obstacle_map

#![no_main]

use libfuzzer_sys::fuzz_target;
use rover::app::commands::MotorCommand;
use rover::app::obstacle_map::{ObstacleMap, Sector, SectorPolicy};
use rover::sensors::{Angle, DistanceSample};

fuzz_target!(|data: &[u8]| {
    let policy = SectorPolicy::default();
    let samples: Vec<DistanceSample> = data
        .chunks_exact(4)
        .map(|c| DistanceSample {
            angle: Angle::clamped(i16::from(c[0])),
            distance_cm: f32::from(u16::from_le_bytes([c[1], c[2]])) / 100.0,
            valid: c[3] & 1 == 1,
        })
        .collect();

    let map = ObstacleMap::from_samples(samples.iter(), &policy);
    assert_eq!(map.samples() as usize, samples.len());

    for sector in [Sector::Right, Sector::Front, Sector::Left] {
        let expected = samples.iter().any(|s| {
            policy.classify(s.angle) == sector && s.valid && s.distance_cm <= policy.threshold_cm
        });
        assert_eq!(map.is_blocked(sector), expected);
    }

    if !map.is_blocked(Sector::Right) && !map.is_blocked(Sector::Left) && !map.is_blocked(Sector::Front) {
        assert_eq!(map.command(), MotorCommand::Forward);
    }
});
