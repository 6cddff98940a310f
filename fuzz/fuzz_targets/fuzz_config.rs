//! Fuzz target: `SystemConfig` JSON parsing and validation
//!
//! Feeds arbitrary bytes through `serde_json` and `validate()`.  Any
//! config that validates must produce a sweep that fits the sample queue
//! and a sector policy whose front sector is non-empty.
//!
//! cargo fuzz run fuzz_config

#![no_main]

use libfuzzer_sys::fuzz_target;
use rover::app::obstacle_map::SectorPolicy;
use rover::config::SystemConfig;
use rover::link::QUEUE_CAPACITY;
use rover::scanner::sweep::Sweep;
use rover::sensors::Angle;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<SystemConfig>(data) else {
        return;
    };
    if config.validate().is_err() {
        return;
    }

    assert!(config.samples_per_sweep() <= QUEUE_CAPACITY);

    let policy = SectorPolicy::from_config(&config);
    assert!(policy.front_min <= policy.front_max);

    // One full sweep must terminate and visit the advertised count.
    let mut sweep = Sweep::new(Angle::MIN, config.sweep_step_deg);
    let mut visited = 1;
    while !sweep.advance() {
        visited += 1;
        assert!(visited <= QUEUE_CAPACITY, "sweep never reversed");
    }
    assert_eq!(visited, config.samples_per_sweep());
});
