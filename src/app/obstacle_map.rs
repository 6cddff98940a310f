//! Per-sweep obstacle map.
//!
//! The decision task folds every drained sample into one of three
//! sectors, then asks the map for a [`MotorCommand`].
//!
//! ```text
//!            front
//!        [min..=max]
//!   left  ╲   │   ╱  right
//!  > max   ╲  │  ╱   < min
//!  180° ────── ◉ ────── 0°
//! ```
//!
//! Only valid samples can block a sector.  A failed reading carries the
//! sentinel distance and is counted, never compared.

use crate::app::commands::MotorCommand;
use crate::config::SystemConfig;
use crate::sensors::{Angle, DistanceSample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sector {
    Right,
    Front,
    Left,
}

/// Angle boundaries and the blocking threshold, lifted out of
/// [`SystemConfig`] so the decision path does not carry the whole config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorPolicy {
    pub front_min: Angle,
    pub front_max: Angle,
    pub threshold_cm: f32,
}

impl SectorPolicy {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            front_min: Angle::clamped(i16::from(config.front_min_deg)),
            front_max: Angle::clamped(i16::from(config.front_max_deg)),
            threshold_cm: config.obstacle_threshold_cm,
        }
    }

    pub fn classify(&self, angle: Angle) -> Sector {
        if angle < self.front_min {
            Sector::Right
        } else if angle > self.front_max {
            Sector::Left
        } else {
            Sector::Front
        }
    }
}

impl Default for SectorPolicy {
    fn default() -> Self {
        Self::from_config(&SystemConfig::default())
    }
}

/// What one sweep saw in a single sector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SectorReading {
    pub blocked: bool,
    pub valid: u16,
    pub invalid: u16,
    /// Closest valid reading, if any.
    pub nearest_cm: Option<f32>,
}

impl SectorReading {
    fn record(&mut self, sample: &DistanceSample, threshold_cm: f32) {
        let Some(cm) = sample.distance() else {
            self.invalid = self.invalid.saturating_add(1);
            return;
        };
        self.valid = self.valid.saturating_add(1);
        self.nearest_cm = Some(self.nearest_cm.map_or(cm, |n| n.min(cm)));
        if cm <= threshold_cm {
            self.blocked = true;
        }
    }

    /// Free distance used to pick an escape side.  No data counts as open.
    pub fn clearance_cm(&self) -> f32 {
        self.nearest_cm.unwrap_or(f32::INFINITY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ObstacleMap {
    pub right: SectorReading,
    pub front: SectorReading,
    pub left: SectorReading,
}

impl ObstacleMap {
    pub fn from_samples<'a>(
        samples: impl IntoIterator<Item = &'a DistanceSample>,
        policy: &SectorPolicy,
    ) -> Self {
        let mut map = Self::default();
        for s in samples {
            map.record(s, policy);
        }
        map
    }

    pub fn record(&mut self, sample: &DistanceSample, policy: &SectorPolicy) {
        let threshold = policy.threshold_cm;
        match policy.classify(sample.angle) {
            Sector::Right => self.right.record(sample, threshold),
            Sector::Front => self.front.record(sample, threshold),
            Sector::Left => self.left.record(sample, threshold),
        }
    }

    pub fn sector(&self, sector: Sector) -> &SectorReading {
        match sector {
            Sector::Right => &self.right,
            Sector::Front => &self.front,
            Sector::Left => &self.left,
        }
    }

    pub fn is_blocked(&self, sector: Sector) -> bool {
        self.sector(sector).blocked
    }

    /// Side-sector table, plus a front escape: with both sides clear but
    /// the front blocked, turn toward the side with more clearance
    /// (left on a tie).
    pub fn command(&self) -> MotorCommand {
        match MotorCommand::from_blocked(self.right.blocked, self.left.blocked) {
            MotorCommand::Forward if self.front.blocked => {
                if self.right.clearance_cm() > self.left.clearance_cm() {
                    MotorCommand::TurnRight
                } else {
                    MotorCommand::TurnLeft
                }
            }
            cmd => cmd,
        }
    }

    pub fn samples(&self) -> u32 {
        [self.right, self.front, self.left]
            .iter()
            .map(|s| u32::from(s.valid) + u32::from(s.invalid))
            .sum()
    }

    pub fn invalid_samples(&self) -> u32 {
        [self.right, self.front, self.left].iter().map(|s| u32::from(s.invalid)).sum()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
