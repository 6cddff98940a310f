//! Ranger: turns echo pulses into angle-tagged distance samples, and the
//! task that serves range requests from the scanner.
//!
//! ```text
//!  Scanner ──range_request(angle)──▶ RangerTask ──▶ PulseTimer
//!     ▲                                  │
//!     └──────range_reply(sample)─────────┘   then pause ranging_interval
//! ```
//!
//! The ranger never fails: a timed-out or malformed echo becomes a sample
//! with `valid = false` and the sentinel distance, plus a diagnostic event.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::debug;

use super::pulse_timer::PulseTimer;
use super::{Angle, DistanceSample, pulse_to_cm};
use crate::app::events::RoverEvent;
use crate::app::ports::{Clock, EventSink};
use crate::config::SystemConfig;
use crate::error::SensorError;
use crate::link::Link;

pub struct Ranger<T, E, D, C> {
    timer: PulseTimer<T, E, D, C>,
    echo_timeout_us: u32,
    sentinel_cm: f32,
}

impl<T, E, D, C> Ranger<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: Clock,
{
    pub fn new(timer: PulseTimer<T, E, D, C>, config: &SystemConfig) -> Self {
        Self {
            timer,
            echo_timeout_us: config.echo_timeout_us,
            sentinel_cm: config.sentinel_distance_cm,
        }
    }

    /// One raw measurement, in centimetres.
    pub fn measure_cm(&mut self) -> Result<f32, SensorError> {
        self.timer.measure_pulse(self.echo_timeout_us).map(pulse_to_cm)
    }

    /// Measure at `angle` and report the outcome to `sink`.
    pub fn range_once(&mut self, angle: Angle, sink: &mut impl EventSink) -> DistanceSample {
        match self.measure_cm() {
            Ok(cm) => {
                let sample = DistanceSample::measured(angle, cm);
                sink.emit(&RoverEvent::Measured(sample));
                sample
            }
            Err(error) => {
                sink.emit(&RoverEvent::RangeFailed { angle, error });
                DistanceSample::failed(angle, self.sentinel_cm)
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Task
// ───────────────────────────────────────────────────────────────

/// Counters kept by the ranging task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangerStats {
    pub served: u32,
    pub failed: u32,
}

/// Highest-priority task.  Owns the sensor pins; nothing else touches
/// them.  `P` is the pacing delay, kept separate from the pulse timer's
/// microsecond delay so the inter-measurement pause can yield the CPU.
pub struct RangerTask<T, E, D, C, P, S> {
    ranger: Ranger<T, E, D, C>,
    pacing: P,
    sink: S,
    link: &'static Link,
    interval_ms: u32,
    stats: RangerStats,
}

impl<T, E, D, C, P, S> RangerTask<T, E, D, C, P, S>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: Clock,
    P: DelayNs,
    S: EventSink,
{
    pub fn new(
        ranger: Ranger<T, E, D, C>,
        pacing: P,
        sink: S,
        link: &'static Link,
        config: &SystemConfig,
    ) -> Self {
        Self {
            ranger,
            pacing,
            sink,
            link,
            interval_ms: config.ranging_interval_ms,
            stats: RangerStats::default(),
        }
    }

    /// Block for one request, answer it, then pause.
    pub fn serve_one(&mut self) -> DistanceSample {
        let angle = self.link.wait_range_request();
        let sample = self.ranger.range_once(angle, &mut self.sink);
        self.stats.served = self.stats.served.wrapping_add(1);
        if !sample.valid {
            self.stats.failed = self.stats.failed.wrapping_add(1);
        }
        self.link.reply_range(sample);
        debug!("RANGE | served={} failed={}", self.stats.served, self.stats.failed);
        self.pacing.delay_ms(self.interval_ms);
        sample
    }

    pub fn stats(&self) -> RangerStats {
        self.stats
    }

    pub fn run(mut self) -> ! {
        loop {
            self.serve_one();
        }
    }
}
