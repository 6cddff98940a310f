//! Scanner task: drives the servo through the sweep and feeds the
//! sample queue.
//!
//! ```text
//!  ┌──────────────┐  set_angle  ┌─────────┐
//!  │  Sweep       │────────────▶│  servo  │   settle
//!  └──────┬───────┘             └─────────┘
//!         │ request_range(angle) ──▶ Ranger ──▶ reply(sample)
//!         │ publish(sample) ──▶ queue
//!         │ end of sweep?
//!         ▼
//!   finish_sweep ──▶ Decider … resume ◀── Decider
//! ```

pub mod sweep;

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use crate::app::events::RoverEvent;
use crate::app::ports::{EventSink, ServoPort};
use crate::config::SystemConfig;
use crate::link::Link;
use crate::sensors::{Angle, DistanceSample};
use sweep::Sweep;

/// Counters for one sweep, reset when the sweep is handed over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub published: u16,
    pub dropped: u16,
    pub mismatched: u16,
}

pub struct Scanner<V, D, S> {
    sweep: Sweep,
    servo: V,
    delay: D,
    sink: S,
    link: &'static Link,
    settle_ms: u32,
    publish_timeout_ms: u32,
    stats: SweepStats,
}

impl<V, D, S> Scanner<V, D, S>
where
    V: ServoPort,
    D: DelayNs,
    S: EventSink,
{
    /// Sweeps start at 0° heading toward 180°.
    pub fn new(servo: V, delay: D, sink: S, link: &'static Link, config: &SystemConfig) -> Self {
        Self {
            sweep: Sweep::new(Angle::MIN, config.sweep_step_deg),
            servo,
            delay,
            sink,
            link,
            settle_ms: config.servo_settle_ms,
            publish_timeout_ms: config.publish_timeout_ms,
            stats: SweepStats::default(),
        }
    }

    /// Point the sensor at `angle` without measuring.  Used at boot.
    pub fn park(&mut self, angle: Angle) -> crate::error::Result<()> {
        self.servo.set_angle(angle)?;
        self.delay.delay_ms(self.settle_ms);
        Ok(())
    }

    pub fn sweep(&self) -> &Sweep {
        &self.sweep
    }

    pub fn stats(&self) -> SweepStats {
        self.stats
    }

    /// One position: move, settle, range, publish, advance.
    ///
    /// Returns `true` when the angle just measured ended a sweep.
    pub fn step(&mut self) -> bool {
        let angle = self.sweep.angle();
        if let Err(e) = self.servo.set_angle(angle) {
            warn!("servo set {angle} failed: {e}");
        }
        self.delay.delay_ms(self.settle_ms);

        self.link.request_range(angle);
        let sample = self.link.wait_range_reply();

        if sample.angle == angle {
            self.publish(sample);
        } else {
            error!("range reply for {} while scanning {angle}", sample.angle);
            self.stats.mismatched = self.stats.mismatched.saturating_add(1);
            self.sink.emit(&RoverEvent::AngleMismatch { requested: angle, replied: sample.angle });
        }

        self.sweep.advance()
    }

    fn publish(&mut self, sample: DistanceSample) {
        match self.link.publish(sample, self.publish_timeout_ms, &mut self.delay) {
            Ok(()) => self.stats.published = self.stats.published.saturating_add(1),
            Err(e) => {
                warn!("dropping sample at {}: {e}", sample.angle);
                self.stats.dropped = self.stats.dropped.saturating_add(1);
                self.sink.emit(&RoverEvent::SampleDropped(sample));
            }
        }
    }

    /// Scan until the next sweep end and signal the decider, without
    /// waiting for it.  Returns the finished sweep's counters.
    pub fn scan_to_end(&mut self) -> SweepStats {
        while !self.step() {}
        let stats = core::mem::take(&mut self.stats);
        self.sink.emit(&RoverEvent::SweepComplete {
            published: stats.published,
            dropped: stats.dropped,
        });
        self.link.finish_sweep();
        stats
    }

    /// One full sweep, then block until the decider releases the scanner.
    pub fn sweep_once(&mut self) -> SweepStats {
        let stats = self.scan_to_end();
        self.link.wait_resume();
        stats
    }

    pub fn run(mut self, park_at: Angle) -> ! {
        if let Err(e) = self.park(park_at) {
            warn!("servo park at {park_at} failed: {e}");
        }
        info!("scanner started, step={}\u{00b0}", self.sweep.step().unsigned_abs());
        loop {
            self.sweep_once();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sim::{SimWorld, VirtualClock, VirtualDelay};
    use crate::app::ports::Clock;
    use crate::link::QUEUE_CAPACITY;
    use crate::sensors::DistanceSample;

    #[derive(Default)]
    struct Recorder(Vec<RoverEvent>);

    impl EventSink for Recorder {
        fn emit(&mut self, event: &RoverEvent) {
            self.0.push(event.clone());
        }
    }

    /// Answer `n` range requests on another thread, echoing the angle back
    /// (or a fixed wrong one).
    fn fake_ranger(link: &'static Link, n: usize, force: Option<Angle>) -> std::thread::JoinHandle<Vec<Angle>> {
        std::thread::spawn(move || {
            let mut seen = Vec::new();
            for _ in 0..n {
                let a = link.wait_range_request();
                seen.push(a);
                link.reply_range(DistanceSample::measured(force.unwrap_or(a), 150.0));
            }
            seen
        })
    }

    fn scanner(
        link: &'static Link,
        config: &SystemConfig,
    ) -> (SimWorld<VirtualClock>, VirtualClock, Scanner<crate::adapters::sim::SimServo<VirtualClock>, VirtualDelay, Recorder>) {
        let clock = VirtualClock::new();
        let world = SimWorld::new(clock.clone());
        let s = Scanner::new(
            world.servo_port(),
            VirtualDelay::new(clock.clone()),
            Recorder::default(),
            link,
            config,
        );
        (world, clock, s)
    }

    #[test]
    fn first_sweep_covers_zero_to_180() {
        let link: &'static Link = Box::leak(Box::new(Link::new()));
        let config = SystemConfig::default();
        let (world, _, mut s) = scanner(link, &config);
        let ranger = fake_ranger(link, 46, None);

        let stats = s.scan_to_end();
        let seen = ranger.join().unwrap();

        assert_eq!(seen.first(), Some(&Angle::MIN));
        assert_eq!(seen.last(), Some(&Angle::MAX));
        assert_eq!(stats.published, 46);
        assert_eq!(link.queued(), 46);
        assert_eq!(world.servo_moves(), 46);
        assert_eq!(s.sweep().angle().degrees(), 176);
        assert!(matches!(s.sink.0.last(), Some(RoverEvent::SweepComplete { published: 46, dropped: 0 })));
    }

    #[test]
    fn settle_delay_precedes_each_range() {
        let link: &'static Link = Box::leak(Box::new(Link::new()));
        let config = SystemConfig::default();
        let (_, clock, mut s) = scanner(link, &config);
        let ranger = fake_ranger(link, 1, None);
        s.step();
        ranger.join().unwrap();
        assert_eq!(clock.now_us(), u64::from(config.servo_settle_ms) * 1_000);
    }

    #[test]
    fn mismatched_reply_is_not_published() {
        let link: &'static Link = Box::leak(Box::new(Link::new()));
        let config = SystemConfig::default();
        let (_, _, mut s) = scanner(link, &config);
        let ranger = fake_ranger(link, 1, Some(Angle::CENTER));
        s.step();
        ranger.join().unwrap();
        assert_eq!(link.queued(), 0);
        assert_eq!(s.stats().mismatched, 1);
        assert_eq!(
            s.sink.0,
            vec![RoverEvent::AngleMismatch { requested: Angle::MIN, replied: Angle::CENTER }]
        );
    }

    #[test]
    fn full_queue_drops_and_keeps_scanning() {
        let link: &'static Link = Box::leak(Box::new(Link::new()));
        let config = SystemConfig::default();
        let mut filler = VirtualDelay::new(VirtualClock::new());
        for _ in 0..QUEUE_CAPACITY {
            link.publish(DistanceSample::measured(Angle::CENTER, 1.0), 0, &mut filler).unwrap();
        }
        let (_, clock, mut s) = scanner(link, &config);
        let ranger = fake_ranger(link, 2, None);

        assert!(!s.step());
        assert!(!s.step());
        ranger.join().unwrap();

        assert_eq!(s.stats().dropped, 2);
        assert_eq!(s.sweep().angle().degrees(), 8);
        // two settles plus two exhausted publish budgets
        let expected_ms = 2 * (config.servo_settle_ms + config.publish_timeout_ms);
        assert_eq!(clock.now_us(), u64::from(expected_ms) * 1_000);
        assert_eq!(
            s.sink.0.iter().filter(|e| matches!(e, RoverEvent::SampleDropped(_))).count(),
            2
        );
    }
}
