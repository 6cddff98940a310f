//! Rover Firmware: Main Entry Point
//!
//! Three cooperating tasks joined by message passing.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GpioOut/GpioIn   ServoDriver   WheelDriver   SystemClock      │
//! │  (trig/echo)      (ServoPort)   (DrivePort)   (Clock)          │
//! │  LogEventSink     SimWorld (host only)                         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │   RangerTask (pri 3) ◀─request/reply─▶ Scanner (pri 1)         │
//! │                                          │ queue · sweep_done  │
//! │                                          ▼          ▲ resume   │
//! │                                       Decider (pri 1)          │
//! │                                       map · FSM · maneuver     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::thread::JoinHandle;

use anyhow::{Result, anyhow};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::info;

use rover::adapters::log_sink::LogEventSink;
use rover::adapters::time::{SystemClock, ThreadDelay};
use rover::app::decider::Decider;
use rover::app::ports::{Clock, ServoPort};
use rover::config::SystemConfig;
use rover::drivers::hw_init;
use rover::drivers::task_pin::{DECIDER_TASK, RANGER_TASK, SCANNER_TASK, spawn_on_core};
use rover::drivers::wheels::WheelDriver;
use rover::link::Link;
use rover::scanner::Scanner;
use rover::sensors::Angle;
use rover::sensors::pulse_timer::PulseTimer;
use rover::sensors::ranger::{Ranger, RangerTask};

/// The one link every task shares.
static LINK: Link = Link::new();

/// Everything the tasks need from the board, before ownership is split.
struct Board<T, E, D, C, V, L, R> {
    trigger: T,
    echo: E,
    /// Microsecond delay used while polling the echo line.
    poll_delay: D,
    clock: C,
    servo: V,
    left: L,
    right: R,
}

// ── Board construction ────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn board() -> Board<
    rover::drivers::gpio::GpioOut,
    rover::drivers::gpio::GpioIn,
    esp_idf_hal::delay::Ets,
    SystemClock,
    rover::drivers::servo::ServoDriver,
    rover::drivers::gpio::GpioOut,
    rover::drivers::gpio::GpioOut,
> {
    use rover::drivers::gpio::{GpioIn, GpioOut};
    use rover::pins;

    Board {
        trigger: GpioOut::new(pins::SONAR_TRIG_GPIO),
        echo: GpioIn::new(pins::SONAR_ECHO_GPIO),
        poll_delay: esp_idf_hal::delay::Ets,
        clock: SystemClock::new(),
        servo: rover::drivers::servo::ServoDriver::new(),
        left: GpioOut::new(pins::MOTOR_LEFT_GPIO),
        right: GpioOut::new(pins::MOTOR_RIGHT_GPIO),
    }
}

#[cfg(not(target_os = "espidf"))]
fn board() -> Board<
    rover::adapters::sim::SimTrigger<SystemClock>,
    rover::adapters::sim::SimEcho<SystemClock>,
    ThreadDelay,
    SystemClock,
    rover::adapters::sim::SimServo<SystemClock>,
    rover::adapters::sim::SimMotorPin<SystemClock>,
    rover::adapters::sim::SimMotorPin<SystemClock>,
> {
    let clock = SystemClock::new();
    let world = rover::adapters::sim::SimWorld::demo(clock);
    info!("Simulated chassis: wall on the right, pivot rate 90\u{00b0}/s");
    Board {
        trigger: world.trigger(),
        echo: world.echo(),
        poll_delay: ThreadDelay,
        clock,
        servo: world.servo_port(),
        left: world.left_motor(),
        right: world.right_motor(),
    }
}

// ── Task wiring ───────────────────────────────────────────────

fn spawn_tasks<T, E, D, C, V, L, R>(
    config: &SystemConfig,
    board: Board<T, E, D, C, V, L, R>,
) -> Result<[JoinHandle<()>; 3]>
where
    T: OutputPin + Send + 'static,
    E: InputPin + Send + 'static,
    D: DelayNs + Send + 'static,
    C: Clock + Send + 'static,
    V: ServoPort + Send + 'static,
    L: OutputPin + Send + 'static,
    R: OutputPin + Send + 'static,
{
    let timer = PulseTimer::new(board.trigger, board.echo, board.poll_delay, board.clock);
    let ranger = RangerTask::new(Ranger::new(timer, config), ThreadDelay, LogEventSink::new(), &LINK, config);

    let scanner = Scanner::new(board.servo, ThreadDelay, LogEventSink::new(), &LINK, config);
    let park_at = Angle::clamped(i16::from(config.servo_center_deg));

    let wheels = WheelDriver::new(board.left, board.right);
    let decider = Decider::new(config.clone(), wheels, ThreadDelay, LogEventSink::new(), &LINK);

    // Ranger first so the scanner's first request has a listener.
    let ranger = spawn_on_core(RANGER_TASK, move || ranger.run())?;
    let decider = spawn_on_core(DECIDER_TASK, move || decider.run())?;
    let scanner = spawn_on_core(SCANNER_TASK, move || scanner.run(park_at))?;
    Ok([ranger, scanner, decider])
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Bootstrap + logging ────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Rover v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate()?;
    info!("Config: {}", serde_json::to_string(&config)?);
    info!(
        "Sweep: {} samples per pass, queue depth {}",
        config.samples_per_sweep(),
        rover::link::QUEUE_CAPACITY
    );

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;

    // ── 4. Tasks ──────────────────────────────────────────────
    let handles = spawn_tasks(&config, board())?;
    info!("All tasks running");

    // The tasks never return; a join only completes if one panicked.
    for handle in handles {
        let name = handle.thread().name().unwrap_or("task").to_owned();
        handle.join().map_err(|_| anyhow!("{name} task panicked"))?;
    }
    Ok(())
}
