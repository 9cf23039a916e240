//! Timer lifecycle against the simulated timer registers.

use pic32_timer_sim::{SimChip, SimTimers};
use pic32_timers::{
    IdleMode, PhysicalTimer, Prescale, TimerController, TimerError, TimerId, TimersConfig,
};

fn setup() -> (SimChip, TimerController<SimTimers>) {
    let chip = SimChip::new();
    let timers = TimerController::new(chip.timers(), TimersConfig::default()).unwrap();
    (chip, timers)
}

#[test]
fn hundred_milliseconds_at_80mhz() {
    let (chip, mut timers) = setup();

    let cfg = timers.start(TimerId::T2, 100_000).unwrap();

    assert_eq!(cfg.prescale, Prescale::Div256);
    assert_eq!(cfg.period, 31_249);
    assert!(!cfg.saturated);
    assert_eq!(timers.period(TimerId::T2), Ok(31_249));

    let control = chip.timer_control(PhysicalTimer::T2);
    assert!(control.is_enabled());
    assert!(!control.is_32bit());
    assert_eq!(control.prescale(PhysicalTimer::T2), Some(Prescale::Div256));
}

#[test]
fn type_a_timer_encodes_its_own_prescale() {
    let (chip, mut timers) = setup();

    timers.start(TimerId::T1, 5_000).unwrap();

    // 400 000 cycles need 1:8.
    let control = chip.timer_control(PhysicalTimer::T1);
    assert_eq!(control.prescale(PhysicalTimer::T1), Some(Prescale::Div8));
    assert_eq!(timers.period(TimerId::T1), Ok(49_999));
}

#[test]
fn over_range_period_saturates() {
    let (_chip, mut timers) = setup();

    let cfg = timers.start(TimerId::T3, 1_000_000).unwrap();

    assert!(cfg.saturated);
    assert_eq!(cfg.prescale, Prescale::Div256);
    assert_eq!(timers.period(TimerId::T3), Ok(65_535));
}

#[test]
fn composite_timer_takes_32_bit_period() {
    let (chip, mut timers) = setup();

    let cfg = timers.start(TimerId::T45, 1_000_000).unwrap();

    assert_eq!(cfg.prescale, Prescale::Div1);
    assert_eq!(timers.period(TimerId::T45), Ok(79_999_999));
    assert_eq!(timers.period_ticks(TimerId::T45), Ok(80_000_000));
    assert!(chip.timer_control(PhysicalTimer::T4).is_32bit());
}

#[test]
fn set_period_replaces_live_period() {
    let (chip, mut timers) = setup();
    timers.start(TimerId::T2, 100_000).unwrap();
    timers.stop(TimerId::T2).unwrap();

    timers.set_period(TimerId::T2, 50_000).unwrap();

    assert_eq!(timers.period(TimerId::T2), Ok(62_499));
    let control = chip.timer_control(PhysicalTimer::T2);
    assert!(control.is_enabled());
    assert_eq!(control.prescale(PhysicalTimer::T2), Some(Prescale::Div64));
}

#[test]
fn stop_is_idempotent() {
    let (chip, mut timers) = setup();
    timers.start(TimerId::T4, 10).unwrap();

    assert_eq!(timers.stop(TimerId::T4), Ok(()));
    assert_eq!(timers.stop(TimerId::T4), Ok(()));
    assert!(!chip.timer_control(PhysicalTimer::T4).is_enabled());
    assert_eq!(timers.stop(TimerId::T5), Ok(()));
}

#[test]
fn reset_zeroes_counter_only() {
    let (chip, mut timers) = setup();
    timers.start(TimerId::T5, 1_000).unwrap();
    let before = chip.timer_control(PhysicalTimer::T5);

    chip.timers().advance(TimerId::T5, 8 * 1_234);
    assert_eq!(timers.read(TimerId::T5), Ok(1_234));

    timers.reset(TimerId::T5).unwrap();
    assert_eq!(timers.read(TimerId::T5), Ok(0));
    assert_eq!(chip.timer_control(PhysicalTimer::T5), before);
    assert_eq!(timers.period(TimerId::T5), Ok(9_999));
}

#[test]
fn zero_period_is_accepted() {
    let (_chip, mut timers) = setup();
    let cfg = timers.start(TimerId::T1, 0).unwrap();
    assert_eq!((cfg.prescale, cfg.period), (Prescale::Div1, 0));
}

#[test]
fn idle_mode_comes_from_config() {
    let chip = SimChip::new();
    let config = TimersConfig::builder().idle_mode(IdleMode::Stop).build();
    let mut timers = TimerController::new(chip.timers(), config).unwrap();

    timers.start(TimerId::T3, 100).unwrap();

    assert_eq!(
        chip.timer_control(PhysicalTimer::T3).idle_mode(),
        IdleMode::Stop
    );
}

#[test]
fn slower_clock_changes_resolution() {
    let chip = SimChip::new();
    let config = TimersConfig::builder().peripheral_clock_hz(40_000_000).build();
    let mut timers = TimerController::new(chip.timers(), config).unwrap();

    let cfg = timers.start(TimerId::T2, 100_000).unwrap();

    assert_eq!((cfg.prescale, cfg.period), (Prescale::Div64, 62_499));
}

#[test]
fn slave_of_running_pair_cannot_start_alone() {
    let (_chip, mut timers) = setup();
    timers.start(TimerId::T23, 10_000).unwrap();

    assert_eq!(
        timers.start(TimerId::T3, 10),
        Err(TimerError::Hal(pic32_timers::HalError::Busy))
    );
}
