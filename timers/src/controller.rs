//! Timer lifecycle: start, stop, reset and read-back.

use hal::{IdleMode, Prescale, TimerControl, TimerDriver, TimerId};
use log::{debug, warn};

use crate::config::TimersConfig;
use crate::error::TimerError;
use crate::period;

/// Settings resolved for one `start`, written to hardware and then dropped.
///
/// The hardware stays the source of truth; read it back with
/// [`TimerController::period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub timer: TimerId,
    pub prescale: Prescale,
    pub period: u32,
    pub enabled: bool,
    pub idle: IdleMode,
    /// The requested period was clamped to the longest one available.
    pub saturated: bool,
}

impl TimerConfig {
    /// Control word for the timer (or the master of a cascaded pair).
    pub fn control(&self) -> TimerControl {
        TimerControl::new(self.timer, self.prescale, self.enabled, self.idle)
    }
}

/// Owns the timer driver and programs periods expressed in microseconds.
pub struct TimerController<T: TimerDriver> {
    driver: T,
    config: TimersConfig,
}

impl<T: TimerDriver> TimerController<T> {
    /// Creates a controller.
    ///
    /// Fails when the peripheral clock is below 1 MHz.
    pub fn new(driver: T, config: TimersConfig) -> Result<Self, TimerError> {
        if config.cycles_per_us() == 0 {
            return Err(TimerError::InvalidClock(config.peripheral_clock_hz));
        }
        Ok(Self { driver, config })
    }

    pub fn config(&self) -> &TimersConfig {
        &self.config
    }

    pub fn driver(&self) -> &T {
        &self.driver
    }

    /// Releases the driver.
    pub fn free(self) -> T {
        self.driver
    }

    /// Resolves `micros` for `timer` without touching hardware.
    pub fn resolve(&self, timer: TimerId, micros: u32) -> TimerConfig {
        let res = period::resolve(self.config.cycles_per_us(), micros, timer.width());
        TimerConfig {
            timer,
            prescale: res.prescale,
            period: res.period,
            enabled: true,
            idle: self.config.idle_mode,
            saturated: res.saturated,
        }
    }

    /// Programs `timer` with a period of `micros` and starts it counting.
    ///
    /// Over-range periods saturate at the longest period the counter allows.
    pub fn start(&mut self, timer: TimerId, micros: u32) -> Result<TimerConfig, TimerError> {
        let cfg = self.resolve(timer, micros);
        if cfg.saturated {
            warn!(
                "{}: {} us exceeds counter range, clamped to {} ticks at {}",
                timer, micros, cfg.period, cfg.prescale
            );
        }
        self.driver.open(timer, cfg.control(), cfg.period)?;
        debug!(
            "{}: started, {} us -> period {} at {}",
            timer, micros, cfg.period, cfg.prescale
        );
        Ok(cfg)
    }

    /// Same as [`start`](Self::start), including re-enabling the timer.
    pub fn set_period(&mut self, timer: TimerId, micros: u32) -> Result<TimerConfig, TimerError> {
        self.start(timer, micros)
    }

    /// Disables and releases `timer`. Stopping a stopped timer is a no-op.
    pub fn stop(&mut self, timer: TimerId) -> Result<(), TimerError> {
        self.driver.close(timer)?;
        debug!("{}: stopped", timer);
        Ok(())
    }

    /// Zeroes the counter, leaving prescale and enable untouched.
    pub fn reset(&mut self, timer: TimerId) -> Result<(), TimerError> {
        self.driver.write_counter(timer, 0)?;
        Ok(())
    }

    /// Current counter value.
    pub fn read(&self, timer: TimerId) -> Result<u32, TimerError> {
        Ok(self.driver.read_counter(timer)?)
    }

    /// Period register as currently programmed.
    pub fn period(&self, timer: TimerId) -> Result<u32, TimerError> {
        Ok(self.driver.read_period(timer)?)
    }

    /// Prescaled ticks per period, i.e. period register + 1.
    pub fn period_ticks(&self, timer: TimerId) -> Result<u64, TimerError> {
        Ok(u64::from(self.period(timer)?) + 1)
    }
}
