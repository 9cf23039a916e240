//! PWM on the output-compare modules.
//!
//! Compare values are always derived from the live period register of the
//! timer feeding the module, so they track period changes made through the
//! [`TimerController`].

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use hal::{CounterWidth, OcControl, OcId, OutputCompareDriver, TimerDriver, TimerId, TimerSelect};
use log::debug;

use crate::controller::TimerController;
use crate::error::PwmError;

/// Timer clocking an output-compare module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmSource {
    Timer2,
    Timer3,
    /// The cascaded Timer2/3 pair, compare in 32-bit mode.
    Timer23,
}

impl PwmSource {
    pub const fn timer(self) -> TimerId {
        match self {
            Self::Timer2 => TimerId::T2,
            Self::Timer3 => TimerId::T3,
            Self::Timer23 => TimerId::T23,
        }
    }

    /// Control word opening a module in PWM mode on this source.
    pub const fn control(self) -> OcControl {
        match self {
            Self::Timer2 => OcControl::pwm16(TimerSelect::Timer2),
            Self::Timer3 => OcControl::pwm16(TimerSelect::Timer3),
            Self::Timer23 => OcControl::pwm32(),
        }
    }

    /// Source recorded in a module's control word.
    pub const fn from_control(control: OcControl) -> Self {
        if control.is_32bit() {
            return Self::Timer23;
        }
        match control.timer_select() {
            TimerSelect::Timer2 => Self::Timer2,
            TimerSelect::Timer3 => Self::Timer3,
        }
    }
}

impl TryFrom<TimerId> for PwmSource {
    type Error = PwmError;

    fn try_from(timer: TimerId) -> Result<Self, Self::Error> {
        match timer {
            TimerId::T2 => Ok(Self::Timer2),
            TimerId::T3 => Ok(Self::Timer3),
            TimerId::T23 => Ok(Self::Timer23),
            other => Err(PwmError::InvalidSource(other)),
        }
    }
}

/// Owns the output-compare driver.
pub struct PwmController<O: OutputCompareDriver> {
    driver: O,
}

impl<O: OutputCompareDriver> PwmController<O> {
    pub fn new(driver: O) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &O {
        &self.driver
    }

    /// Releases the driver.
    pub fn free(self) -> O {
        self.driver
    }

    /// Opens `oc` in PWM mode on `source` at `duty_percent` of its current period.
    ///
    /// Both compare registers get the same value. Returns that value.
    pub fn start<T: TimerDriver>(
        &mut self,
        timers: &TimerController<T>,
        source: PwmSource,
        oc: OcId,
        duty_percent: u8,
    ) -> Result<u32, PwmError> {
        if duty_percent > 100 {
            return Err(PwmError::DutyCycleOutOfRange);
        }
        let timer = source.timer();
        let ticks = timers.period_ticks(timer)?;
        let compare = clamp(ticks * u64::from(duty_percent) / 100, timer.width());

        self.driver.open(oc, source.control(), compare, compare)?;
        debug!(
            "{}: PWM on {} at {}% -> compare {} of {}",
            oc, timer, duty_percent, compare, ticks
        );
        Ok(compare)
    }

    /// Disables `oc`.
    pub fn stop(&mut self, oc: OcId) -> Result<(), PwmError> {
        self.driver.close(oc)?;
        debug!("{}: PWM stopped", oc);
        Ok(())
    }

    /// The timer currently feeding `oc`, read back from its control word.
    pub fn source(&self, oc: OcId) -> Result<PwmSource, PwmError> {
        let control = self.driver.read_control(oc)?;
        if !(control.is_enabled() && control.is_pwm()) {
            return Err(PwmError::NotConfigured(oc));
        }
        Ok(PwmSource::from_control(control))
    }

    /// Updates the duty cycle of a running module without reopening it.
    ///
    /// Accepts fractional percentages. Returns the compare value written.
    pub fn set_duty_cycle<T: TimerDriver>(
        &mut self,
        timers: &TimerController<T>,
        oc: OcId,
        duty_percent: f32,
    ) -> Result<u32, PwmError> {
        if !(0.0..=100.0).contains(&duty_percent) {
            return Err(PwmError::DutyCycleOutOfRange);
        }
        let timer = self.source(oc)?.timer();
        let ticks = timers.period_ticks(timer)?;
        let scaled = (ticks as f64 * f64::from(duty_percent) / 100.0) as u64;
        let compare = clamp(scaled, timer.width());

        self.driver.set_duty(oc, compare)?;
        debug!(
            "{}: duty {}% of {} -> compare {}",
            oc, duty_percent, timer, compare
        );
        Ok(compare)
    }

    /// Borrows `oc` as an `embedded-hal` PWM channel.
    pub fn channel<'a, T: TimerDriver>(
        &'a mut self,
        timers: &'a TimerController<T>,
        oc: OcId,
    ) -> PwmChannel<'a, T, O> {
        PwmChannel {
            timers,
            pwm: self,
            oc,
        }
    }
}

/// Compare registers hold at most the counter's largest value.
fn clamp(compare: u64, width: CounterWidth) -> u32 {
    compare.min(u64::from(width.max_count())) as u32
}

/// A running output-compare module seen through [`SetDutyCycle`].
///
/// Duty is expressed in hundredths of a percent.
pub struct PwmChannel<'a, T: TimerDriver, O: OutputCompareDriver> {
    timers: &'a TimerController<T>,
    pwm: &'a mut PwmController<O>,
    oc: OcId,
}

impl<T: TimerDriver, O: OutputCompareDriver> PwmChannel<'_, T, O> {
    pub const MAX_DUTY: u16 = 10_000;

    pub fn oc(&self) -> OcId {
        self.oc
    }
}

impl<T: TimerDriver, O: OutputCompareDriver> ErrorType for PwmChannel<'_, T, O> {
    type Error = PwmError;
}

impl<T: TimerDriver, O: OutputCompareDriver> SetDutyCycle for PwmChannel<'_, T, O> {
    fn max_duty_cycle(&self) -> u16 {
        Self::MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let percent = f32::from(duty) / 100.0;
        self.pwm
            .set_duty_cycle(self.timers, self.oc, percent)
            .map(|_| ())
    }
}
