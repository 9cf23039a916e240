//! Error types for the timer services

use core::fmt;

use hal::{HalError, InterruptPriority, InterruptSubpriority, OcId, PhysicalTimer, TimerId};

/// Timer controller errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The driver rejected the operation
    Hal(HalError),
    /// Peripheral clock below 1 MHz, in hertz
    InvalidClock(u32),
}

/// Interrupt dispatch errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The interrupt controller rejected the operation
    Hal(HalError),
    /// Attach or detach of a source whose callback is currently running
    Reentrant(PhysicalTimer),
    /// Vector level outside priority 1..=7, sub-priority 0..=3
    InvalidLevel(InterruptPriority, InterruptSubpriority),
}

/// PWM errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmError {
    /// The output-compare driver rejected the operation
    Hal(HalError),
    /// Reading the feeding timer failed
    Timer(TimerError),
    /// Duty cycle outside 0..=100 percent
    DutyCycleOutOfRange,
    /// Timer cannot clock an output-compare module
    InvalidSource(TimerId),
    /// Output-compare module is not running in PWM mode
    NotConfigured(OcId),
}

impl From<HalError> for TimerError {
    fn from(err: HalError) -> Self {
        Self::Hal(err)
    }
}

impl From<HalError> for DispatchError {
    fn from(err: HalError) -> Self {
        Self::Hal(err)
    }
}

impl From<HalError> for PwmError {
    fn from(err: HalError) -> Self {
        Self::Hal(err)
    }
}

impl From<TimerError> for PwmError {
    fn from(err: TimerError) -> Self {
        Self::Timer(err)
    }
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hal(err) => write!(f, "timer driver error: {err}"),
            Self::InvalidClock(hz) => write!(f, "peripheral clock {hz} Hz is below 1 MHz"),
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hal(err) => write!(f, "interrupt controller error: {err}"),
            Self::Reentrant(source) => {
                write!(f, "{source} interrupt table modified while its callback runs")
            }
            Self::InvalidLevel(priority, subpriority) => {
                write!(f, "invalid interrupt level {priority}.{subpriority}")
            }
        }
    }
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hal(err) => write!(f, "output compare driver error: {err}"),
            Self::Timer(err) => write!(f, "{err}"),
            Self::DutyCycleOutOfRange => write!(f, "duty cycle outside 0..=100 percent"),
            Self::InvalidSource(timer) => write!(f, "{timer} cannot clock an output compare"),
            Self::NotConfigured(oc) => write!(f, "{oc} is not running in PWM mode"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TimerError {}

#[cfg(feature = "std")]
impl std::error::Error for DispatchError {}

#[cfg(feature = "std")]
impl std::error::Error for PwmError {}

impl embedded_hal::pwm::Error for PwmError {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Hal(err) => defmt::write!(fmt, "Hal({})", err),
            Self::InvalidClock(hz) => defmt::write!(fmt, "InvalidClock({})", hz),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DispatchError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Hal(err) => defmt::write!(fmt, "Hal({})", err),
            Self::Reentrant(source) => defmt::write!(fmt, "Reentrant({})", source),
            Self::InvalidLevel(priority, subpriority) => {
                defmt::write!(fmt, "InvalidLevel({}, {})", priority, subpriority)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PwmError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Hal(err) => defmt::write!(fmt, "Hal({})", err),
            Self::Timer(err) => defmt::write!(fmt, "Timer({})", err),
            Self::DutyCycleOutOfRange => defmt::write!(fmt, "DutyCycleOutOfRange"),
            Self::InvalidSource(timer) => defmt::write!(fmt, "InvalidSource({})", timer),
            Self::NotConfigured(oc) => defmt::write!(fmt, "NotConfigured({})", oc),
        }
    }
}
