//! Timer peripheral abstraction

use crate::control::TimerControl;
use crate::error::HalResult;
use crate::id::TimerId;

/// Driver for the timer modules.
///
/// Composite identifiers address the cascaded pair as one 32-bit counter;
/// 16-bit identifiers only ever see the low half of `period` and counter values.
pub trait TimerDriver {
    /// Program `control` and `period` in one write and clear the counter.
    ///
    /// The timer starts counting as soon as `control` has `ON` set.
    fn open(&mut self, timer: TimerId, control: TimerControl, period: u32) -> HalResult<()>;

    /// Disable the timer and release it. Closing a closed timer is a no-op.
    fn close(&mut self, timer: TimerId) -> HalResult<()>;

    /// Read back the period register.
    fn read_period(&self, timer: TimerId) -> HalResult<u32>;

    /// Read the running counter.
    fn read_counter(&self, timer: TimerId) -> HalResult<u32>;

    /// Overwrite the running counter without touching the configuration.
    fn write_counter(&mut self, timer: TimerId, value: u32) -> HalResult<()>;
}
