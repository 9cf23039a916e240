//! Output-compare (PWM) abstraction

use crate::control::OcControl;
use crate::error::HalResult;
use crate::id::OcId;

/// Driver for the output-compare modules.
pub trait OutputCompareDriver {
    /// Configure and enable `oc` with its primary (`OCxR`) and secondary
    /// (`OCxRS`) compare registers.
    fn open(&mut self, oc: OcId, control: OcControl, primary: u32, secondary: u32)
        -> HalResult<()>;

    /// Disable `oc`. Closing a closed module is a no-op.
    fn close(&mut self, oc: OcId) -> HalResult<()>;

    /// Write the PWM duty-cycle register (`OCxRS`); the hardware latches it
    /// at the next period boundary.
    fn set_duty(&mut self, oc: OcId, value: u32) -> HalResult<()>;

    /// Read back the control word, including the source-select bit.
    fn read_control(&self, oc: OcId) -> HalResult<OcControl>;
}
