//! Simulated OC1..OC5.

use std::sync::Arc;

use hal::{CounterWidth, HalError, HalResult, OcControl, OcId, OutputCompareDriver};
use log::trace;

use crate::{ChipState, OcRegs};

/// Output-compare driver backed by the simulated register file.
///
/// In 16-bit mode compare values above `0xFFFF` are rejected.
#[derive(Debug, Clone)]
pub struct SimOutputCompare {
    state: Arc<ChipState>,
}

impl SimOutputCompare {
    pub(crate) fn new(state: Arc<ChipState>) -> Self {
        Self { state }
    }
}

fn check_range(control: OcControl, value: u32) -> HalResult<()> {
    if !control.is_32bit() && value > CounterWidth::Bits16.max_count() {
        return Err(HalError::InvalidParameter);
    }
    Ok(())
}

impl OutputCompareDriver for SimOutputCompare {
    fn open(
        &mut self,
        oc: OcId,
        control: OcControl,
        primary: u32,
        secondary: u32,
    ) -> HalResult<()> {
        check_range(control, primary)?;
        check_range(control, secondary)?;

        self.state.oc.lock()[oc.index()] = OcRegs {
            con: control.bits(),
            r: primary,
            rs: secondary,
        };
        trace!(
            "{}: OCxCON={:#06x} OCxR={} OCxRS={}",
            oc,
            control.bits(),
            primary,
            secondary
        );
        Ok(())
    }

    fn close(&mut self, oc: OcId) -> HalResult<()> {
        self.state.oc.lock()[oc.index()].con = 0;
        Ok(())
    }

    fn set_duty(&mut self, oc: OcId, value: u32) -> HalResult<()> {
        let mut modules = self.state.oc.lock();
        let regs = &mut modules[oc.index()];
        check_range(OcControl::from_bits(regs.con), value)?;
        regs.rs = value;
        trace!("{}: OCxRS={}", oc, value);
        Ok(())
    }

    fn read_control(&self, oc: OcId) -> HalResult<OcControl> {
        Ok(OcControl::from_bits(self.state.oc.lock()[oc.index()].con))
    }
}
