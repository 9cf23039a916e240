//! Host simulation of the PIC32MX timer peripherals.
//!
//! [`SimChip`] owns one shared register file and hands out driver views over
//! it: [`SimTimers`], [`SimOutputCompare`] and [`SimInterrupts`]. Views are
//! cheap clones, so a test can give a driver to a controller and still
//! inspect or clock the same registers through the chip.
//!
//! Linking this crate also provides the `std` critical-section implementation.

use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use hal::{OcControl, OcId, PhysicalTimer, TimerControl};
use parking_lot::Mutex;

mod interrupts;
mod output_compare;
mod timer;

pub use interrupts::{SimInterrupts, Vector};
pub use output_compare::SimOutputCompare;
pub use timer::SimTimers;

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TimerRegs {
    pub(crate) con: u32,
    pub(crate) tmr: u32,
    pub(crate) pr: u32,
    /// Input clocks not yet consumed by the prescaler.
    pub(crate) prescaler: u32,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OcRegs {
    pub(crate) con: u32,
    pub(crate) r: u32,
    pub(crate) rs: u32,
}

#[derive(Debug, Default)]
pub(crate) struct ChipState {
    pub(crate) timers: Mutex<[TimerRegs; PhysicalTimer::COUNT]>,
    pub(crate) oc: Mutex<[OcRegs; OcId::COUNT]>,
    /// Interrupt enable bits, laid out like `IEC0`.
    pub(crate) iec0: AtomicU32,
    /// Interrupt flag bits, laid out like `IFS0`.
    pub(crate) ifs0: AtomicU32,
    pub(crate) vectors: Mutex<[Option<Vector>; PhysicalTimer::COUNT]>,
}

/// Snapshot of one output-compare module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcSnapshot {
    pub control: OcControl,
    /// `OCxR`
    pub primary: u32,
    /// `OCxRS`
    pub secondary: u32,
}

/// A simulated microcontroller.
#[derive(Debug, Clone, Default)]
pub struct SimChip {
    state: Arc<ChipState>,
}

impl SimChip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timer driver over this chip's registers.
    pub fn timers(&self) -> SimTimers {
        SimTimers::new(self.state.clone())
    }

    /// Output-compare driver over this chip's registers.
    pub fn output_compare(&self) -> SimOutputCompare {
        SimOutputCompare::new(self.state.clone())
    }

    /// Interrupt controller over this chip's registers.
    pub fn interrupts(&self) -> SimInterrupts {
        SimInterrupts::new(self.state.clone())
    }

    /// Raw `TxCON` of a physical timer.
    pub fn timer_control(&self, timer: PhysicalTimer) -> TimerControl {
        TimerControl::from_bits(self.state.timers.lock()[timer.index()].con)
    }

    pub fn output_compare_registers(&self, oc: OcId) -> OcSnapshot {
        let regs = self.state.oc.lock()[oc.index()];
        OcSnapshot {
            control: OcControl::from_bits(regs.con),
            primary: regs.r,
            secondary: regs.rs,
        }
    }
}

/// Bit position of a timer in `IEC0`/`IFS0`.
pub(crate) const fn irq_bit(source: PhysicalTimer) -> u32 {
    1 << (4 + 4 * source.index())
}
