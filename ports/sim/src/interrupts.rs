//! Simulated interrupt controller for the five timer vectors.
//!
//! Enable and flag bits sit in `IEC0`/`IFS0` style words at bits 4, 8, 12,
//! 16 and 20. Nothing vectors on its own: the test raises flags (directly
//! or by clocking a timer) and then calls [`SimInterrupts::service`] or
//! [`SimInterrupts::fire`] to play the CPU taking the interrupt.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use hal::{
    HalError, HalResult, InterruptContext, InterruptController, InterruptHandler,
    InterruptPriority, InterruptSubpriority, PhysicalTimer, MAX_SUBPRIORITY, PRIORITY_LEVELS,
};
use log::trace;

use crate::{irq_bit, ChipState};

/// An installed vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector {
    pub priority: InterruptPriority,
    pub subpriority: InterruptSubpriority,
}

#[derive(Debug, Clone)]
pub struct SimInterrupts {
    state: Arc<ChipState>,
}

impl SimInterrupts {
    pub(crate) fn new(state: Arc<ChipState>) -> Self {
        Self { state }
    }

    /// Sets the flag of `source`, as the peripheral would.
    pub fn raise(&self, source: PhysicalTimer) {
        self.state
            .ifs0
            .fetch_or(irq_bit(source), Ordering::AcqRel);
    }

    pub fn is_flag_set(&self, source: PhysicalTimer) -> bool {
        self.state.ifs0.load(Ordering::Acquire) & irq_bit(source) != 0
    }

    /// Installed vector of `source`.
    pub fn vector(&self, source: PhysicalTimer) -> Option<Vector> {
        self.state.vectors.lock()[source.index()]
    }

    /// Raises `source` and takes the interrupt if it is enabled and installed.
    ///
    /// Returns whether `handler` ran. A masked source stays pending.
    pub fn fire(&self, source: PhysicalTimer, handler: &impl InterruptHandler) -> bool {
        self.raise(source);
        if !self.is_deliverable(source) {
            trace!("{}: pending, not delivered", source);
            return false;
        }
        self.enter(source, handler);
        true
    }

    /// Enters the vector of `source` unconditionally.
    pub fn enter(&self, source: PhysicalTimer, handler: &impl InterruptHandler) {
        trace!("{}: vectoring", source);
        // SAFETY: the simulator plays the CPU; this is the vector of `source`.
        let ctx = unsafe { InterruptContext::new(source) };
        handler.on_interrupt(&ctx);
    }

    /// Takes every pending, enabled and installed interrupt once, highest
    /// priority first. Returns the sources serviced.
    pub fn service(&self, handler: &impl InterruptHandler) -> Vec<PhysicalTimer> {
        let mut ready: Vec<(PhysicalTimer, Vector)> = critical_section::with(|_| {
            PhysicalTimer::ALL
                .into_iter()
                .filter(|&source| self.is_flag_set(source) && self.is_deliverable(source))
                .filter_map(|source| self.vector(source).map(|vector| (source, vector)))
                .collect()
        });
        // Natural order breaks ties.
        ready.sort_by_key(|&(source, vector)| {
            (
                std::cmp::Reverse((vector.priority, vector.subpriority)),
                source,
            )
        });

        ready
            .into_iter()
            .map(|(source, _)| {
                self.enter(source, handler);
                source
            })
            .collect()
    }

    fn is_deliverable(&self, source: PhysicalTimer) -> bool {
        self.is_enabled(source) && self.vector(source).is_some()
    }
}

impl InterruptController for SimInterrupts {
    fn install(
        &self,
        source: PhysicalTimer,
        priority: InterruptPriority,
        subpriority: InterruptSubpriority,
    ) -> HalResult<()> {
        if !PRIORITY_LEVELS.contains(&priority) || subpriority > MAX_SUBPRIORITY {
            return Err(HalError::InvalidParameter);
        }
        self.state.vectors.lock()[source.index()] = Some(Vector {
            priority,
            subpriority,
        });
        Ok(())
    }

    fn uninstall(&self, source: PhysicalTimer) -> HalResult<()> {
        self.state.vectors.lock()[source.index()] = None;
        Ok(())
    }

    fn enable(&self, source: PhysicalTimer) -> HalResult<()> {
        self.state
            .iec0
            .fetch_or(irq_bit(source), Ordering::AcqRel);
        Ok(())
    }

    fn disable(&self, source: PhysicalTimer) -> HalResult<()> {
        self.state
            .iec0
            .fetch_and(!irq_bit(source), Ordering::AcqRel);
        Ok(())
    }

    fn is_enabled(&self, source: PhysicalTimer) -> bool {
        self.state.iec0.load(Ordering::Acquire) & irq_bit(source) != 0
    }

    fn is_pending(&self, source: PhysicalTimer) -> bool {
        self.is_flag_set(source)
    }

    fn clear_pending(&self, source: PhysicalTimer) -> HalResult<()> {
        self.state
            .ifs0
            .fetch_and(!irq_bit(source), Ordering::AcqRel);
        Ok(())
    }
}
