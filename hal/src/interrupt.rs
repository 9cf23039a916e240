//! Interrupt controller abstraction

use core::ops::RangeInclusive;

use crate::error::HalResult;
use crate::id::PhysicalTimer;

/// Interrupt priority level (1 = lowest, 7 = highest on PIC32).
pub type InterruptPriority = u8;

/// Interrupt sub-priority within a level (0..=3).
pub type InterruptSubpriority = u8;

/// Priorities a vector can be installed at; level 0 never interrupts.
pub const PRIORITY_LEVELS: RangeInclusive<InterruptPriority> = 1..=7;

pub const MAX_SUBPRIORITY: InterruptSubpriority = 3;

/// Interrupt controller for the timer vectors.
///
/// Methods take `&self`: the enable and flag bits are shared between normal
/// and interrupt context, so implementations must access them atomically.
pub trait InterruptController: Sync {
    /// Route the timer's vector to the port's trampoline at the given level.
    fn install(
        &self,
        source: PhysicalTimer,
        priority: InterruptPriority,
        subpriority: InterruptSubpriority,
    ) -> HalResult<()>;

    /// Remove the vector installation.
    fn uninstall(&self, source: PhysicalTimer) -> HalResult<()>;

    /// Set the interrupt-enable bit.
    fn enable(&self, source: PhysicalTimer) -> HalResult<()>;

    /// Clear the interrupt-enable bit.
    fn disable(&self, source: PhysicalTimer) -> HalResult<()>;

    fn is_enabled(&self, source: PhysicalTimer) -> bool;

    /// Check if the interrupt flag is pending
    fn is_pending(&self, source: PhysicalTimer) -> bool;

    /// Clear the pending interrupt flag
    fn clear_pending(&self, source: PhysicalTimer) -> HalResult<()>;
}

/// Proof that code is running inside a timer interrupt.
///
/// Only a port's vector trampoline may create one.
#[derive(Debug)]
pub struct InterruptContext {
    source: PhysicalTimer,
}

impl InterruptContext {
    /// # Safety
    ///
    /// Must only be called from the interrupt vector of `source`, with that
    /// vector's priority in effect.
    pub unsafe fn new(source: PhysicalTimer) -> Self {
        Self { source }
    }

    /// The timer whose vector is executing.
    pub fn source(&self) -> PhysicalTimer {
        self.source
    }
}

/// Entry point a port's vector trampoline calls for a timer interrupt.
pub trait InterruptHandler: Sync {
    /// Handle one interrupt of `ctx.source()`.
    ///
    /// Implementations must leave the source's pending flag cleared.
    fn on_interrupt(&self, ctx: &InterruptContext);
}
