//! Timer interrupt dispatch table.
//!
//! One callback slot per physical timer. Normal context fills and clears the
//! slots; the timer's vector reads its slot with a single atomic load and
//! runs the callback, then clears the pending flag.
//!
//! Callbacks run at interrupt priority. They must be short, must not block
//! and must not attach or detach their own timer. Attach or detach of any
//! source whose callback is currently running, from its own callback or from
//! a preempting one, is rejected with [`DispatchError::Reentrant`].

use alloc::boxed::Box;
use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

use hal::{
    InterruptContext, InterruptController, InterruptHandler, InterruptPriority,
    InterruptSubpriority, PhysicalTimer, TimerId, MAX_SUBPRIORITY, PRIORITY_LEVELS,
};
use log::{debug, trace};

use crate::config::TimersConfig;
use crate::error::DispatchError;

struct Handler {
    callback: Box<dyn Fn() + Send + Sync>,
}

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: AtomicPtr<Handler> = AtomicPtr::new(ptr::null_mut());

/// Routes timer interrupts to at most one callback per physical timer.
///
/// Composite identifiers share the slot of their interrupt-bearing timer:
/// `T23` uses `T3`'s slot and `T45` uses `T5`'s.
pub struct InterruptDispatch<I: InterruptController> {
    controller: I,
    slots: [AtomicPtr<Handler>; PhysicalTimer::COUNT],
    /// Bit per source whose callback is currently running.
    dispatching: AtomicU8,
    priority: InterruptPriority,
    subpriority: InterruptSubpriority,
}

impl<I: InterruptController> InterruptDispatch<I> {
    /// Creates an empty table; usable in a `static`.
    pub const fn new(
        controller: I,
        priority: InterruptPriority,
        subpriority: InterruptSubpriority,
    ) -> Self {
        Self {
            controller,
            slots: [EMPTY_SLOT; PhysicalTimer::COUNT],
            dispatching: AtomicU8::new(0),
            priority,
            subpriority,
        }
    }

    /// Creates an empty table installing vectors at the configured level.
    pub fn with_config(controller: I, config: &TimersConfig) -> Self {
        Self::new(
            controller,
            config.interrupt_priority,
            config.interrupt_subpriority,
        )
    }

    pub fn controller(&self) -> &I {
        &self.controller
    }

    /// Registers `callback` for `timer`, replacing any previous one, and
    /// enables the interrupt.
    ///
    /// The source is masked and its stale pending flag cleared before the
    /// slot changes, so the new callback never sees an old event. On error
    /// the previous callback stays in the slot and the source may be left
    /// masked; [`enable`](Self::enable) resumes it.
    pub fn attach<F>(&self, timer: TimerId, callback: F) -> Result<(), DispatchError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let source = timer.interrupt_source();
        self.check_level()?;
        let handler = Box::into_raw(Box::new(Handler {
            callback: Box::new(callback),
        }));

        // Whichever handler ends up outside the slot.
        let mut unlinked = handler;
        let result = critical_section::with(|_| -> Result<(), DispatchError> {
            self.ensure_idle(source)?;
            self.controller.disable(source)?;
            self.controller.clear_pending(source)?;
            self.controller
                .install(source, self.priority, self.subpriority)?;
            unlinked = self.slot(source).swap(handler, Ordering::AcqRel);
            if let Err(err) = self.controller.enable(source) {
                unlinked = self.slot(source).swap(unlinked, Ordering::AcqRel);
                return Err(err.into());
            }
            Ok(())
        });
        // SAFETY: the unlinked handler is either the new one, never reachable
        // by an interrupt, or the old one, swapped out while its source was
        // masked and not dispatching.
        unsafe { release(unlinked) };

        if result.is_ok() {
            debug!(
                "{}: callback attached on {} at priority {}",
                timer, source, self.priority
            );
        }
        result
    }

    /// Masks the interrupt, removes the vector and empties the slot.
    ///
    /// Detaching an empty slot is a no-op.
    pub fn detach(&self, timer: TimerId) -> Result<(), DispatchError> {
        let source = timer.interrupt_source();

        let mut previous = ptr::null_mut();
        let result = critical_section::with(|_| -> Result<(), DispatchError> {
            self.ensure_idle(source)?;
            self.controller.disable(source)?;
            self.controller.uninstall(source)?;
            previous = self.slot(source).swap(ptr::null_mut(), Ordering::AcqRel);
            Ok(())
        });
        // SAFETY: see `attach`.
        unsafe { release(previous) };

        if result.is_ok() {
            debug!("{}: callback detached from {}", timer, source);
        }
        result
    }

    /// Unmasks the interrupt without touching the slot or the vector.
    pub fn enable(&self, timer: TimerId) -> Result<(), DispatchError> {
        let source = timer.interrupt_source();
        self.controller.enable(source)?;
        trace!("{}: interrupt enabled", source);
        Ok(())
    }

    /// Masks the interrupt without touching the slot or the vector.
    pub fn disable(&self, timer: TimerId) -> Result<(), DispatchError> {
        let source = timer.interrupt_source();
        self.controller.disable(source)?;
        trace!("{}: interrupt disabled", source);
        Ok(())
    }

    pub fn is_attached(&self, timer: TimerId) -> bool {
        !self
            .slot(timer.interrupt_source())
            .load(Ordering::Acquire)
            .is_null()
    }

    pub fn is_enabled(&self, timer: TimerId) -> bool {
        self.controller.is_enabled(timer.interrupt_source())
    }

    fn slot(&self, source: PhysicalTimer) -> &AtomicPtr<Handler> {
        &self.slots[source.index()]
    }

    fn check_level(&self) -> Result<(), DispatchError> {
        if !PRIORITY_LEVELS.contains(&self.priority) || self.subpriority > MAX_SUBPRIORITY {
            return Err(DispatchError::InvalidLevel(self.priority, self.subpriority));
        }
        Ok(())
    }

    fn ensure_idle(&self, source: PhysicalTimer) -> Result<(), DispatchError> {
        if self.dispatching.load(Ordering::Acquire) & source_bit(source) != 0 {
            return Err(DispatchError::Reentrant(source));
        }
        Ok(())
    }
}

impl<I: InterruptController> InterruptHandler for InterruptDispatch<I> {
    fn on_interrupt(&self, ctx: &InterruptContext) {
        let source = ctx.source();
        self.dispatching
            .fetch_or(source_bit(source), Ordering::AcqRel);
        // Clears the flag on every exit path, after the callback returns.
        let _done = DispatchGuard {
            dispatch: self,
            source,
        };

        let handler = self.slot(source).load(Ordering::Acquire);
        // SAFETY: a non-null slot points at a live handler; it is only freed
        // after being unlinked while this source is not dispatching.
        if let Some(handler) = unsafe { handler.as_ref() } {
            (handler.callback)();
        }
    }
}

impl<I: InterruptController> Drop for InterruptDispatch<I> {
    fn drop(&mut self) {
        for source in PhysicalTimer::ALL {
            let handler = self.slot(source).swap(ptr::null_mut(), Ordering::AcqRel);
            if !handler.is_null() {
                let _ = self.controller.disable(source);
                let _ = self.controller.uninstall(source);
            }
            // SAFETY: `&mut self` rules out a running dispatch.
            unsafe { release(handler) };
        }
    }
}

/// Guard that acknowledges the interrupt when dropped.
struct DispatchGuard<'a, I: InterruptController> {
    dispatch: &'a InterruptDispatch<I>,
    source: PhysicalTimer,
}

impl<I: InterruptController> Drop for DispatchGuard<'_, I> {
    fn drop(&mut self) {
        self.dispatch
            .dispatching
            .fetch_and(!source_bit(self.source), Ordering::AcqRel);
        let _ = self.dispatch.controller.clear_pending(self.source);
    }
}

const fn source_bit(source: PhysicalTimer) -> u8 {
    1 << source.index()
}

/// # Safety
///
/// `handler` must be null or come from `Box::into_raw` and be unreachable
/// from every slot.
unsafe fn release(handler: *mut Handler) {
    if !handler.is_null() {
        drop(Box::from_raw(handler));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicBool, AtomicUsize};
    use hal::{HalError, HalResult};
    use std::sync::Arc;

    /// Interrupt controller whose install or enable can be made to fail.
    #[derive(Default)]
    struct Flaky {
        fail_install: AtomicBool,
        fail_enable: AtomicBool,
        enabled: AtomicU8,
        installed: AtomicU8,
    }

    impl InterruptController for Flaky {
        fn install(
            &self,
            source: PhysicalTimer,
            _priority: InterruptPriority,
            _subpriority: InterruptSubpriority,
        ) -> HalResult<()> {
            if self.fail_install.load(Ordering::SeqCst) {
                return Err(HalError::Busy);
            }
            self.installed.fetch_or(source_bit(source), Ordering::SeqCst);
            Ok(())
        }

        fn uninstall(&self, source: PhysicalTimer) -> HalResult<()> {
            self.installed
                .fetch_and(!source_bit(source), Ordering::SeqCst);
            Ok(())
        }

        fn enable(&self, source: PhysicalTimer) -> HalResult<()> {
            if self.fail_enable.load(Ordering::SeqCst) {
                return Err(HalError::ConfigurationError);
            }
            self.enabled.fetch_or(source_bit(source), Ordering::SeqCst);
            Ok(())
        }

        fn disable(&self, source: PhysicalTimer) -> HalResult<()> {
            self.enabled.fetch_and(!source_bit(source), Ordering::SeqCst);
            Ok(())
        }

        fn is_enabled(&self, source: PhysicalTimer) -> bool {
            self.enabled.load(Ordering::SeqCst) & source_bit(source) != 0
        }

        fn is_pending(&self, _source: PhysicalTimer) -> bool {
            false
        }

        fn clear_pending(&self, _source: PhysicalTimer) -> HalResult<()> {
            Ok(())
        }
    }

    fn counting(hits: &Arc<AtomicUsize>) -> impl Fn() + Send + Sync + 'static {
        let hits = hits.clone();
        move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn interrupt(dispatch: &InterruptDispatch<Flaky>, source: PhysicalTimer) {
        // SAFETY: stands in for the vector of `source`.
        let ctx = unsafe { InterruptContext::new(source) };
        dispatch.on_interrupt(&ctx);
    }

    #[test]
    fn failed_install_keeps_previous_callback() {
        let dispatch = InterruptDispatch::new(Flaky::default(), 3, 0);
        let old = Arc::new(AtomicUsize::new(0));
        let new = Arc::new(AtomicUsize::new(0));
        dispatch.attach(TimerId::T2, counting(&old)).unwrap();

        dispatch.controller().fail_install.store(true, Ordering::SeqCst);
        assert_eq!(
            dispatch.attach(TimerId::T2, counting(&new)),
            Err(DispatchError::Hal(HalError::Busy))
        );

        // The rejected closure is already freed.
        assert_eq!(Arc::strong_count(&new), 1);
        interrupt(&dispatch, PhysicalTimer::T2);
        assert_eq!(old.load(Ordering::SeqCst), 1);
        assert_eq!(new.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_enable_restores_previous_callback() {
        let dispatch = InterruptDispatch::new(Flaky::default(), 3, 0);
        let old = Arc::new(AtomicUsize::new(0));
        let new = Arc::new(AtomicUsize::new(0));
        dispatch.attach(TimerId::T45, counting(&old)).unwrap();

        dispatch.controller().fail_enable.store(true, Ordering::SeqCst);
        assert_eq!(
            dispatch.attach(TimerId::T45, counting(&new)),
            Err(DispatchError::Hal(HalError::ConfigurationError))
        );
        assert_eq!(Arc::strong_count(&new), 1);
        assert!(dispatch.is_attached(TimerId::T5));

        dispatch.controller().fail_enable.store(false, Ordering::SeqCst);
        dispatch.enable(TimerId::T45).unwrap();
        interrupt(&dispatch, PhysicalTimer::T5);
        assert_eq!(old.load(Ordering::SeqCst), 1);
        assert_eq!(new.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_first_attach_leaves_slot_empty() {
        let dispatch = InterruptDispatch::new(Flaky::default(), 3, 0);
        let hits = Arc::new(AtomicUsize::new(0));
        dispatch.controller().fail_install.store(true, Ordering::SeqCst);

        assert!(dispatch.attach(TimerId::T1, counting(&hits)).is_err());

        assert!(!dispatch.is_attached(TimerId::T1));
        assert!(!dispatch.is_enabled(TimerId::T1));
        interrupt(&dispatch, PhysicalTimer::T1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn out_of_range_level_is_rejected_before_hardware() {
        for (priority, subpriority) in [(0, 0), (8, 0), (3, 4)] {
            let dispatch = InterruptDispatch::new(Flaky::default(), priority, subpriority);
            assert_eq!(
                dispatch.attach(TimerId::T3, || {}),
                Err(DispatchError::InvalidLevel(priority, subpriority))
            );
            assert_eq!(dispatch.controller().installed.load(Ordering::SeqCst), 0);
            assert!(!dispatch.is_attached(TimerId::T3));
        }
    }
}
