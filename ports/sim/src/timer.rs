//! Simulated Timer1..Timer5.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use hal::{
    CounterWidth, HalError, HalResult, PhysicalTimer, TimerControl, TimerDriver, TimerId,
    TimerLayout,
};
use log::trace;

use crate::{irq_bit, ChipState, TimerRegs};

/// Timer driver backed by the simulated register file.
///
/// A cascaded pair keeps its 32-bit period and count in the master's
/// registers. Opening the slave of a running pair on its own is refused
/// with [`HalError::Busy`].
#[derive(Debug, Clone)]
pub struct SimTimers {
    state: Arc<ChipState>,
}

impl SimTimers {
    pub(crate) fn new(state: Arc<ChipState>) -> Self {
        Self { state }
    }

    /// Feeds `clocks` peripheral clocks into `timer`.
    ///
    /// Every time the counter rolls over from its period value the interrupt
    /// flag of the timer's interrupt source is raised. Returns the number of
    /// roll-overs. A disabled timer ignores the clocks.
    pub fn advance(&self, timer: TimerId, clocks: u64) -> u64 {
        let mut timers = self.state.timers.lock();
        let regs = &mut timers[timer.master().index()];
        let control = TimerControl::from_bits(regs.con);
        if !control.is_enabled() || control.is_32bit() != timer.is_composite() {
            return 0;
        }
        let Some(prescale) = control.prescale(timer.master()) else {
            return 0;
        };

        let pending = u64::from(regs.prescaler) + clocks;
        let ticks = pending >> prescale.shift();
        regs.prescaler = (pending & u64::from(prescale.divisor() - 1)) as u32;

        let span = u64::from(mask(regs.pr, timer.width())) + 1;
        let count = u64::from(mask(regs.tmr, timer.width())) + ticks;
        let rollovers = count / span;
        regs.tmr = (count % span) as u32;
        drop(timers);

        if rollovers > 0 {
            let source = timer.interrupt_source();
            self.state
                .ifs0
                .fetch_or(irq_bit(source), Ordering::AcqRel);
            trace!("{}: {} roll-overs, {} flag raised", timer, rollovers, source);
        }
        rollovers
    }

    fn check_control(timer: TimerId, control: TimerControl) -> HalResult<()> {
        if control.is_32bit() != timer.is_composite() {
            return Err(HalError::ConfigurationError);
        }
        if control.prescale(timer.master()).is_none() {
            return Err(HalError::InvalidParameter);
        }
        Ok(())
    }
}

impl TimerDriver for SimTimers {
    fn open(&mut self, timer: TimerId, control: TimerControl, period: u32) -> HalResult<()> {
        Self::check_control(timer, control)?;
        let mut timers = self.state.timers.lock();

        match timer.layout() {
            TimerLayout::Single(physical) => {
                if let Some(master) = pair_master(physical) {
                    if TimerControl::from_bits(timers[master.index()].con).is_32bit() {
                        return Err(HalError::Busy);
                    }
                }
                timers[physical.index()] = TimerRegs {
                    con: control.bits(),
                    pr: mask(period, CounterWidth::Bits16),
                    ..TimerRegs::default()
                };
            }
            TimerLayout::Composite { master, slave } => {
                timers[master.index()] = TimerRegs {
                    con: control.bits(),
                    pr: period,
                    ..TimerRegs::default()
                };
                timers[slave.index()] = TimerRegs::default();
            }
        }
        trace!(
            "{}: TxCON={:#06x} PR={:#x}",
            timer,
            control.bits(),
            period
        );
        Ok(())
    }

    fn close(&mut self, timer: TimerId) -> HalResult<()> {
        let mut timers = self.state.timers.lock();
        match timer.layout() {
            TimerLayout::Single(physical) => timers[physical.index()].con = 0,
            TimerLayout::Composite { master, slave } => {
                timers[master.index()].con = 0;
                timers[slave.index()].con = 0;
            }
        }
        Ok(())
    }

    fn read_period(&self, timer: TimerId) -> HalResult<u32> {
        let timers = self.state.timers.lock();
        Ok(mask(timers[timer.master().index()].pr, timer.width()))
    }

    fn read_counter(&self, timer: TimerId) -> HalResult<u32> {
        let timers = self.state.timers.lock();
        Ok(mask(timers[timer.master().index()].tmr, timer.width()))
    }

    fn write_counter(&mut self, timer: TimerId, value: u32) -> HalResult<()> {
        let mut timers = self.state.timers.lock();
        let regs = &mut timers[timer.master().index()];
        regs.tmr = mask(value, timer.width());
        regs.prescaler = 0;
        Ok(())
    }
}

/// Master of the pair `timer` is the slave of.
fn pair_master(timer: PhysicalTimer) -> Option<PhysicalTimer> {
    match timer {
        PhysicalTimer::T3 => Some(PhysicalTimer::T2),
        PhysicalTimer::T5 => Some(PhysicalTimer::T4),
        _ => None,
    }
}

fn mask(value: u32, width: CounterWidth) -> u32 {
    value & width.max_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimChip;
    use hal::{IdleMode, Prescale};

    fn control(timer: TimerId, prescale: Prescale) -> TimerControl {
        TimerControl::new(timer, prescale, true, IdleMode::Continue)
    }

    #[test]
    fn sixteen_bit_registers_truncate() {
        let chip = SimChip::new();
        let mut timers = chip.timers();
        timers
            .open(TimerId::T4, control(TimerId::T4, Prescale::Div1), 0x1_2345)
            .unwrap();
        assert_eq!(timers.read_period(TimerId::T4), Ok(0x2345));

        timers.write_counter(TimerId::T4, 0xABCD_0001).unwrap();
        assert_eq!(timers.read_counter(TimerId::T4), Ok(1));
    }

    #[test]
    fn composite_period_lives_in_master() {
        let chip = SimChip::new();
        let mut timers = chip.timers();
        timers
            .open(TimerId::T23, control(TimerId::T23, Prescale::Div1), 0x0012_3456)
            .unwrap();

        assert_eq!(timers.read_period(TimerId::T23), Ok(0x0012_3456));
        assert!(chip.timer_control(PhysicalTimer::T2).is_32bit());
        assert_eq!(chip.timer_control(PhysicalTimer::T3).bits(), 0);
    }

    #[test]
    fn slave_of_running_pair_is_busy() {
        let chip = SimChip::new();
        let mut timers = chip.timers();
        timers
            .open(TimerId::T45, control(TimerId::T45, Prescale::Div8), 1_000)
            .unwrap();
        assert_eq!(
            timers.open(TimerId::T5, control(TimerId::T5, Prescale::Div8), 10),
            Err(HalError::Busy)
        );
    }

    #[test]
    fn mismatched_t32_is_rejected() {
        let chip = SimChip::new();
        let mut timers = chip.timers();
        let word = control(TimerId::T2, Prescale::Div1);
        assert_eq!(
            timers.open(TimerId::T23, word, 10),
            Err(HalError::ConfigurationError)
        );
    }

    #[test]
    fn advance_counts_prescaled_ticks() {
        let chip = SimChip::new();
        let mut timers = chip.timers();
        timers
            .open(TimerId::T2, control(TimerId::T2, Prescale::Div8), 99)
            .unwrap();

        // 7 clocks stay in the prescaler.
        assert_eq!(timers.advance(TimerId::T2, 7), 0);
        assert_eq!(timers.read_counter(TimerId::T2), Ok(0));

        assert_eq!(timers.advance(TimerId::T2, 1 + 8 * 150), 1);
        assert_eq!(timers.read_counter(TimerId::T2), Ok(51));
        assert!(chip.interrupts().is_flag_set(PhysicalTimer::T2));
    }

    #[test]
    fn composite_rollover_flags_slave() {
        let chip = SimChip::new();
        let mut timers = chip.timers();
        timers
            .open(TimerId::T45, control(TimerId::T45, Prescale::Div1), 99_999)
            .unwrap();

        assert_eq!(timers.advance(TimerId::T45, 250_000), 2);
        assert_eq!(timers.read_counter(TimerId::T45), Ok(50_000));
        assert!(chip.interrupts().is_flag_set(PhysicalTimer::T5));
        assert!(!chip.interrupts().is_flag_set(PhysicalTimer::T4));
    }

    #[test]
    fn closed_timer_ignores_clocks() {
        let chip = SimChip::new();
        let mut timers = chip.timers();
        timers
            .open(TimerId::T1, control(TimerId::T1, Prescale::Div1), 9)
            .unwrap();
        timers.close(TimerId::T1).unwrap();
        timers.close(TimerId::T1).unwrap();

        assert_eq!(timers.advance(TimerId::T1, 1_000), 0);
        assert!(!chip.interrupts().is_flag_set(PhysicalTimer::T1));
    }
}
