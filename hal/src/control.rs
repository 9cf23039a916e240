//! Control register words for timers (`TxCON`) and output-compare modules (`OCxCON`).
//!
//! Drivers receive a fully encoded control word and write it in one access, so
//! enable, idle behaviour and prescale take effect together.

use core::fmt;

use crate::id::{PhysicalTimer, TimerId};

/// Timer input clock prescaler.
///
/// Ordered by increasing divisor; only these four steps exist on every timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Prescale {
    Div1,
    Div8,
    Div64,
    Div256,
}

impl Prescale {
    /// All prescalers, smallest divisor first.
    pub const ASCENDING: [Prescale; 4] = [Self::Div1, Self::Div8, Self::Div64, Self::Div256];

    pub const fn divisor(self) -> u32 {
        1 << self.shift()
    }

    /// Right shift equivalent to dividing by [`divisor`](Self::divisor).
    pub const fn shift(self) -> u32 {
        match self {
            Self::Div1 => 0,
            Self::Div8 => 3,
            Self::Div64 => 6,
            Self::Div256 => 8,
        }
    }

    /// `TCKPS` field value. Type A and Type B timers encode the same
    /// divisor differently.
    const fn tckps(self, timer: PhysicalTimer) -> u32 {
        match (timer.is_type_a(), self) {
            (true, Self::Div1) => 0,
            (true, Self::Div8) => 1,
            (true, Self::Div64) => 2,
            (true, Self::Div256) => 3,
            (false, Self::Div1) => 0,
            (false, Self::Div8) => 3,
            (false, Self::Div64) => 6,
            (false, Self::Div256) => 7,
        }
    }

    fn from_tckps(timer: PhysicalTimer, code: u32) -> Option<Self> {
        Self::ASCENDING
            .iter()
            .copied()
            .find(|prescale| prescale.tckps(timer) == code)
    }
}

impl fmt::Display for Prescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1:{}", self.divisor())
    }
}

/// Timer behaviour while the CPU is in idle mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleMode {
    #[default]
    Continue,
    Stop,
}

/// Encoded `TxCON` word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerControl(u32);

impl TimerControl {
    pub const ON: u32 = 1 << 15;
    pub const SIDL: u32 = 1 << 13;
    pub const T32: u32 = 1 << 3;
    const TCKPS_POS: u32 = 4;

    /// Builds the control word for `timer`.
    ///
    /// Composite timers are configured through their master, which gets the
    /// `T32` bit.
    pub fn new(timer: TimerId, prescale: Prescale, enabled: bool, idle: IdleMode) -> Self {
        let mut bits = prescale.tckps(timer.master()) << Self::TCKPS_POS;
        if enabled {
            bits |= Self::ON;
        }
        if idle == IdleMode::Stop {
            bits |= Self::SIDL;
        }
        if timer.is_composite() {
            bits |= Self::T32;
        }
        Self(bits)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_enabled(self) -> bool {
        self.0 & Self::ON != 0
    }

    pub const fn is_32bit(self) -> bool {
        self.0 & Self::T32 != 0
    }

    pub const fn idle_mode(self) -> IdleMode {
        if self.0 & Self::SIDL != 0 {
            IdleMode::Stop
        } else {
            IdleMode::Continue
        }
    }

    /// Decodes the prescaler as seen by `timer`.
    ///
    /// Returns `None` for Type B codes outside the four supported steps.
    pub fn prescale(self, timer: PhysicalTimer) -> Option<Prescale> {
        let mask = if timer.is_type_a() { 0b11 } else { 0b111 };
        Prescale::from_tckps(timer, (self.0 >> Self::TCKPS_POS) & mask)
    }
}

/// Timer that clocks an output-compare module in 16-bit mode (`OCTSEL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSelect {
    Timer2,
    Timer3,
}

/// Encoded `OCxCON` word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OcControl(u32);

impl OcControl {
    pub const ON: u32 = 1 << 15;
    pub const SIDL: u32 = 1 << 13;
    pub const OC32: u32 = 1 << 5;
    pub const OCTSEL: u32 = 1 << 3;
    const OCM_MASK: u32 = 0b111;
    /// PWM mode, fault pin disabled.
    pub const OCM_PWM: u32 = 0b110;

    /// PWM on a 16-bit timer.
    pub const fn pwm16(select: TimerSelect) -> Self {
        let mut bits = Self::ON | Self::OCM_PWM;
        if let TimerSelect::Timer3 = select {
            bits |= Self::OCTSEL;
        }
        Self(bits)
    }

    /// PWM on the cascaded Timer2/3 pair.
    pub const fn pwm32() -> Self {
        Self(Self::ON | Self::OCM_PWM | Self::OC32)
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_enabled(self) -> bool {
        self.0 & Self::ON != 0
    }

    pub const fn is_32bit(self) -> bool {
        self.0 & Self::OC32 != 0
    }

    pub const fn is_pwm(self) -> bool {
        self.0 & Self::OCM_MASK == Self::OCM_PWM
    }

    /// Source-select bit: Timer2 when clear, Timer3 when set.
    pub const fn timer_select(self) -> TimerSelect {
        if self.0 & Self::OCTSEL != 0 {
            TimerSelect::Timer3
        } else {
            TimerSelect::Timer2
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Prescale {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "1:{}", self.divisor());
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerControl {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "TxCON({=u32:#06x})", self.0);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OcControl {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "OCxCON({=u32:#06x})", self.0);
    }
}
