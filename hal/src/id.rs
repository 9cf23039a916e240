//! Timer and output-compare identifiers

use core::fmt;

use crate::error::HalError;

/// Counter width of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterWidth {
    /// A single physical timer.
    Bits16,
    /// Two physical timers cascaded into one counter.
    Bits32,
}

impl CounterWidth {
    /// Number of distinct counts, i.e. counts in `[0, limit)` are representable.
    pub const fn limit(self) -> u64 {
        match self {
            Self::Bits16 => 1 << 16,
            Self::Bits32 => 1 << 32,
        }
    }

    /// Largest representable count.
    pub const fn max_count(self) -> u32 {
        (self.limit() - 1) as u32
    }
}

/// One of the five physical timer modules.
///
/// Only physical timers own an interrupt vector and a pending flag.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhysicalTimer {
    T1 = 0,
    T2 = 1,
    T3 = 2,
    T4 = 3,
    T5 = 4,
}

impl PhysicalTimer {
    /// Number of physical timers.
    pub const COUNT: usize = 5;

    /// All physical timers in index order.
    pub const ALL: [PhysicalTimer; Self::COUNT] = [Self::T1, Self::T2, Self::T3, Self::T4, Self::T5];

    /// Zero-based index, usable for per-timer tables.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Timer1 is a Type A timer; Timers 2..5 are Type B and can be cascaded.
    #[inline]
    pub const fn is_type_a(self) -> bool {
        matches!(self, Self::T1)
    }
}

impl fmt::Display for PhysicalTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TMR{}", self.index() + 1)
    }
}

/// How a [`TimerId`] maps onto physical timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerLayout {
    /// A single 16-bit timer.
    Single(PhysicalTimer),
    /// A 32-bit pair: `master` holds the configuration and the count,
    /// `slave` raises the interrupt.
    Composite {
        master: PhysicalTimer,
        slave: PhysicalTimer,
    },
}

impl TimerLayout {
    pub const fn width(self) -> CounterWidth {
        match self {
            Self::Single(_) => CounterWidth::Bits16,
            Self::Composite { .. } => CounterWidth::Bits32,
        }
    }
}

/// Timer selected by the application.
///
/// The raw encoding matches the legacy `TIMER1`..`TIMER45` constants.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    T1 = 0,
    T2 = 1,
    T3 = 2,
    T4 = 3,
    T5 = 4,
    /// Timers 2 and 3 cascaded.
    T23 = 5,
    /// Timers 4 and 5 cascaded.
    T45 = 6,
}

impl TimerId {
    /// All recognized identifiers.
    pub const ALL: [TimerId; 7] = [
        Self::T1,
        Self::T2,
        Self::T3,
        Self::T4,
        Self::T5,
        Self::T23,
        Self::T45,
    ];

    pub const fn layout(self) -> TimerLayout {
        match self {
            Self::T1 => TimerLayout::Single(PhysicalTimer::T1),
            Self::T2 => TimerLayout::Single(PhysicalTimer::T2),
            Self::T3 => TimerLayout::Single(PhysicalTimer::T3),
            Self::T4 => TimerLayout::Single(PhysicalTimer::T4),
            Self::T5 => TimerLayout::Single(PhysicalTimer::T5),
            Self::T23 => TimerLayout::Composite {
                master: PhysicalTimer::T2,
                slave: PhysicalTimer::T3,
            },
            Self::T45 => TimerLayout::Composite {
                master: PhysicalTimer::T4,
                slave: PhysicalTimer::T5,
            },
        }
    }

    #[inline]
    pub const fn width(self) -> CounterWidth {
        self.layout().width()
    }

    #[inline]
    pub const fn is_composite(self) -> bool {
        matches!(self.layout(), TimerLayout::Composite { .. })
    }

    /// The physical timer whose flag fires for this identifier.
    ///
    /// A cascaded pair only interrupts on its odd (slave) timer.
    pub const fn interrupt_source(self) -> PhysicalTimer {
        match self.layout() {
            TimerLayout::Single(timer) => timer,
            TimerLayout::Composite { slave, .. } => slave,
        }
    }

    /// The physical timer holding configuration and count.
    pub const fn master(self) -> PhysicalTimer {
        match self.layout() {
            TimerLayout::Single(timer) => timer,
            TimerLayout::Composite { master, .. } => master,
        }
    }
}

impl From<PhysicalTimer> for TimerId {
    fn from(timer: PhysicalTimer) -> Self {
        match timer {
            PhysicalTimer::T1 => Self::T1,
            PhysicalTimer::T2 => Self::T2,
            PhysicalTimer::T3 => Self::T3,
            PhysicalTimer::T4 => Self::T4,
            PhysicalTimer::T5 => Self::T5,
        }
    }
}

impl TryFrom<u8> for TimerId {
    type Error = HalError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(raw as usize)
            .copied()
            .ok_or(HalError::InvalidParameter)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::T23 => write!(f, "TMR23"),
            Self::T45 => write!(f, "TMR45"),
            other => write!(f, "{}", other.master()),
        }
    }
}

/// Output-compare module.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcId {
    Oc1 = 1,
    Oc2 = 2,
    Oc3 = 3,
    Oc4 = 4,
    Oc5 = 5,
}

impl OcId {
    pub const COUNT: usize = 5;

    pub const ALL: [OcId; Self::COUNT] = [Self::Oc1, Self::Oc2, Self::Oc3, Self::Oc4, Self::Oc5];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize - 1
    }
}

impl TryFrom<u8> for OcId {
    type Error = HalError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1..=5 => Ok(Self::ALL[raw as usize - 1]),
            _ => Err(HalError::InvalidParameter),
        }
    }
}

impl fmt::Display for OcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OC{}", *self as u8)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PhysicalTimer {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "TMR{}", self.index() + 1);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimerId {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::T23 => defmt::write!(fmt, "TMR23"),
            Self::T45 => defmt::write!(fmt, "TMR45"),
            other => defmt::write!(fmt, "{}", other.master()),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OcId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "OC{}", *self as u8);
    }
}
