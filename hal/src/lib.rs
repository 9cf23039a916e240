//! Peripheral capabilities for the PIC32MX timer subsystem
//!
//! This crate describes the boundary between the timer services and the
//! hardware: identifiers for the five timers and five output-compare modules,
//! encoded control words, and the driver traits a port implements.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod control;
pub mod error;
pub mod id;
pub mod interrupt;
pub mod output_compare;
pub mod timer;

// Re-export commonly used types
pub use control::{IdleMode, OcControl, Prescale, TimerControl, TimerSelect};
pub use error::{HalError, HalResult};
pub use id::{CounterWidth, OcId, PhysicalTimer, TimerId, TimerLayout};
pub use interrupt::{
    InterruptContext, InterruptController, InterruptHandler, InterruptPriority,
    InterruptSubpriority, MAX_SUBPRIORITY, PRIORITY_LEVELS,
};
pub use output_compare::OutputCompareDriver;
pub use timer::TimerDriver;
