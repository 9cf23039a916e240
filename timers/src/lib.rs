//! # pic32-timers
//!
//! Timer services for the PIC32MX timer subsystem: five 16-bit timers (two
//! pairs of which cascade into 32-bit timers), their interrupts, and PWM on
//! the five output-compare modules.
//!
//! ## Module Overview
//! - [`period`]     – microseconds to prescaler and period register.
//! - [`controller`] – start, stop, reset and read back timers.
//! - [`dispatch`]   – one interrupt callback per physical timer.
//! - [`pwm`]        – duty cycles scaled to the feeding timer's live period.
//! - [`config`]     – clock and interrupt-level configuration.
//!
//! Hardware access goes through the driver traits of the `hal` crate; a port
//! implements them and calls [`InterruptDispatch`] from its timer vectors.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod period;
pub mod pwm;

pub use config::{TimersConfig, TimersConfigBuilder};
pub use controller::{TimerConfig, TimerController};
pub use dispatch::InterruptDispatch;
pub use error::{DispatchError, PwmError, TimerError};
pub use period::{resolve, Resolution};
pub use pwm::{PwmChannel, PwmController, PwmSource};

pub use hal::{
    CounterWidth, HalError, IdleMode, InterruptContext, InterruptController, InterruptHandler,
    OcControl, OcId, OutputCompareDriver, PhysicalTimer, Prescale, TimerControl, TimerDriver,
    TimerId, TimerSelect,
};
