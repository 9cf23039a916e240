//! Runtime configuration for the timer services.

use hal::{IdleMode, InterruptPriority, InterruptSubpriority};

/// Configuration shared by the timer, interrupt and PWM services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimersConfig {
    /// Clock feeding the timer prescalers, in hertz.
    pub peripheral_clock_hz: u32,
    /// Level at which timer vectors are installed.
    pub interrupt_priority: InterruptPriority,
    pub interrupt_subpriority: InterruptSubpriority,
    /// Whether timers keep counting while the CPU idles.
    pub idle_mode: IdleMode,
}

impl Default for TimersConfig {
    fn default() -> Self {
        Self {
            peripheral_clock_hz: 80_000_000,
            interrupt_priority: 3,
            interrupt_subpriority: 0,
            idle_mode: IdleMode::Continue,
        }
    }
}

impl TimersConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> TimersConfigBuilder {
        TimersConfigBuilder::default()
    }

    /// Whole clock cycles per microsecond.
    pub const fn cycles_per_us(&self) -> u32 {
        self.peripheral_clock_hz / 1_000_000
    }
}

/// Builder for [`TimersConfig`].
#[derive(Debug, Clone, Default)]
pub struct TimersConfigBuilder {
    config: TimersConfig,
}

impl TimersConfigBuilder {
    /// Sets the peripheral bus clock in hertz.
    pub fn peripheral_clock_hz(mut self, hz: u32) -> Self {
        self.config.peripheral_clock_hz = hz;
        self
    }

    /// Sets the priority and sub-priority used when attaching interrupts.
    pub fn interrupt_priority(
        mut self,
        priority: InterruptPriority,
        subpriority: InterruptSubpriority,
    ) -> Self {
        self.config.interrupt_priority = priority;
        self.config.interrupt_subpriority = subpriority;
        self
    }

    pub fn idle_mode(mut self, mode: IdleMode) -> Self {
        self.config.idle_mode = mode;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> TimersConfig {
        self.config
    }
}
