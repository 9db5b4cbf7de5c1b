//! Peripheral state reported by the query-state request.

/// Flag bit: the USB side of the peripheral is configured by the host.
pub const FLAG_CONFIGURED: u8 = 0x01;

/// Snapshot returned by `Q` (query state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceState {
    /// Raw flag byte.
    pub flags: u8,
    /// Command queue head index.
    pub head: u8,
    /// Command queue tail index.
    pub tail: u8,
    /// Number of queued commands.
    pub count: u8,
    /// Free-running interrupt counter (wraps at 2^32).
    pub interrupt_counter: u32,
    /// Milliseconds elapsed on the current command (wraps at 2^32).
    pub command_elapsed_counter: u32,
    /// Echo counter.
    pub echo_count: u8,
}

impl DeviceState {
    /// Returns true if the peripheral reports a configured USB link.
    #[must_use]
    pub const fn configured(&self) -> bool {
        self.flags & FLAG_CONFIGURED != 0
    }

    /// Derives counter rates against an earlier snapshot taken `seconds` ago.
    #[must_use]
    pub fn rates_since(&self, earlier: &Self, seconds: f64) -> CounterRates {
        CounterRates {
            interrupts_per_sec: counter_rate(
                earlier.interrupt_counter,
                self.interrupt_counter,
                seconds,
            ),
            command_elapsed_per_sec: counter_rate(
                earlier.command_elapsed_counter,
                self.command_elapsed_counter,
                seconds,
            ),
        }
    }
}

/// Per-second rates derived from two [`DeviceState`] snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterRates {
    pub interrupts_per_sec: f64,
    pub command_elapsed_per_sec: f64,
}

/// Difference between two readings of a wrapping 32-bit counter.
#[must_use]
pub const fn counter_delta(first: u32, second: u32) -> u32 {
    second.wrapping_sub(first)
}

/// Average rate of a wrapping 32-bit counter over `seconds`.
#[must_use]
pub fn counter_rate(first: u32, second: u32, seconds: f64) -> f64 {
    f64::from(counter_delta(first, second)) / seconds
}
