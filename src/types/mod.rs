//! Data types for gamebot inputs and peripheral state.
//!
//! - Buttons, hat directions and stick positions
//! - Query-state snapshots and counter rates

pub mod input;
pub mod state;

pub use input::{Buttons, Hat, STICK_CENTER, STICK_MAX, STICK_MIN, StickPosition, clamp_axis};
pub use state::{CounterRates, DeviceState, FLAG_CONFIGURED, counter_delta, counter_rate};
