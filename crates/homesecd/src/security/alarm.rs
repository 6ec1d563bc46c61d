//! Armed flag of the alarm.

use std::sync::atomic::{AtomicBool, Ordering};

/// Armed state shared by every connection worker.
#[derive(Debug, Default)]
pub struct AlarmState {
    armed: AtomicBool,
}

impl AlarmState {
    /// Creates the state with the given initial value.
    #[must_use]
    pub const fn new(armed: bool) -> Self {
        Self {
            armed: AtomicBool::new(armed),
        }
    }

    /// Whether the alarm is armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&self) -> bool {
        !self.armed.fetch_xor(true, Ordering::SeqCst)
    }
}
