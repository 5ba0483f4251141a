// Devcap Evdev Feature Gate
// Memoized lookup of the kernel evdev-support feature flag

use std::sync::atomic::{AtomicU8, Ordering};

use crate::sysctl::SysctlSource;

/// Feature flag exposing whether the kernel was built with evdev
/// support.
pub const EVDEV_FEATURE: &str = "kern.features.evdev_support";

const STATE_UNKNOWN: u8 = 0;
const STATE_DISABLED: u8 = 1;
const STATE_ENABLED: u8 = 2;

/// Process-lifetime cache of the evdev feature flag.
///
/// Only a successful read settles the state; a failed query reports
/// the flag as disabled without caching, so it is re-read on the
/// next call. Concurrent first access may query twice, which is
/// harmless; the atomic store keeps the cache itself race-free.
#[derive(Debug, Default)]
pub struct EvdevGate {
    state: AtomicU8,
}

impl EvdevGate {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(STATE_UNKNOWN),
        }
    }

    /// Whether the kernel exposes devices through the evdev
    /// interface.
    pub fn is_enabled(&self, sysctl: &dyn SysctlSource) -> bool {
        match self.state.load(Ordering::Acquire) {
            STATE_ENABLED => true,
            STATE_DISABLED => false,
            _ => match sysctl.int_value(EVDEV_FEATURE) {
                Ok(value) => {
                    let enabled = value != 0;
                    let state = if enabled { STATE_ENABLED } else { STATE_DISABLED };
                    self.state.store(state, Ordering::Release);
                    log::trace!("evdev support: {}", enabled);
                    enabled
                }
                Err(err) => {
                    log::debug!("evdev feature flag unreadable ({}), assuming disabled", err);
                    false
                }
            },
        }
    }
}
