//! Running token total across every model call an engine makes.

use scenarist_core::TokenUsage;
use std::sync::Mutex;

/// Tokens billed by the provider, recorded as each response arrives.
///
/// A call is counted once it returns, even when its stage fails afterwards.
#[derive(Debug, Default)]
pub struct UsageMeter {
    inner: Mutex<MeterState>,
}

#[derive(Debug, Default, Clone, Copy)]
struct MeterState {
    usage: TokenUsage,
    calls: u32,
}

impl UsageMeter {
    /// Meter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, usage: TokenUsage) {
        let mut state = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.usage += usage;
        state.calls += 1;
    }

    /// Tokens recorded so far.
    pub fn usage(&self) -> TokenUsage {
        self.snapshot().usage
    }

    /// Model calls that returned a response.
    pub fn calls(&self) -> u32 {
        self.snapshot().calls
    }

    /// Current total, resetting the meter to zero.
    pub fn take(&self) -> TokenUsage {
        let mut state = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *state).usage
    }

    fn snapshot(&self) -> MeterState {
        *self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
