//! Optional coarse-grained concurrency boundary around the engine.

use spin::Mutex;

use crate::clock::RealTimeClock;
use crate::engine::FatEngine;
use crate::flash::FlashPort;

/// A `FatEngine` behind a `spin::Mutex`, for callers that share one
/// engine across contexts (e.g. an interrupt handler and a foreground
/// task). The engine's own correctness does not require this; serializing
/// calls is a caller concern the core is happy to not impose (see the
/// concurrency notes on `FatEngine`).
pub struct SharedFatEngine<F: FlashPort, C: RealTimeClock> {
    inner: Mutex<FatEngine<F, C>>,
}

impl<F: FlashPort, C: RealTimeClock> SharedFatEngine<F, C> {
    pub fn new(flash: F, clock: C) -> Self {
        Self {
            inner: Mutex::new(FatEngine::new(flash, clock)),
        }
    }

    /// Run `f` with exclusive access to the wrapped engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut FatEngine<F, C>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}
