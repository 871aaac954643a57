//! Lock-free `f64` stock cell.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe stock counter holding an `f64` as its bit pattern.
///
/// The only mutation is [`add_and_get`](StockCounter::add_and_get), a
/// compare-and-swap loop, so concurrent trades never lose updates. Counters
/// are shared as `Arc<StockCounter>` and the same instance follows an item
/// through its lifecycle.
pub struct StockCounter {
    bits: AtomicU64,
}

impl StockCounter {
    /// Create a counter holding `value`.
    #[inline]
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    /// Current value.
    #[inline]
    #[must_use]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Atomically add `delta` and return the resulting value.
    pub fn add_and_get(&self, delta: f64) -> f64 {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let next = f64::from_bits(current) + delta;
            match self.bits.compare_exchange_weak(
                current,
                next.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }
}

impl Default for StockCounter {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl fmt::Debug for StockCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StockCounter").field(&self.get()).finish()
    }
}
