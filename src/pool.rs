//! Reusable wrapper pools.
//!
//! A [`Pool`] keeps a free list of boxed [`Slot`]s. Acquiring pops a slot (or
//! allocates one when the list is empty) and binds a native handle to it;
//! releasing clears the binding and pushes the slot back. The pool grows
//! without bound and never evicts; it only saves allocations under
//! connection churn.
//!
//! ```
//! use wsbridge::pool::Pool;
//!
//! let pool = Pool::new();
//! let slot = pool.acquire(7u32);
//! assert_eq!(slot.native(), Some(&7));
//!
//! assert_eq!(pool.release(slot), Some(7));
//! assert_eq!(pool.idle(), 1);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::transport::NativeConn;

/// A pooled wrapper holding at most one native handle.
///
/// The handle is `Some` only between acquire and release.
#[derive(Debug)]
pub struct Slot<N> {
    native: Option<N>,
}

impl<N> Default for Slot<N> {
    fn default() -> Self {
        Self { native: None }
    }
}

impl<N> Slot<N> {
    /// Get the bound native handle.
    #[inline]
    pub fn native(&self) -> Option<&N> {
        self.native.as_ref()
    }

    /// Get the bound native handle mutably.
    #[inline]
    pub fn native_mut(&mut self) -> Option<&mut N> {
        self.native.as_mut()
    }

    /// Check if a native handle is bound.
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.native.is_some()
    }
}

/// Snapshot of a pool's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Slots allocated over the pool's lifetime.
    pub allocated: usize,
    /// Successful acquisitions.
    pub acquired: usize,
    /// Releases back to the free list.
    pub released: usize,
}

impl PoolStats {
    /// Slots acquired and not yet released.
    #[must_use]
    pub const fn in_use(&self) -> usize {
        self.acquired.saturating_sub(self.released)
    }
}

/// Free list of reusable [`Slot`]s for native handles of type `N`.
///
/// Safe to share between tasks. The lock only guards the free list, never the
/// native handles themselves.
#[derive(Debug)]
pub struct Pool<N> {
    free: Mutex<Vec<Box<Slot<N>>>>,
    allocated: AtomicUsize,
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl<N> Default for Pool<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Pool<N> {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            allocated: AtomicUsize::new(0),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    /// Create a pool with `capacity` idle slots already allocated.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let free = (0..capacity).map(|_| Box::<Slot<N>>::default()).collect();
        Self {
            free: Mutex::new(free),
            allocated: AtomicUsize::new(capacity),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
        }
    }

    /// Take a slot from the free list, or allocate one, and bind `native` to it.
    ///
    /// Binding is unconditional; the native handle's state is not inspected.
    pub fn acquire(&self, native: N) -> Box<Slot<N>> {
        let reused = self.free.lock().pop();
        let mut slot = match reused {
            Some(slot) => slot,
            None => {
                let total = self.allocated.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::trace!(allocated = total, "pool allocated new slot");
                Box::default()
            }
        };
        debug_assert!(!slot.is_bound(), "idle slot still bound");
        slot.native = Some(native);
        self.acquired.fetch_add(1, Ordering::Relaxed);
        slot
    }

    /// Clear the slot's binding and return it to the free list.
    ///
    /// Returns the native handle that was bound.
    pub fn release(&self, slot: Box<Slot<N>>) -> Option<N> {
        let mut native = None;
        self.release_with(slot, |n| native = Some(n));
        native
    }

    /// Clear the slot's binding, hand the native handle to `finish`, then
    /// return the slot to the free list.
    ///
    /// `finish` runs before the slot becomes visible to other acquirers.
    pub fn release_with<F>(&self, mut slot: Box<Slot<N>>, finish: F)
    where
        F: FnOnce(N),
    {
        if let Some(native) = slot.native.take() {
            finish(native);
        }
        self.released.fetch_add(1, Ordering::Relaxed);
        self.free.lock().push(slot);
    }

    /// Number of idle slots on the free list.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    /// Snapshot the pool's counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated.load(Ordering::Relaxed),
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
        }
    }
}

/// The connection pool and frame pool serving one transport.
///
/// Cloning is cheap and shares both pools.
pub struct Pools<C: NativeConn> {
    conns: Arc<Pool<C>>,
    frames: Arc<Pool<C::Frame>>,
}

impl<C: NativeConn> Pools<C> {
    /// Create empty pools.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create pools with `capacity` idle slots each.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            conns: Arc::new(Pool::with_capacity(capacity)),
            frames: Arc::new(Pool::with_capacity(capacity)),
        }
    }

    /// Pool of connection wrappers.
    pub fn conns(&self) -> &Arc<Pool<C>> {
        &self.conns
    }

    /// Pool of frame wrappers.
    pub fn frames(&self) -> &Arc<Pool<C::Frame>> {
        &self.frames
    }
}

impl<C: NativeConn> Default for Pools<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: NativeConn> Clone for Pools<C> {
    fn clone(&self) -> Self {
        Self {
            conns: Arc::clone(&self.conns),
            frames: Arc::clone(&self.frames),
        }
    }
}

impl<C: NativeConn> std::fmt::Debug for Pools<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pools")
            .field("conns", &self.conns.stats())
            .field("frames", &self.frames.stats())
            .finish()
    }
}
