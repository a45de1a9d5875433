//! nexus-pool - Fixed-capacity object pool with O(1) allocate/release.
//!
//! All slots are allocated once at construction. After that, allocating and
//! releasing only moves a slot between two index-linked lists (free and
//! used); nothing touches the global allocator on the hot path.
//!
//! # Design
//!
//! ```text
//! values: [T; N]                    payloads, never moved
//! links:  [Link; N + 2]             prev/next/generation/state per slot
//!                   ^   ^
//!                   |   used-list sentinel (index N + 1)
//!                   free-list sentinel (index N)
//! ```
//!
//! Links live out of band, so payload types carry no link fields and
//! payload code cannot corrupt the lists. Both lists are circular around
//! their sentinel: splicing a slot is the same four stores whatever its
//! position.
//!
//! Handles carry the slot's generation. Releasing a slot bumps it, so a stale
//! or duplicated handle is rejected instead of releasing someone else's slot.
//!
//! # Example
//!
//! ```
//! use nexus_pool::Pool;
//!
//! #[derive(Default)]
//! struct Frame {
//!     seq: u64,
//!     len: usize,
//! }
//!
//! let mut pool: Pool<Frame> = Pool::with_capacity(4).unwrap();
//!
//! let h = pool.allocate().expect("pool exhausted");
//! pool.get_mut(h).unwrap().seq = 7;
//! assert_eq!(pool.used_count(), 1);
//!
//! pool.release(h).unwrap();
//! assert_eq!(pool.free_count(), 4);
//!
//! // The handle is stale now.
//! assert!(pool.release(h).is_err());
//! ```
//!
//! # Threading
//!
//! [`Pool`] is single-owner: every mutation takes `&mut self`. Share it
//! across threads through [`SharedPool`], which guards it with a mutex and
//! reports lock contention separately from exhaustion.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod handle;
mod meta;
mod shared;
mod visit;

pub use config::{PoolBuilder, PoolConfig};
pub use error::{InvalidReason, PoolError};
pub use handle::Handle;
pub use meta::SlotState;
pub use shared::{Contended, SharedPool, TryReleaseError};
pub use visit::{Iter, Lists, UsedHandles, Visit};

use std::collections::TryReserveError;

use meta::{Link, MAX_CAPACITY, free_sentinel, thread_free, used_sentinel};
use tracing::{debug, error, trace};

// =============================================================================
// Pool
// =============================================================================

/// Fixed-capacity slot allocator.
///
/// Every slot is on exactly one of the free list or the used list, and
/// `free_count() + used_count() == capacity()` holds after every call.
pub struct Pool<T> {
    id: u64,
    capacity: u32,

    // Slot storage. Length == capacity.
    values: Box<[T]>,
    // Slot links plus the two sentinels. Length == capacity + 2.
    links: Box<[Link]>,

    free_len: u32,
    used_len: u32,
}

impl<T: Default> Pool<T> {
    /// Create a pool of `capacity` slots initialized with `T::default()`.
    pub fn with_capacity(capacity: usize) -> Result<Self, PoolError> {
        Self::with_factory(capacity, |_| T::default())
    }

    /// Create a pool from a validated config.
    pub fn from_config(config: &PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        Self::with_capacity(config.capacity)
    }
}

impl<T> Pool<T> {
    /// Create a pool of `capacity` slots, building each payload from its
    /// slot index.
    ///
    /// All slots start on the free list in ascending index order.
    pub fn with_factory<F>(capacity: usize, mut factory: F) -> Result<Self, PoolError>
    where
        F: FnMut(u32) -> T,
    {
        if capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }
        if capacity > MAX_CAPACITY {
            return Err(PoolError::CapacityTooLarge {
                requested: capacity,
                max: MAX_CAPACITY,
            });
        }

        let slots = capacity as u32;
        let alloc_failed = |_: TryReserveError| PoolError::AllocationFailed { slots: capacity };

        let mut values = Vec::new();
        values.try_reserve_exact(capacity).map_err(alloc_failed)?;
        values.extend((0..slots).map(&mut factory));

        let links = thread_free(slots).map_err(alloc_failed)?;

        let id = handle::next_pool_id();
        debug!(pool = id, capacity, "pool initialized");

        Ok(Self {
            id,
            capacity: slots,
            values: values.into_boxed_slice(),
            links: links.into_boxed_slice(),
            free_len: slots,
            used_len: 0,
        })
    }

    /// Check out a free slot.
    ///
    /// Returns `None` when every slot is in use. That is a normal condition
    /// the caller is expected to handle (drop, retry, apply backpressure).
    ///
    /// The slot's payload is left as the previous holder wrote it.
    #[inline]
    pub fn allocate(&mut self) -> Option<Handle> {
        let free = free_sentinel(self.capacity);
        let idx = self.links[free as usize].next;
        if idx == free {
            trace!(pool = self.id, "pool exhausted");
            return None;
        }

        self.unlink(idx);
        self.push_front(used_sentinel(self.capacity), idx);
        self.links[idx as usize].state = SlotState::Used;

        self.free_len -= 1;
        self.used_len += 1;

        Some(Handle::new(self.id, idx, self.links[idx as usize].generation))
    }

    /// Return a slot to the free list.
    ///
    /// The slot may sit anywhere on the used list. On success every copy of
    /// `handle` becomes stale.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidHandle`] if the handle came from another pool,
    /// is out of range, or its slot is free or has been reallocated since.
    /// The pool is left untouched.
    #[inline]
    pub fn release(&mut self, handle: Handle) -> Result<(), PoolError> {
        if let Err(reason) = self.check(handle) {
            error!(pool = self.id, ?handle, %reason, "release rejected");
            return Err(PoolError::InvalidHandle { handle, reason });
        }

        let idx = handle.index();
        self.unlink(idx);
        self.push_front(free_sentinel(self.capacity), idx);

        let link = &mut self.links[idx as usize];
        link.state = SlotState::Free;
        link.generation = link.generation.wrapping_add(1);

        self.used_len -= 1;
        self.free_len += 1;

        Ok(())
    }

    /// Shared reference to a live slot's payload.
    #[inline]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.check(handle).ok()?;
        Some(&self.values[handle.index() as usize])
    }

    /// Mutable reference to a live slot's payload.
    #[inline]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.check(handle).ok()?;
        Some(&mut self.values[handle.index() as usize])
    }

    /// Returns true if `handle` names a slot currently checked out to it.
    #[inline]
    pub fn contains(&self, handle: Handle) -> bool {
        self.check(handle).is_ok()
    }

    /// Number of free slots.
    #[inline]
    pub fn free_count(&self) -> usize {
        self.free_len as usize
    }

    /// Number of checked-out slots.
    #[inline]
    pub fn used_count(&self) -> usize {
        self.used_len as usize
    }

    /// Total slots, fixed at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    /// Returns true if no slot is free.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.free_len == 0
    }

    /// Process-unique id stamped into every handle this pool issues.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Tear the pool down, dropping every payload.
    ///
    /// Outstanding handles become foreign to any later pool, since ids are
    /// never reused.
    pub fn teardown(self) {
        debug!(
            pool = self.id,
            outstanding = self.used_len,
            "pool torn down"
        );
    }
}

// =============================================================================
// Internal: list operations
// =============================================================================

impl<T> Pool<T> {
    /// Validate a handle against the live slot state.
    #[inline]
    fn check(&self, handle: Handle) -> Result<(), InvalidReason> {
        if handle.pool_id() != self.id {
            return Err(InvalidReason::ForeignPool);
        }
        if handle.index() >= self.capacity {
            return Err(InvalidReason::OutOfBounds);
        }
        let link = &self.links[handle.index() as usize];
        if link.state != SlotState::Used || link.generation != handle.generation() {
            return Err(InvalidReason::NotAllocated);
        }
        Ok(())
    }

    /// Unlink a slot from whichever list holds it. O(1).
    ///
    /// The slot's own prev/next are left dangling; caller relinks it.
    #[inline]
    fn unlink(&mut self, idx: u32) {
        let Link { prev, next, .. } = self.links[idx as usize];
        self.links[prev as usize].next = next;
        self.links[next as usize].prev = prev;
    }

    /// Splice a slot in directly after a sentinel. O(1).
    #[inline]
    fn push_front(&mut self, sentinel: u32, idx: u32) {
        let first = self.links[sentinel as usize].next;

        let link = &mut self.links[idx as usize];
        link.prev = sentinel;
        link.next = first;

        self.links[first as usize].prev = idx;
        self.links[sentinel as usize].next = idx;
    }
}

impl<T> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("free", &self.free_len)
            .field("used", &self.used_len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::rc::Rc;

    fn pool(capacity: usize) -> Pool<u64> {
        Pool::with_capacity(capacity).unwrap()
    }

    fn list(pool: &Pool<u64>, state: SlotState) -> Vec<u32> {
        pool.iter(state).map(|(idx, _)| idx).collect()
    }

    // =========================================================================
    // Construction
    // =========================================================================

    #[test]
    fn new_pool_is_all_free() {
        let pool = pool(8);
        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.free_count(), 8);
        assert_eq!(pool.used_count(), 0);
        assert!(!pool.is_exhausted());
    }

    #[test]
    fn free_list_in_index_order() {
        let pool = pool(4);
        assert_eq!(list(&pool, SlotState::Free), vec![0, 1, 2, 3]);
        assert!(list(&pool, SlotState::Used).is_empty());
    }

    #[test]
    fn zero_capacity_error() {
        let result = Pool::<u64>::with_capacity(0);
        assert!(matches!(result, Err(PoolError::ZeroCapacity)));
    }

    #[test]
    fn oversized_capacity_error() {
        let result = Pool::<()>::with_factory(MAX_CAPACITY + 1, |_| ());
        assert!(matches!(result, Err(PoolError::CapacityTooLarge { .. })));
    }

    #[test]
    fn from_config() {
        let pool = Pool::<u8>::from_config(&PoolConfig { capacity: 3 }).unwrap();
        assert_eq!(pool.capacity(), 3);
    }

    #[test]
    fn pools_get_distinct_ids() {
        let a = pool(1);
        let b = pool(1);
        assert_ne!(a.id(), b.id());
    }

    // =========================================================================
    // Allocate
    // =========================================================================

    #[test]
    fn allocate_takes_free_head() {
        let mut pool = pool(4);
        let h = pool.allocate().unwrap();
        assert_eq!(h.index(), 0);
        assert_eq!(list(&pool, SlotState::Free), vec![1, 2, 3]);
        assert_eq!(list(&pool, SlotState::Used), vec![0]);
    }

    #[test]
    fn used_list_is_head_inserted() {
        let mut pool = pool(4);
        for _ in 0..3 {
            pool.allocate().unwrap();
        }
        assert_eq!(list(&pool, SlotState::Used), vec![2, 1, 0]);
    }

    #[test]
    fn exhaustion_returns_none() {
        let mut pool = pool(2);
        assert!(pool.allocate().is_some());
        assert!(pool.allocate().is_some());
        assert!(pool.is_exhausted());
        assert!(pool.allocate().is_none());
        assert_eq!(pool.used_count(), 2);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn handles_are_distinct() {
        let mut pool = pool(16);
        let handles: HashSet<_> = (0..16).map(|_| pool.allocate().unwrap().index()).collect();
        assert_eq!(handles.len(), 16);
    }

    // =========================================================================
    // Release
    // =========================================================================

    #[test]
    fn release_from_middle_of_used_list() {
        let mut pool = pool(4);
        let a = pool.allocate().unwrap();
        let b = pool.allocate().unwrap();
        let c = pool.allocate().unwrap();

        pool.release(b).unwrap();

        assert_eq!(list(&pool, SlotState::Used), vec![c.index(), a.index()]);
        assert_eq!(list(&pool, SlotState::Free), vec![b.index(), 3]);
    }

    #[test]
    fn release_tail_and_head() {
        let mut pool = pool(3);
        let a = pool.allocate().unwrap();
        let b = pool.allocate().unwrap();
        let c = pool.allocate().unwrap();

        // a is the used-list tail, c its head
        pool.release(a).unwrap();
        pool.release(c).unwrap();
        assert_eq!(list(&pool, SlotState::Used), vec![b.index()]);

        pool.release(b).unwrap();
        assert!(list(&pool, SlotState::Used).is_empty());
        assert_eq!(pool.free_count(), 3);
    }

    #[test]
    fn release_reuses_slot_lifo() {
        let mut pool = pool(4);
        let a = pool.allocate().unwrap();
        pool.release(a).unwrap();

        let b = pool.allocate().unwrap();
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
    }

    #[test]
    fn double_release_rejected() {
        let mut pool = pool(2);
        let h = pool.allocate().unwrap();
        pool.release(h).unwrap();

        let err = pool.release(h).unwrap_err();
        assert_eq!(
            err,
            PoolError::InvalidHandle {
                handle: h,
                reason: InvalidReason::NotAllocated
            }
        );
        assert_eq!(pool.free_count(), 2);
        assert_eq!(pool.used_count(), 0);
    }

    #[test]
    fn stale_handle_after_reuse_rejected() {
        let mut pool = pool(1);
        let old = pool.allocate().unwrap();
        pool.release(old).unwrap();
        let new = pool.allocate().unwrap();

        assert!(matches!(
            pool.release(old),
            Err(PoolError::InvalidHandle {
                reason: InvalidReason::NotAllocated,
                ..
            })
        ));
        // The current holder is unaffected.
        assert!(pool.contains(new));
        assert_eq!(pool.used_count(), 1);
    }

    #[test]
    fn foreign_handle_rejected() {
        let mut a = pool(2);
        let mut b = pool(2);
        let h = a.allocate().unwrap();

        assert!(matches!(
            b.release(h),
            Err(PoolError::InvalidHandle {
                reason: InvalidReason::ForeignPool,
                ..
            })
        ));
        assert_eq!(b.free_count(), 2);
    }

    #[test]
    fn out_of_bounds_handle_rejected() {
        let mut pool = pool(2);
        let bogus = Handle::new(pool.id(), 2, 0);
        assert!(matches!(
            pool.release(bogus),
            Err(PoolError::InvalidHandle {
                reason: InvalidReason::OutOfBounds,
                ..
            })
        ));
    }

    #[test]
    fn never_allocated_slot_rejected() {
        let mut pool = pool(2);
        let forged = Handle::new(pool.id(), 1, 0);
        assert!(pool.release(forged).is_err());
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn generation_wraps() {
        let mut pool = pool(1);
        pool.links[0].generation = u32::MAX;

        let h = pool.allocate().unwrap();
        assert_eq!(h.generation(), u32::MAX);
        pool.release(h).unwrap();

        let h = pool.allocate().unwrap();
        assert_eq!(h.generation(), 0);
    }

    // =========================================================================
    // Payload access
    // =========================================================================

    #[test]
    fn get_and_get_mut() {
        let mut pool = pool(2);
        let h = pool.allocate().unwrap();
        *pool.get_mut(h).unwrap() = 42;
        assert_eq!(pool.get(h), Some(&42));
    }

    #[test]
    fn get_after_release_is_none() {
        let mut pool = pool(2);
        let h = pool.allocate().unwrap();
        pool.release(h).unwrap();
        assert!(pool.get(h).is_none());
        assert!(pool.get_mut(h).is_none());
        assert!(!pool.contains(h));
    }

    #[test]
    fn payload_survives_release() {
        // The pool never resets payloads; that is the caller's job.
        let mut pool = pool(1);
        let h = pool.allocate().unwrap();
        *pool.get_mut(h).unwrap() = 7;
        pool.release(h).unwrap();

        let h = pool.allocate().unwrap();
        assert_eq!(pool.get(h), Some(&7));
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    #[test]
    fn teardown_drops_payloads() {
        let marker = Rc::new(());
        let mut pool = Pool::with_factory(3, |_| Rc::clone(&marker)).unwrap();
        pool.allocate().unwrap();
        assert_eq!(Rc::strong_count(&marker), 4);

        pool.teardown();
        assert_eq!(Rc::strong_count(&marker), 1);
    }

    #[test]
    fn handle_from_torn_down_pool_is_foreign() {
        let mut old = pool(1);
        let h = old.allocate().unwrap();
        old.teardown();

        let mut fresh = pool(1);
        assert!(matches!(
            fresh.release(h),
            Err(PoolError::InvalidHandle {
                reason: InvalidReason::ForeignPool,
                ..
            })
        ));
    }

    // =========================================================================
    // Scenario
    // =========================================================================

    #[test]
    fn capacity_four_scenario() {
        let mut pool = pool(4);

        let handles: Vec<_> = (0..4).map(|_| pool.allocate().unwrap()).collect();
        let distinct: HashSet<_> = handles.iter().map(|h| h.index()).collect();
        assert_eq!(distinct.len(), 4);

        assert!(pool.allocate().is_none());

        pool.release(handles[2]).unwrap();
        let again = pool.allocate().unwrap();
        assert_eq!(again.index(), handles[2].index());

        assert_eq!(pool.used_count(), 4);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn churn_keeps_counts() {
        let mut pool = pool(32);
        let mut live = Vec::new();

        for round in 0..1000u32 {
            if round % 3 == 2 && !live.is_empty() {
                let h = live.swap_remove((round as usize * 7) % live.len());
                pool.release(h).unwrap();
            } else if let Some(h) = pool.allocate() {
                live.push(h);
            }
            assert_eq!(pool.free_count() + pool.used_count(), pool.capacity());
            assert_eq!(pool.used_count(), live.len());
        }
    }
}
