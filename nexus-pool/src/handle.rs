//! Opaque slot handles.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Pool ids start at 1 so a zeroed handle never matches a live pool.
/// 64 bits never wrap in practice, so ids are not reused within a process.
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Reserve a process-unique pool id.
pub(crate) fn next_pool_id() -> u64 {
    NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed)
}

/// Opaque reference to a checked-out slot.
///
/// A handle names a slot index, the pool that issued it, and the slot's
/// generation at allocation time. Releasing a slot bumps its generation, so
/// every copy of the handle goes stale at once: the pool rejects it instead
/// of operating on a slot that has since been handed to someone else.
///
/// Handles are `Copy`, like [`usize`] keys into a slab. Holding a copy after
/// release is harmless; using it is detected.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    pool: u64,
    index: u32,
    generation: u32,
}

impl Handle {
    #[inline]
    pub(crate) const fn new(pool: u64, index: u32, generation: u32) -> Self {
        Self {
            pool,
            index,
            generation,
        }
    }

    /// Slot index within the pool's backing store.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation the slot had when this handle was issued.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Id of the pool that issued this handle.
    #[inline]
    pub const fn pool_id(self) -> u64 {
        self.pool
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}:{}v{})", self.pool, self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let h = Handle::new(7, 42, 3);
        assert_eq!(h.pool_id(), 7);
        assert_eq!(h.index(), 42);
        assert_eq!(h.generation(), 3);
    }

    #[test]
    fn generation_distinguishes_handles() {
        let a = Handle::new(1, 0, 0);
        let b = Handle::new(1, 0, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn pool_ids_are_unique() {
        let a = next_pool_id();
        let b = next_pool_id();
        assert_ne!(a, b);
        assert_ne!(a, 0);
    }

    #[test]
    fn pool_ids_do_not_wrap_past_u32() {
        NEXT_POOL_ID.fetch_max(u64::from(u32::MAX), Ordering::Relaxed);
        let a = next_pool_id();
        let b = next_pool_id();
        assert!(a >= u64::from(u32::MAX));
        assert!(b > a);
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Handle::new(2, 5, 9)), "Handle(2:5v9)");
    }
}
