//! Out-of-band slot bookkeeping for the pool.
//!
//! Payloads never carry link fields. Each slot instead owns one [`Link`] in a
//! parallel array, and the array carries two extra entries past the last
//! slot that act as list sentinels. Both lists are circular around their
//! sentinel, so splicing never has to special-case an empty list.

use std::collections::TryReserveError;

/// Which of the two lists a slot is currently threaded on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Slot is unallocated, on the free list.
    Free,
    /// Slot is checked out, on the used list.
    Used,
}

/// Per-slot link metadata.
///
/// Size: 16 bytes (3 x u32 + state), so four links share a cache line.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Link {
    /// Previous entry in the current list (slot or sentinel index).
    pub prev: u32,
    /// Next entry in the current list (slot or sentinel index).
    pub next: u32,
    /// Bumped on every release. Handles carry the value they were issued with.
    pub generation: u32,
    /// Which list this entry belongs to. Sentinels carry their own list.
    pub state: SlotState,
}

impl Link {
    /// A self-looped entry: an empty list when used as a sentinel.
    #[inline]
    pub const fn looped(idx: u32, state: SlotState) -> Self {
        Self {
            prev: idx,
            next: idx,
            generation: 0,
            state,
        }
    }
}

/// Index of the free-list sentinel for a pool of `capacity` slots.
#[inline]
pub(crate) const fn free_sentinel(capacity: u32) -> u32 {
    capacity
}

/// Index of the used-list sentinel for a pool of `capacity` slots.
#[inline]
pub(crate) const fn used_sentinel(capacity: u32) -> u32 {
    capacity + 1
}

/// Largest pool capacity that still leaves room for both sentinels.
pub(crate) const MAX_CAPACITY: usize = (u32::MAX - 2) as usize;

/// Build the link array: every slot threaded onto the free list in
/// ascending index order, used list empty.
pub(crate) fn thread_free(capacity: u32) -> Result<Vec<Link>, TryReserveError> {
    let free = free_sentinel(capacity);
    let used = used_sentinel(capacity);
    let n = capacity as usize;

    let mut links = Vec::new();
    links.try_reserve_exact(n + 2)?;
    for i in 0..capacity {
        links.push(Link {
            prev: if i == 0 { free } else { i - 1 },
            next: if i + 1 == capacity { free } else { i + 1 },
            generation: 0,
            state: SlotState::Free,
        });
    }

    let mut free_head = Link::looped(free, SlotState::Free);
    if capacity > 0 {
        free_head.next = 0;
        free_head.prev = capacity - 1;
    }
    links.push(free_head);
    links.push(Link::looped(used, SlotState::Used));
    Ok(links)
}
