//! Read-only and diagnostic traversal of the free and used lists.
//!
//! None of this sits on the hot path. Traversal follows the live links, so
//! it reports list order exactly as `allocate`/`release` left it.

use std::iter::FusedIterator;
use std::ops::ControlFlow;

use crate::meta::{Link, SlotState, free_sentinel, used_sentinel};
use crate::{Handle, Pool};

/// Which lists [`Pool::visit`] walks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lists {
    /// Free list only.
    Free,
    /// Used list only.
    Used,
    /// Free list, then used list.
    All,
}

impl Lists {
    #[inline]
    const fn includes(self, state: SlotState) -> bool {
        matches!(
            (self, state),
            (Self::All, _) | (Self::Free, SlotState::Free) | (Self::Used, SlotState::Used)
        )
    }
}

/// One slot as seen by a [`Pool::visit`] visitor.
///
/// `prev`/`next` are neighbouring slot indices in the same list, `None` at
/// the list ends. The visitor may change the payload but has no access to
/// the links themselves.
#[derive(Debug)]
pub struct Visit<'a, T> {
    /// Slot index.
    pub index: u32,
    /// List the slot is on.
    pub state: SlotState,
    /// Previous slot in the list.
    pub prev: Option<u32>,
    /// Next slot in the list.
    pub next: Option<u32>,
    /// Slot payload.
    pub value: &'a mut T,
}

impl<T> Pool<T> {
    /// Walk the selected lists in list order, free list first.
    ///
    /// The visitor returns [`ControlFlow::Break`] to stop early; the break is
    /// passed back to the caller.
    ///
    /// ```
    /// use std::ops::ControlFlow;
    /// use nexus_pool::{Lists, Pool};
    ///
    /// let mut pool: Pool<u32> = Pool::with_capacity(4).unwrap();
    /// let mut seen = Vec::new();
    /// let _ = pool.visit(Lists::All, |slot| {
    ///     *slot.value = 0;
    ///     seen.push(slot.index);
    ///     ControlFlow::Continue(())
    /// });
    /// assert_eq!(seen, vec![0, 1, 2, 3]);
    /// ```
    pub fn visit<F>(&mut self, lists: Lists, mut visitor: F) -> ControlFlow<()>
    where
        F: FnMut(Visit<'_, T>) -> ControlFlow<()>,
    {
        for state in [SlotState::Free, SlotState::Used] {
            if !lists.includes(state) {
                continue;
            }

            let sentinel = self.sentinel(state);
            let links = &self.links;
            let values = &mut self.values;

            let mut cursor = links[sentinel as usize].next;
            while cursor != sentinel {
                let link = links[cursor as usize];
                visitor(Visit {
                    index: cursor,
                    state,
                    prev: neighbour(link.prev, sentinel),
                    next: neighbour(link.next, sentinel),
                    value: &mut values[cursor as usize],
                })?;
                cursor = link.next;
            }
        }
        ControlFlow::Continue(())
    }

    /// Iterate `(slot index, payload)` over one list, in list order.
    pub fn iter(&self, state: SlotState) -> Iter<'_, T> {
        let sentinel = self.sentinel(state);
        Iter {
            values: &self.values,
            links: &self.links,
            sentinel,
            cursor: self.links[sentinel as usize].next,
            remaining: self.count(state),
        }
    }

    /// Iterate live handles in used-list order (most recently allocated
    /// first).
    pub fn used_handles(&self) -> UsedHandles<'_> {
        let sentinel = used_sentinel(self.capacity);
        UsedHandles {
            links: &self.links,
            pool: self.id,
            sentinel,
            cursor: self.links[sentinel as usize].next,
            remaining: self.used_len as usize,
        }
    }

    #[inline]
    fn sentinel(&self, state: SlotState) -> u32 {
        match state {
            SlotState::Free => free_sentinel(self.capacity),
            SlotState::Used => used_sentinel(self.capacity),
        }
    }

    #[inline]
    fn count(&self, state: SlotState) -> usize {
        match state {
            SlotState::Free => self.free_len as usize,
            SlotState::Used => self.used_len as usize,
        }
    }
}

#[inline]
fn neighbour(idx: u32, sentinel: u32) -> Option<u32> {
    (idx != sentinel).then_some(idx)
}

/// Iterator over one of the pool's lists. See [`Pool::iter`].
pub struct Iter<'a, T> {
    values: &'a [T],
    links: &'a [Link],
    sentinel: u32,
    cursor: u32,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (u32, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == self.sentinel {
            return None;
        }
        let idx = self.cursor;
        self.cursor = self.links[idx as usize].next;
        self.remaining -= 1;
        Some((idx, &self.values[idx as usize]))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator over live handles. See [`Pool::used_handles`].
pub struct UsedHandles<'a> {
    links: &'a [Link],
    pool: u64,
    sentinel: u32,
    cursor: u32,
    remaining: usize,
}

impl Iterator for UsedHandles<'_> {
    type Item = Handle;

    #[inline]
    fn next(&mut self) -> Option<Handle> {
        if self.cursor == self.sentinel {
            return None;
        }
        let idx = self.cursor;
        let link = self.links[idx as usize];
        self.cursor = link.next;
        self.remaining -= 1;
        Some(Handle::new(self.pool, idx, link.generation))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for UsedHandles<'_> {}
impl FusedIterator for UsedHandles<'_> {}
