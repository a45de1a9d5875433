//! Single-owner bounded FIFO ring.
//!
//! Capacity is exact: `with_capacity(3)` holds three elements, and head/tail
//! wrap modulo capacity rather than a power-of-two mask. Full and empty are
//! ordinary results (`Err(Full)` / `None`), never errors.
//!
//! # Example
//!
//! ```
//! use nexus_queue::Ring;
//!
//! let mut ring = Ring::<u32>::with_capacity(2).unwrap();
//! ring.push(1).unwrap();
//! ring.push(2).unwrap();
//! assert_eq!(ring.push(3).unwrap_err().into_inner(), 3);
//!
//! assert_eq!(ring.front(), Some(&1));
//! assert_eq!(ring.back(), Some(&2));
//! assert_eq!(ring.pop(), Some(1));
//! assert_eq!(ring.pop(), Some(2));
//! assert_eq!(ring.pop(), None);
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::mem::MaybeUninit;

use thiserror::Error;
use tracing::{debug, trace};

/// Error during ring construction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RingError {
    /// Capacity is zero.
    #[error("capacity cannot be zero")]
    ZeroCapacity,
    /// Buffer could not be reserved.
    #[error("buffer allocation failed for {slots} slots")]
    AllocationFailed {
        /// Requested capacity.
        slots: usize,
    },
}

/// Returned by [`Ring::push`] when the ring is full.
/// Contains the value that could not be pushed.
#[derive(Clone, Copy, PartialEq, Eq, Error)]
#[error("ring is full")]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the value that could not be pushed.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Full(..)")
    }
}

/// Bounded FIFO ring buffer.
///
/// Stores elements by value. For pool handles that means the ring records
/// order only; the pool still owns the slots.
pub struct Ring<T> {
    buffer: Box<[MaybeUninit<T>]>,
    /// Index of the oldest element.
    head: usize,
    /// Index the next push writes to.
    tail: usize,
    len: usize,
}

impl<T> Ring<T> {
    /// Create an empty ring holding at most `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Result<Self, RingError> {
        if capacity == 0 {
            return Err(RingError::ZeroCapacity);
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| RingError::AllocationFailed { slots: capacity })?;
        buffer.resize_with(capacity, MaybeUninit::uninit);

        debug!(capacity, "ring initialized");

        Ok(Self {
            buffer: buffer.into_boxed_slice(),
            head: 0,
            tail: 0,
            len: 0,
        })
    }

    /// Append at the tail.
    ///
    /// Returns `Err(Full(value))` if the ring is full, handing the value
    /// back. The ring is unchanged in that case.
    #[inline]
    pub fn push(&mut self, value: T) -> Result<(), Full<T>> {
        if self.is_full() {
            trace!(capacity = self.capacity(), "ring full");
            return Err(Full(value));
        }

        self.buffer[self.tail] = MaybeUninit::new(value);
        self.tail = self.wrap(self.tail + 1);
        self.len += 1;
        Ok(())
    }

    /// Remove and return the element at the head, or `None` if empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        // Safety: slots in [head, head + len) are initialized, and head is
        // advanced past this one before it can be read again.
        let value = unsafe { self.buffer[self.head].assume_init_read() };
        self.head = self.wrap(self.head + 1);
        self.len -= 1;
        Some(value)
    }

    /// Oldest element, without removing it.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        // Safety: head is initialized when len > 0.
        Some(unsafe { self.buffer[self.head].assume_init_ref() })
    }

    /// Most recently pushed element, without removing it.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }
        let last = self.wrap(self.tail + self.capacity() - 1);
        // Safety: the slot before tail is initialized when len > 0.
        Some(unsafe { self.buffer[last].assume_init_ref() })
    }

    /// Number of queued elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Maximum number of elements.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if a push would fail.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.buffer.len()
    }

    /// Drop every queued element.
    pub fn clear(&mut self) {
        while self.pop().is_some() {}
        self.head = 0;
        self.tail = 0;
    }

    /// Iterate front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            ring: self,
            pos: self.head,
            remaining: self.len,
        }
    }

    #[inline]
    fn wrap(&self, idx: usize) -> usize {
        idx % self.buffer.len()
    }
}

impl<T> Drop for Ring<T> {
    fn drop(&mut self) {
        while self.pop().is_some() {}
    }
}

impl<T: fmt::Debug> fmt::Debug for Ring<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a Ring<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// Front-to-back iterator. See [`Ring::iter`].
pub struct Iter<'a, T> {
    ring: &'a Ring<T>,
    pos: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        // Safety: pos walks exactly the len initialized slots from head.
        let item = unsafe { self.ring.buffer[self.pos].assume_init_ref() };
        self.pos = self.ring.wrap(self.pos + 1);
        self.remaining -= 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}
