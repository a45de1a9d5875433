//! Mutex-guarded ring for sharing across threads.
//!
//! Same contract as the pool's shared mode: blocking calls always do their
//! work, `try_*` calls report a held lock as [`Contended`] and never pass it
//! off as full or empty.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;
use parking_lot::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::trace;

use crate::ring::{Full, Ring};

/// The lock was held by another thread; nothing was done.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("ring lock is contended")]
pub struct Contended;

/// Error from [`SharedRing::try_push`]. Both variants hand the value back.
#[derive(PartialEq, Eq, Error)]
pub enum TryPushError<T> {
    /// Ring is full.
    #[error("ring is full")]
    Full(T),
    /// Lock was held.
    #[error("ring lock is contended")]
    Contended(T),
}

impl<T> TryPushError<T> {
    /// Returns the value that could not be pushed.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(v) | Self::Contended(v) => v,
        }
    }
}

impl<T> std::fmt::Debug for TryPushError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Full(..)"),
            Self::Contended(_) => f.write_str("Contended(..)"),
        }
    }
}

/// A [`Ring`] behind a mutex.
pub struct SharedRing<T> {
    inner: Mutex<Ring<T>>,
    contended: CachePadded<AtomicU64>,
}

impl<T> SharedRing<T> {
    /// Wrap an existing ring.
    pub fn new(ring: Ring<T>) -> Self {
        Self {
            inner: Mutex::new(ring),
            contended: CachePadded::new(AtomicU64::new(0)),
        }
    }

    /// Push, waiting for the lock.
    #[inline]
    pub fn push(&self, value: T) -> Result<(), Full<T>> {
        self.inner.lock().push(value)
    }

    /// Pop, waiting for the lock.
    #[inline]
    pub fn pop(&self) -> Option<T> {
        self.inner.lock().pop()
    }

    /// Push without blocking.
    #[inline]
    pub fn try_push(&self, value: T) -> Result<(), TryPushError<T>> {
        match self.try_lock() {
            Ok(mut ring) => ring.push(value).map_err(|Full(v)| TryPushError::Full(v)),
            Err(Contended) => Err(TryPushError::Contended(value)),
        }
    }

    /// Pop without blocking. `Ok(None)` means the ring is empty.
    #[inline]
    pub fn try_pop(&self) -> Result<Option<T>, Contended> {
        Ok(self.try_lock()?.pop())
    }

    /// Lock the ring for a sequence of operations (peek then pop, iterate).
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, Ring<T>> {
        self.inner.lock()
    }

    /// Lock the ring if it is free right now.
    #[inline]
    pub fn try_lock(&self) -> Result<MutexGuard<'_, Ring<T>>, Contended> {
        match self.inner.try_lock() {
            Some(guard) => Ok(guard),
            None => {
                self.contended.fetch_add(1, Ordering::Relaxed);
                trace!("ring lock contended");
                Err(Contended)
            }
        }
    }

    /// Number of `try_*` calls that found the lock held.
    #[inline]
    pub fn contended(&self) -> u64 {
        self.contended.load(Ordering::Relaxed)
    }

    /// Unwrap the ring.
    pub fn into_inner(self) -> Ring<T> {
        self.inner.into_inner()
    }
}

impl<T> From<Ring<T>> for SharedRing<T> {
    fn from(ring: Ring<T>) -> Self {
        Self::new(ring)
    }
}
