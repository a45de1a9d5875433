//! Mutex-guarded pool for sharing across threads.
//!
//! Blocking calls always complete their operation. The `try_*` calls never
//! block, and report a held lock as [`Contended`] rather than folding it
//! into exhaustion: `Ok(None)` from [`SharedPool::try_allocate`] always
//! means the pool really is empty.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;
use parking_lot::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::trace;

use crate::{Handle, Pool, PoolError};

/// The lock was held by another thread; nothing was done.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("pool lock is contended")]
pub struct Contended;

/// Error from [`SharedPool::try_release`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TryReleaseError {
    /// The lock was held. The handle is still live; retry with it.
    #[error("pool lock is contended, handle {0:?} not released")]
    Contended(Handle),
    /// The pool rejected the handle.
    #[error(transparent)]
    Invalid(#[from] PoolError),
}

/// A [`Pool`] behind a mutex.
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
/// use nexus_pool::{Pool, SharedPool};
///
/// let pool = Arc::new(SharedPool::new(Pool::<u64>::with_capacity(64).unwrap()));
///
/// let workers: Vec<_> = (0..4)
///     .map(|_| {
///         let pool = Arc::clone(&pool);
///         thread::spawn(move || {
///             for _ in 0..100 {
///                 if let Some(h) = pool.allocate() {
///                     pool.release(h).unwrap();
///                 }
///             }
///         })
///     })
///     .collect();
///
/// for w in workers {
///     w.join().unwrap();
/// }
/// assert_eq!(pool.lock().free_count(), 64);
/// ```
pub struct SharedPool<T> {
    inner: Mutex<Pool<T>>,
    contended: CachePadded<AtomicU64>,
}

impl<T> SharedPool<T> {
    /// Wrap an initialized pool.
    pub fn new(pool: Pool<T>) -> Self {
        Self {
            inner: Mutex::new(pool),
            contended: CachePadded::new(AtomicU64::new(0)),
        }
    }

    /// Allocate, waiting for the lock. `None` means the pool is exhausted.
    #[inline]
    pub fn allocate(&self) -> Option<Handle> {
        self.inner.lock().allocate()
    }

    /// Release, waiting for the lock.
    #[inline]
    pub fn release(&self, handle: Handle) -> Result<(), PoolError> {
        self.inner.lock().release(handle)
    }

    /// Allocate without blocking.
    ///
    /// `Ok(None)` means exhausted; `Err(Contended)` means the lock was
    /// held and the pool was not inspected.
    #[inline]
    pub fn try_allocate(&self) -> Result<Option<Handle>, Contended> {
        Ok(self.try_lock()?.allocate())
    }

    /// Release without blocking.
    #[inline]
    pub fn try_release(&self, handle: Handle) -> Result<(), TryReleaseError> {
        let mut pool = self
            .try_lock()
            .map_err(|Contended| TryReleaseError::Contended(handle))?;
        pool.release(handle)?;
        Ok(())
    }

    /// Lock the pool for a sequence of operations.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, Pool<T>> {
        self.inner.lock()
    }

    /// Lock the pool if it is free right now.
    #[inline]
    pub fn try_lock(&self) -> Result<MutexGuard<'_, Pool<T>>, Contended> {
        match self.inner.try_lock() {
            Some(guard) => Ok(guard),
            None => {
                self.contended.fetch_add(1, Ordering::Relaxed);
                trace!("pool lock contended");
                Err(Contended)
            }
        }
    }

    /// Number of `try_*` calls that found the lock held.
    #[inline]
    pub fn contended(&self) -> u64 {
        self.contended.load(Ordering::Relaxed)
    }

    /// Unwrap the pool.
    pub fn into_inner(self) -> Pool<T> {
        self.inner.into_inner()
    }
}

impl<T> From<Pool<T>> for SharedPool<T> {
    fn from(pool: Pool<T>) -> Self {
        Self::new(pool)
    }
}
