//! Error types for pool construction and release.

use thiserror::Error;

use crate::Handle;

/// Why a handle was rejected by [`Pool::release`](crate::Pool::release).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InvalidReason {
    /// Handle was issued by a different pool.
    #[error("handle belongs to another pool")]
    ForeignPool,
    /// Slot index is past the pool's capacity.
    #[error("slot index out of bounds")]
    OutOfBounds,
    /// Slot is free, or was released and reallocated since the handle was
    /// issued (generation mismatch).
    #[error("slot is not allocated to this handle")]
    NotAllocated,
}

/// Errors raised by the pool.
///
/// Exhaustion is not an error: [`Pool::allocate`](crate::Pool::allocate)
/// returns `None` when no slot is free.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Capacity is zero.
    #[error("capacity cannot be zero")]
    ZeroCapacity,
    /// Capacity does not fit the pool's `u32` slot index space.
    #[error("capacity {requested} exceeds maximum {max}")]
    CapacityTooLarge {
        /// Requested slot count.
        requested: usize,
        /// Largest supported slot count.
        max: usize,
    },
    /// Backing store could not be reserved.
    #[error("backing store allocation failed for {slots} slots")]
    AllocationFailed {
        /// Requested slot count.
        slots: usize,
    },
    /// Release was called with a handle the pool does not consider live.
    #[error("invalid handle {handle:?}: {reason}")]
    InvalidHandle {
        /// The rejected handle.
        handle: Handle,
        /// Which check it failed.
        reason: InvalidReason,
    },
}

impl PoolError {
    /// Returns true for the errors that abort pool construction.
    #[must_use]
    pub const fn is_initialization(&self) -> bool {
        matches!(
            self,
            Self::ZeroCapacity | Self::CapacityTooLarge { .. } | Self::AllocationFailed { .. }
        )
    }

    /// Returns the rejected handle for [`PoolError::InvalidHandle`].
    #[must_use]
    pub const fn handle(&self) -> Option<Handle> {
        match self {
            Self::InvalidHandle { handle, .. } => Some(*handle),
            _ => None,
        }
    }
}
