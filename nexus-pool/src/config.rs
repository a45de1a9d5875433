//! Construction-time configuration.

use crate::error::PoolError;
use crate::meta::MAX_CAPACITY;
use crate::Pool;

/// Pool configuration. Capacity is fixed for the pool's lifetime.
///
/// With the `serde` feature enabled this can be deserialized straight out of
/// an application config file:
///
/// ```toml
/// [pool]
/// capacity = 4096
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    /// Number of slots in the backing store.
    pub capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

impl PoolConfig {
    /// Check the capacity against the pool's limits.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }
        if self.capacity > MAX_CAPACITY {
            return Err(PoolError::CapacityTooLarge {
                requested: self.capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(())
    }
}

/// Builder for [`Pool`].
///
/// ```
/// use nexus_pool::{Pool, PoolBuilder};
///
/// let pool: Pool<u64> = PoolBuilder::default().capacity(16).build().unwrap();
/// assert_eq!(pool.capacity(), 16);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PoolBuilder {
    capacity: Option<usize>,
}

impl PoolBuilder {
    /// Number of slots. Required.
    pub fn capacity(mut self, slots: usize) -> Self {
        self.capacity = Some(slots);
        self
    }

    /// Resolve the builder into a validated config.
    pub fn config(&self) -> Result<PoolConfig, PoolError> {
        let config = PoolConfig {
            capacity: self.capacity.ok_or(PoolError::ZeroCapacity)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build a pool whose slots start as `T::default()`.
    pub fn build<T: Default>(self) -> Result<Pool<T>, PoolError> {
        self.build_with(|_| T::default())
    }

    /// Build a pool, constructing each slot's payload from its index.
    pub fn build_with<T, F>(self, factory: F) -> Result<Pool<T>, PoolError>
    where
        F: FnMut(u32) -> T,
    {
        let config = self.config()?;
        Pool::with_factory(config.capacity, factory)
    }
}
