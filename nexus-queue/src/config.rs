//! Construction-time configuration for rings.

use crate::ring::{Ring, RingError};

/// Ring configuration. Capacity is independent of any pool it serves.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingConfig {
    /// Maximum queued elements.
    pub capacity: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

impl RingConfig {
    /// Check the capacity.
    pub fn validate(&self) -> Result<(), RingError> {
        if self.capacity == 0 {
            return Err(RingError::ZeroCapacity);
        }
        Ok(())
    }

    /// Build an empty ring from this config.
    pub fn build<T>(&self) -> Result<Ring<T>, RingError> {
        self.validate()?;
        Ring::with_capacity(self.capacity)
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn config_round_trips() {
        let config = RingConfig { capacity: 3 };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"capacity":3}"#);

        let back: RingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.build::<u8>().unwrap().capacity(), 3);
    }
}
