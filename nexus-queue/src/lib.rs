//! # nexus-queue
//!
//! Bounded FIFO ring queue for sequencing values, typically handles checked
//! out of a `nexus-pool` pool, in producer/consumer order.
//!
//! ## Features
//!
//! - **Ring**: single-owner ring with exact capacity and O(1) push/pop
//! - **SharedRing**: mutex-guarded ring for sharing across threads, with
//!   non-blocking variants that report contention explicitly
//!
//! ## Design Goals
//!
//! - No allocations after construction
//! - Full and empty are ordinary results, never errors
//! - `pop` returns the removed value; no separate peek-then-discard step
//!
//! ## Example
//!
//! ```
//! use nexus_queue::Ring;
//!
//! let mut ring = Ring::<u64>::with_capacity(3).unwrap();
//!
//! ring.push(42).unwrap();
//! assert_eq!(ring.front(), Some(&42));
//! assert_eq!(ring.pop(), Some(42));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod ring;
pub mod shared;

pub use config::RingConfig;
pub use ring::{Full, Iter, Ring, RingError};
pub use shared::{Contended, SharedRing, TryPushError};
