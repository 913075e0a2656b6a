//! Fixed-capacity containers for latency-sensitive and embedded-style code.
//!
//! The core is [`SpscRing<T, N>`]: a lock-free single-producer
//! single-consumer ring buffer with inline storage, compile-time capacity,
//! and no allocation after construction. Around it sit the containers and
//! helpers such code keeps reaching for: a heap-backed ring validated at run
//! time, sequential fixed-capacity collections, typed flag sets, a
//! once-initialized global cell, and small vector/quaternion math.
//!
//! # Key features
//!
//! - **Lock-free SPSC core**: two cursors, acquire/release pairing, no CAS,
//!   no spinning; single-item and chunked (two-segment) transfers
//! - **Reserved-slot convention**: power-of-two slot count, usable capacity
//!   `N - 1`, full and empty distinguished by cursor comparison alone
//! - **No hidden allocation**: inline storage in `static`-capable types;
//!   the heap ring allocates once, up front
//! - **Typed failure**: construction errors as values, rejected operations
//!   visible in return values, optional loud [`FailFast`] policy
//!
//! # Example
//!
//! ```
//! use ringspsc::SpscRing;
//!
//! let mut ring: SpscRing<u64, 256> = SpscRing::new();
//! let (mut tx, mut rx) = ring.split();
//!
//! std::thread::scope(|s| {
//!     s.spawn(move || {
//!         for v in 0..1000u64 {
//!             while !tx.push(v) {}
//!         }
//!     });
//!     s.spawn(move || {
//!         let mut expected = 0u64;
//!         while expected < 1000 {
//!             if let Some(v) = rx.pop() {
//!                 assert_eq!(v, expected);
//!                 expected += 1;
//!             }
//!         }
//!     });
//! });
//! ```

mod fifo;
mod flags;
mod heap_ring;
mod invariants;
pub mod math;
mod policy;
mod singleton;
mod spsc;
mod static_vec;

pub use fifo::{Fifo, Iter as FifoIter};
pub use flags::{Flag, FlagSet};
pub use heap_ring::{CapacityError, HeapConsumer, HeapProducer, HeapRing};
pub use math::{Quaternion, Vector};
pub use policy::{FailFast, FaultPolicy, Silent};
pub use singleton::Singleton;
pub use spsc::{Consumer, Producer, SpscRing};
pub use static_vec::StaticVec;
