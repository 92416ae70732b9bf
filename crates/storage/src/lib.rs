//! Storage namespaces for the argon state registries.
//!
//! The crate layers three abstractions over a flat, word-addressed backing
//! store:
//!
//! - [`StateBackend`]: the contract the persistence layer fulfills — read
//!   and write 32-byte words at 32-byte locations, totally and without
//!   failure. [`MemoryBackend`] is the in-memory implementation.
//! - [`Storage`]: a keccak-nested namespace over a backend. Child
//!   namespaces and slot locations are derived by hashing, so distinct
//!   namespaces can never collide.
//! - [`Queue`]: a FIFO of 32-byte words laid out inside a namespace.
//!
//! Transactional isolation is the caller's concern: the registry layers
//! above assume exclusive access to the backend for the duration of a
//! logical transaction.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod backend;
pub use backend::{MemoryBackend, StateBackend};

mod queue;
pub use queue::Queue;

mod space;
pub use space::Storage;

mod word;
pub use word::{u64_to_word, word_to_u64};
