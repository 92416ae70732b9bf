//! The registry of retryable cross-domain tickets.
//!
//! A retryable is a persisted record of a ticketed transaction that can be
//! redeemed one or more times until its timeout passes. [`RetryableState`]
//! owns the registry: creation, lookup, keep-alive extension, deletion, and
//! best-effort reaping of a FIFO timeout queue laid over
//! [`argon_storage::Storage`] namespaces.
//!
//! Absence is encoded by the timeout sentinel: a live retryable never has a
//! zero timeout, so a zero timeout word means the slot is vacant. External
//! consumers read the same layout, which is why no separate existence bit
//! exists.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod retryable;
pub use retryable::{Retryable, tx_id_for_redeem_attempt};

mod state;
pub use state::{RETRYABLE_LIFETIME_SECONDS, RetryableState};

/// Fixed scalar slots within a retryable's namespace.
pub(crate) const NUM_TRIES_OFFSET: u64 = 0;
pub(crate) const TIMEOUT_OFFSET: u64 = 1;
pub(crate) const FROM_OFFSET: u64 = 2;
pub(crate) const TO_OFFSET: u64 = 3;
pub(crate) const CALLVALUE_OFFSET: u64 = 4;
pub(crate) const BENEFICIARY_OFFSET: u64 = 5;

/// Key of the timeout queue within the registry root.
pub(crate) const TIMEOUT_QUEUE_KEY: &[u8] = &[0];
/// Key of the calldata blob within a retryable's namespace.
pub(crate) const CALLDATA_KEY: &[u8] = &[1];
