//! Core data model shared across the argon validation components.
//!
//! This crate defines the fundamental data structures exchanged between the
//! validation host and the JIT prover: the [`GlobalState`] execution cursor
//! and the [`ValidationInput`] request record.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod global_state;
pub use global_state::GlobalState;

mod input;
pub use input::{BatchInfo, PreimageKind, UnknownPreimageKind, ValidationInput};
