//! Host-side supervision of the JIT prover.
//!
//! A [`JitMachine`] owns one long-lived prover child process. Per
//! validation request it opens a fresh loopback TCP rendezvous, hands the
//! address to the child over stdin, and speaks a framed, ordered binary
//! protocol over the single connection the child opens back: the
//! [`argon_types::ValidationInput`] goes out, a proven
//! [`argon_types::GlobalState`] comes back.
//!
//! The fresh-listener-per-request pattern isolates sessions from each
//! other — a hung request cannot wedge the next one — and the
//! newline-terminated stdin channel keeps the control path framing-free.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::JitMachineConfig;

mod error;
pub use error::{JitFault, JitProveError, JitSpawnError};

mod machine;
pub use machine::JitMachine;

mod wire;
