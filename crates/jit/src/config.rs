//! Host-side configuration for the JIT prover child.

use argon_types::GlobalState;
use std::{collections::HashMap, path::PathBuf};

/// Configuration for spawning a [`crate::JitMachine`].
#[derive(Debug, Clone, Default)]
pub struct JitMachineConfig {
    /// Path of the JIT prover executable.
    pub jit_path: PathBuf,
    /// Path of the state-transition binary handed to the prover via
    /// `--binary`.
    pub binary_path: PathBuf,
    /// Use the cranelift fast backend.
    pub cranelift: bool,
    /// Inputs answered from this table without contacting the child, keyed
    /// by input id. Used to skip known-problematic requests against a
    /// specific chain history; empty for a fresh chain.
    pub ignored_inputs: HashMap<u64, GlobalState>,
}
