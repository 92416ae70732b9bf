//! Error taxonomy for the JIT validation host.

use std::process::ExitStatus;
use thiserror::Error;

/// Failure to launch the prover process. Fatal to the caller: without a
/// child there is nothing to validate against.
#[derive(Debug, Error)]
pub enum JitSpawnError {
    /// The prover binary could not be started.
    #[error("failed to launch jit prover: {0}")]
    Spawn(#[source] std::io::Error),
    /// The child was started without a usable stdin pipe.
    #[error("jit prover stdin unavailable")]
    MissingStdin,
}

/// A fatal fault published on the supervisor channel when the prover
/// process stops running. The machine does not restart the child.
#[derive(Debug, Error)]
pub enum JitFault {
    /// The prover exited on its own with a failure status.
    #[error("lost jit prover process: {0}")]
    Exited(ExitStatus),
    /// Waiting on the prover process failed.
    #[error("lost jit prover process: {0}")]
    Wait(std::io::Error),
}

/// Failure of a single validation request. None of these are retried
/// internally; they all propagate to the caller.
#[derive(Debug, Error)]
pub enum JitProveError {
    /// The rendezvous socket failed or a read came up short — including
    /// the case where the child died mid-session.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The session outlived its deadline.
    #[error("jit validation deadline exceeded")]
    DeadlineExceeded,
    /// The caller cancelled the request scope.
    #[error("jit validation cancelled")]
    Cancelled,
    /// The child sent a frame this host does not understand.
    #[error("inter-process communication failure")]
    ProtocolViolation,
    /// The prover reported a failure; the message is carried verbatim.
    #[error("{0}")]
    Prover(String),
}
