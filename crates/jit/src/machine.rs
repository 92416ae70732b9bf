//! Supervisor for the long-lived JIT prover process.

use crate::{JitFault, JitMachineConfig, JitProveError, JitSpawnError, wire};
use argon_types::{GlobalState, ValidationInput};
use std::{collections::HashMap, net::Ipv4Addr, process::Stdio, time::Duration};
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    net::TcpListener,
    process::Command,
    select,
    sync::{Mutex, mpsc},
    time::{Instant, timeout_at},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Upper bound on a single validation session, applied as one absolute
/// deadline across every suspension point.
const EXECUTION_DEADLINE: Duration = Duration::from_secs(6000 * 60);

/// The session writer into the child: its stdin pipe in production, an
/// in-memory stream under test.
type SessionWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A supervised JIT prover child and the single-writer command channel
/// into it.
///
/// One validation request occupies the machine at a time: the child reads
/// newline-terminated rendezvous addresses off its stdin, so the stdin
/// write and the accept that follows must never interleave across
/// requests. The async mutex over the session writer is that exclusive
/// capability; spin up one machine per worker to validate in parallel.
pub struct JitMachine {
    stdin: Mutex<SessionWriter>,
    ignored: HashMap<u64, GlobalState>,
}

impl std::fmt::Debug for JitMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JitMachine").field("ignored", &self.ignored.len()).finish_non_exhaustive()
    }
}

impl JitMachine {
    /// Launches the prover configured by `config`.
    ///
    /// The child inherits this process's stdout and stderr. If it ever
    /// stops running abnormally, a [`JitFault`] is published on `fault_tx`;
    /// the machine does not restart it.
    pub fn spawn(
        config: &JitMachineConfig,
        fault_tx: mpsc::UnboundedSender<JitFault>,
    ) -> Result<Self, JitSpawnError> {
        let mut command = Command::new(&config.jit_path);
        command.arg("--binary").arg(&config.binary_path).arg("--forks");
        if config.cranelift {
            command.arg("--cranelift");
        }
        command.stdin(Stdio::piped()).stdout(Stdio::inherit()).stderr(Stdio::inherit());

        let mut child = command.spawn().map_err(JitSpawnError::Spawn)?;
        let stdin = child.stdin.take().ok_or(JitSpawnError::MissingStdin)?;

        tokio::spawn(async move {
            match child.wait().await {
                // a clean exit is the answer to the newline shutdown signal
                Ok(status) if status.success() => {}
                Ok(status) => {
                    let _ = fault_tx.send(JitFault::Exited(status));
                }
                Err(err) => {
                    let _ = fault_tx.send(JitFault::Wait(err));
                }
            }
        });

        Ok(Self { stdin: Mutex::new(Box::new(stdin)), ignored: config.ignored_inputs.clone() })
    }

    /// Asks the child to exit by writing the newline shutdown signal to
    /// its stdin. Write errors are logged, not propagated.
    pub async fn close(&self) {
        let mut stdin = self.stdin.lock().await;
        if let Err(err) = stdin.write_all(b"\n").await {
            error!(target: "jit", %err, "error closing jit machine");
        }
    }

    /// Runs one validation request against the child and returns the
    /// proven post-state.
    ///
    /// A fresh loopback listener is bound per request, its address handed
    /// to the child over stdin, and the framed protocol spoken over the
    /// one connection the child opens back. Cancelling `cancel` tears down
    /// the listener and connection and fails the call; the child keeps
    /// running.
    pub async fn prove(
        &self,
        input: &ValidationInput,
        cancel: CancellationToken,
    ) -> Result<GlobalState, JitProveError> {
        if let Some(state) = self.ignored.get(&input.id) {
            debug!(target: "jit", id = input.id, "ignoring validation input");
            return Ok(*state);
        }

        let mut stdin = self.stdin.lock().await;
        let deadline = Instant::now() + EXECUTION_DEADLINE;

        select! {
            biased;

            _ = cancel.cancelled() => {
                warn!(target: "jit", id = input.id, "validation request cancelled");
                Err(JitProveError::Cancelled)
            }
            session = timeout_at(deadline, run_session(&mut stdin, input)) => {
                session.map_err(|_| JitProveError::DeadlineExceeded)?
            }
        }
    }
}

/// One rendezvous session: bind, hand off, accept, send, receive.
///
/// Dropping this future — on cancellation or deadline — closes both the
/// listener and the connection, so a torn-down session can never accept or
/// read again.
async fn run_session(
    stdin: &mut SessionWriter,
    input: &ValidationInput,
) -> Result<GlobalState, JitProveError> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let address = listener.local_addr()?;

    // tell the child about the new rendezvous port
    stdin.write_all(format!("{address}\n").as_bytes()).await?;
    stdin.flush().await?;

    let (mut conn, _) = listener.accept().await?;
    wire::send_request(&mut conn, input).await?;
    wire::read_response(&mut conn).await
}
