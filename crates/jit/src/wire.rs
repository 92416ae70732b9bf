//! The framed request/response protocol spoken over the loopback
//! rendezvous.
//!
//! Integers travel as eight big-endian bytes; a byte string travels as its
//! length followed by its raw bytes. Unknown-length lists are streamed with
//! the another/end sentinel pair so the child can parse without a declared
//! count.

use crate::JitProveError;
use alloy_primitives::B256;
use argon_types::{GlobalState, ValidationInput};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

/// Terminal success frame; doubles as the end-of-section sentinel.
pub(crate) const SUCCESS_BYTE: u8 = 0x0;
/// Terminal failure frame.
pub(crate) const FAILURE_BYTE: u8 = 0x1;
/// Another list item follows.
pub(crate) const ANOTHER_BYTE: u8 = 0x3;
/// End of inputs; the child may start executing.
pub(crate) const READY_BYTE: u8 = 0x4;

/// Streams `input` to the child.
///
/// Order on the wire: start state, batch list, delayed message, preimages,
/// ready byte. The child consumes the stream strictly in this order.
pub(crate) async fn send_request<W>(
    conn: &mut W,
    input: &ValidationInput,
) -> Result<(), JitProveError>
where
    W: AsyncWrite + Unpin,
{
    conn.write_u64(input.start_state.batch).await?;
    conn.write_u64(input.start_state.pos_in_batch).await?;
    conn.write_all(input.start_state.block_hash.as_slice()).await?;
    conn.write_all(input.start_state.send_root.as_slice()).await?;

    for batch in &input.batch_info {
        conn.write_u8(ANOTHER_BYTE).await?;
        conn.write_u64(batch.number).await?;
        write_bytes(conn, &batch.data).await?;
    }
    conn.write_u8(SUCCESS_BYTE).await?;

    if input.has_delayed_msg {
        conn.write_u8(ANOTHER_BYTE).await?;
        conn.write_u64(input.delayed_msg_nr).await?;
        write_bytes(conn, &input.delayed_msg).await?;
    }
    conn.write_u8(SUCCESS_BYTE).await?;

    conn.write_u64(input.preimages.len() as u64).await?;
    for (kind, preimages) in &input.preimages {
        conn.write_u8(u8::from(*kind)).await?;
        conn.write_u64(preimages.len() as u64).await?;
        for (hash, preimage) in preimages {
            conn.write_all(hash.as_slice()).await?;
            write_bytes(conn, preimage).await?;
        }
    }

    conn.write_u8(READY_BYTE).await?;
    conn.flush().await?;
    Ok(())
}

async fn write_bytes<W>(conn: &mut W, data: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    conn.write_u64(data.len() as u64).await?;
    conn.write_all(data).await
}

/// Reads the child's single framed response.
pub(crate) async fn read_response<R>(conn: &mut R) -> Result<GlobalState, JitProveError>
where
    R: AsyncRead + Unpin,
{
    match conn.read_u8().await? {
        SUCCESS_BYTE => {
            let batch = conn.read_u64().await?;
            let pos_in_batch = conn.read_u64().await?;
            let block_hash = read_hash(conn).await?;
            let send_root = read_hash(conn).await?;
            Ok(GlobalState { batch, pos_in_batch, block_hash, send_root })
        }
        FAILURE_BYTE => {
            let len = conn.read_u64().await?;
            let mut message = vec![0; len as usize];
            conn.read_exact(&mut message).await?;
            let message = String::from_utf8_lossy(&message).into_owned();
            error!(target: "jit", %message, "jit prover reported failure");
            Err(JitProveError::Prover(message))
        }
        _ => {
            error!(target: "jit", "unrecognized response frame from jit prover");
            Err(JitProveError::ProtocolViolation)
        }
    }
}

async fn read_hash<R>(conn: &mut R) -> std::io::Result<B256>
where
    R: AsyncRead + Unpin,
{
    let mut hash = B256::ZERO;
    conn.read_exact(hash.as_mut_slice()).await?;
    Ok(hash)
}
