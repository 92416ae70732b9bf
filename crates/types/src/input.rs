//! Inputs streamed to the prover for a single validation request.

use crate::GlobalState;
use alloy_primitives::{B256, Bytes};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// A sequencer batch the prover may read while replaying messages.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInfo {
    /// The batch's sequence number.
    pub number: u64,
    /// The raw batch payload.
    pub data: Bytes,
}

/// The hash family a recorded preimage belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PreimageKind {
    /// Keccak-256 preimages.
    Keccak256 = 0,
    /// SHA2-256 preimages.
    Sha256 = 1,
    /// EIP-4844 versioned-hash preimages.
    EthVersionedHash = 2,
}

/// The byte did not name a known preimage kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown preimage kind: {0}")]
pub struct UnknownPreimageKind(pub u8);

impl From<PreimageKind> for u8 {
    fn from(kind: PreimageKind) -> Self {
        kind as Self
    }
}

impl TryFrom<u8> for PreimageKind {
    type Error = UnknownPreimageKind;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Self::Keccak256),
            1 => Ok(Self::Sha256),
            2 => Ok(Self::EthVersionedHash),
            other => Err(UnknownPreimageKind(other)),
        }
    }
}

/// Everything the prover needs to replay one span of messages.
///
/// Built once per validation request and immutable afterwards. The
/// `delayed_msg_nr` and `delayed_msg` fields carry meaning only when
/// `has_delayed_msg` is set.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationInput {
    /// Request identifier, unique per validation.
    pub id: u64,
    /// Whether a delayed inbox message accompanies the batches.
    pub has_delayed_msg: bool,
    /// Sequence number of the delayed message.
    pub delayed_msg_nr: u64,
    /// The delayed message payload.
    pub delayed_msg: Bytes,
    /// The state the machine starts from.
    pub start_state: GlobalState,
    /// Sequencer batches, in order.
    pub batch_info: Vec<BatchInfo>,
    /// Recorded preimages, grouped by hash family. Within a family, hashes
    /// are unique; iteration order carries no meaning.
    pub preimages: HashMap<PreimageKind, HashMap<B256, Bytes>>,
}
