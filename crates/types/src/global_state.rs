//! The consensus-relevant execution cursor reported by the prover.

use alloy_primitives::{B256, U256, keccak256};
use serde::{Deserialize, Serialize};

/// A point in the rollup's execution.
///
/// The tuple identifies which batch the machine is consuming, how far into
/// it the machine has advanced, and the chain commitments produced up to
/// that point.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("batch {batch} pos {pos_in_batch} block {block_hash} sendRoot {send_root}")]
pub struct GlobalState {
    /// Index of the batch being consumed.
    pub batch: u64,
    /// Message offset within the batch.
    pub pos_in_batch: u64,
    /// Hash of the most recent block.
    pub block_hash: B256,
    /// Root of the outgoing message tree.
    pub send_root: B256,
}

impl GlobalState {
    /// The commitment over the full tuple, as posted on chain.
    pub fn hash(&self) -> B256 {
        keccak256(
            [
                "Global state:".as_bytes(),
                &U256::from(self.batch).to_be_bytes::<32>()[..],
                &U256::from(self.pos_in_batch).to_be_bytes::<32>()[..],
                self.block_hash.as_slice(),
                self.send_root.as_slice(),
            ]
            .concat(),
        )
    }
}
