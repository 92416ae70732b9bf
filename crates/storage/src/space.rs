//! Keccak-nested storage namespaces.

use crate::{StateBackend, u64_to_word, word_to_u64};
use alloy_primitives::{B256, keccak256};
use std::sync::Arc;

/// A namespaced view into a [`StateBackend`].
///
/// Namespaces nest by hashing: the child opened with `id` is keyed by
/// `keccak256(parent_key || id)`, and a 32-byte slot key `k` maps to the
/// backing location `keccak256(namespace_key || k)`. Handles are cheap to
/// clone and share the backend.
///
/// Besides individual word slots, a namespace can hold one variable-length
/// byte blob: slot 0 carries the length, the payload fills slots 1.. in
/// 32-byte chunks, and a partial final chunk sits right-aligned in its word.
#[derive(Debug, Clone)]
pub struct Storage {
    backend: Arc<dyn StateBackend>,
    key: Vec<u8>,
}

impl Storage {
    /// Opens the root namespace of `backend`.
    pub fn new(backend: Arc<dyn StateBackend>) -> Self {
        Self { backend, key: Vec::new() }
    }

    /// Opens the child namespace rooted at `id`.
    pub fn open_substorage(&self, id: &[u8]) -> Self {
        Self {
            backend: self.backend.clone(),
            key: keccak256([self.key.as_slice(), id].concat()).to_vec(),
        }
    }

    fn location(&self, key: B256) -> B256 {
        keccak256([self.key.as_slice(), key.as_slice()].concat())
    }

    /// Reads the word stored under `key`.
    pub fn get(&self, key: B256) -> B256 {
        self.backend.get_word(self.location(key))
    }

    /// Writes `value` under `key`.
    pub fn set(&self, key: B256, value: B256) {
        self.backend.set_word(self.location(key), value);
    }

    /// Reads the word at the integer slot `offset`.
    pub fn get_by_u64(&self, offset: u64) -> B256 {
        self.get(u64_to_word(offset))
    }

    /// Writes `value` at the integer slot `offset`.
    pub fn set_by_u64(&self, offset: u64, value: B256) {
        self.set(u64_to_word(offset), value);
    }

    /// Reads the integer slot `offset` as a scalar.
    pub fn get_u64_by_u64(&self, offset: u64) -> u64 {
        word_to_u64(self.get_by_u64(offset))
    }

    /// Writes the scalar `value` at the integer slot `offset`.
    pub fn set_u64_by_u64(&self, offset: u64, value: u64) {
        self.set_by_u64(offset, u64_to_word(value));
    }

    /// Replaces this namespace's byte blob with `data`.
    pub fn write_bytes(&self, data: &[u8]) {
        self.set_u64_by_u64(0, data.len() as u64);
        let mut slot = 1;
        let mut rest = data;
        while rest.len() >= 32 {
            self.set_by_u64(slot, B256::from_slice(&rest[..32]));
            rest = &rest[32..];
            slot += 1;
        }
        let mut tail = B256::ZERO;
        tail[32 - rest.len()..].copy_from_slice(rest);
        self.set_by_u64(slot, tail);
    }

    /// Reads this namespace's byte blob.
    pub fn get_bytes(&self) -> Vec<u8> {
        let size = self.get_bytes_size();
        let mut out = Vec::with_capacity(size as usize);
        let mut left = size;
        let mut slot = 1;
        while left >= 32 {
            out.extend_from_slice(self.get_by_u64(slot).as_slice());
            left -= 32;
            slot += 1;
        }
        out.extend_from_slice(&self.get_by_u64(slot)[32 - left as usize..]);
        out
    }

    /// Returns the blob's length without loading the payload.
    pub fn get_bytes_size(&self) -> u64 {
        self.get_u64_by_u64(0)
    }

    /// Clears the blob, zeroing the length slot and every chunk slot.
    pub fn delete_bytes(&self) {
        let size = self.get_bytes_size();
        for slot in 0..=size.div_ceil(32) {
            self.set_by_u64(slot, B256::ZERO);
        }
    }
}
