//! Backing-store contract for storage namespaces.

use alloy_primitives::B256;
use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Mutex, PoisonError},
};

/// A flat word-addressed store underneath [`crate::Storage`] namespaces.
///
/// Implementations are total: reads of untouched locations return the zero
/// word and writes always succeed.
pub trait StateBackend: Debug + Send + Sync {
    /// Reads the word at `location`.
    fn get_word(&self, location: B256) -> B256;

    /// Writes `value` at `location`.
    fn set_word(&self, location: B256, value: B256);
}

/// An in-memory [`StateBackend`] over a hash map.
///
/// Zero writes drop the entry, so a fully cleared region leaves nothing
/// behind — the same economy the production state trie applies to zero
/// values.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    words: Mutex<HashMap<B256, B256>>,
}

impl MemoryBackend {
    /// The number of nonzero words currently held.
    pub fn len(&self) -> usize {
        self.words.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the store holds no nonzero words.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateBackend for MemoryBackend {
    fn get_word(&self, location: B256) -> B256 {
        self.words
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&location)
            .copied()
            .unwrap_or_default()
    }

    fn set_word(&self, location: B256, value: B256) {
        let mut words = self.words.lock().unwrap_or_else(PoisonError::into_inner);
        if value.is_zero() {
            words.remove(&location);
        } else {
            words.insert(location, value);
        }
    }
}
