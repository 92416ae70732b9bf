//! A FIFO queue of 32-byte words laid out in a storage namespace.

use crate::Storage;
use alloy_primitives::B256;

const NEXT_PUT_OFFSET: u64 = 0;
const NEXT_GET_OFFSET: u64 = 1;
/// Elements start after the two queue pointers.
const FIRST_ELEMENT_OFFSET: u64 = 2;

/// A FIFO of 32-byte words.
///
/// The head and tail pointers live at slots 0 and 1 of the namespace and
/// elements occupy the slots after them. Vacated slots are cleared on the
/// way out, so a fully drained queue leaves only its pointers behind.
///
/// [`Queue::initialize`] must have run on the namespace before the first
/// [`Queue::open`].
#[derive(Debug, Clone)]
pub struct Queue {
    storage: Storage,
}

impl Queue {
    /// Prepares `storage` to hold an empty queue.
    pub fn initialize(storage: &Storage) {
        storage.set_u64_by_u64(NEXT_PUT_OFFSET, FIRST_ELEMENT_OFFSET);
        storage.set_u64_by_u64(NEXT_GET_OFFSET, FIRST_ELEMENT_OFFSET);
    }

    /// Opens the queue laid out in `storage`.
    pub const fn open(storage: Storage) -> Self {
        Self { storage }
    }

    /// Whether the queue holds no elements.
    pub fn is_empty(&self) -> bool {
        self.storage.get_u64_by_u64(NEXT_PUT_OFFSET) == self.storage.get_u64_by_u64(NEXT_GET_OFFSET)
    }

    /// Appends `value` at the tail.
    pub fn put(&self, value: B256) {
        let slot = self.storage.get_u64_by_u64(NEXT_PUT_OFFSET);
        self.storage.set_by_u64(slot, value);
        self.storage.set_u64_by_u64(NEXT_PUT_OFFSET, slot + 1);
    }

    /// Pops the head, clearing the slot it occupied.
    pub fn get(&self) -> Option<B256> {
        if self.is_empty() {
            return None;
        }
        let slot = self.storage.get_u64_by_u64(NEXT_GET_OFFSET);
        let value = self.storage.get_by_u64(slot);
        self.storage.set_by_u64(slot, B256::ZERO);
        self.storage.set_u64_by_u64(NEXT_GET_OFFSET, slot + 1);
        Some(value)
    }
}
