//! The registry and its operations.

use crate::{
    BENEFICIARY_OFFSET, CALLDATA_KEY, CALLVALUE_OFFSET, FROM_OFFSET, NUM_TRIES_OFFSET, Retryable,
    TIMEOUT_OFFSET, TIMEOUT_QUEUE_KEY, TO_OFFSET,
};
use alloy_primitives::{Address, B256, Bytes, U256};
use argon_storage::{Queue, Storage};
use tracing::trace;

/// One week, the canonical lifetime granted to a new retryable.
pub const RETRYABLE_LIFETIME_SECONDS: u64 = 7 * 24 * 60 * 60;

/// The persistent registry of retryable tickets.
///
/// Each ticket's record lives in the sub-namespace keyed by its id, with
/// the six fixed scalars at slots 0..=5 and the calldata blob nested under
/// key `0x01`. The timeout queue sits under key `0x00` of the registry
/// root. The registry assumes exclusive, transactionally-isolated access
/// to the underlying storage.
#[derive(Debug)]
pub struct RetryableState {
    retryables: Storage,
    timeout_queue: Queue,
}

impl RetryableState {
    /// Prepares `storage` for use as a registry root. Must run once before
    /// the first [`RetryableState::open`].
    pub fn initialize(storage: &Storage) {
        Queue::initialize(&storage.open_substorage(TIMEOUT_QUEUE_KEY));
    }

    /// Opens the registry rooted at `storage`.
    pub fn open(storage: Storage) -> Self {
        let timeout_queue = Queue::open(storage.open_substorage(TIMEOUT_QUEUE_KEY));
        Self { retryables: storage, timeout_queue }
    }

    /// Records a new retryable under `id` and schedules it for reaping.
    ///
    /// The caller guarantees that `id` has never been used before and that
    /// `timeout` is nonzero. One best-effort reap step runs first so that
    /// registry growth amortizes queue cleanup.
    #[allow(clippy::too_many_arguments)]
    pub fn create_retryable(
        &mut self,
        current_timestamp: u64,
        id: B256,
        timeout: u64,
        from: Address,
        to: Option<Address>,
        callvalue: U256,
        beneficiary: Address,
        calldata: Bytes,
    ) -> Retryable {
        self.try_to_reap_one_retryable(current_timestamp);

        let backing = self.retryables.open_substorage(id.as_slice());
        backing.set_by_u64(NUM_TRIES_OFFSET, B256::ZERO);
        backing.set_u64_by_u64(TIMEOUT_OFFSET, timeout);
        backing.set_by_u64(FROM_OFFSET, from.into_word());
        backing.set_by_u64(TO_OFFSET, to.map(|addr| addr.into_word()).unwrap_or_default());
        backing.set_by_u64(CALLVALUE_OFFSET, B256::from(callvalue));
        backing.set_by_u64(BENEFICIARY_OFFSET, beneficiary.into_word());
        backing.open_substorage(CALLDATA_KEY).write_bytes(&calldata);

        // every live ticket sits in the queue so the reaper eventually
        // visits it
        self.timeout_queue.put(id);

        Retryable::cached(id, backing, timeout, from, to, callvalue, beneficiary, calldata)
    }

    /// Opens the retryable under `id`, or `None` if the slot is vacant.
    ///
    /// Expiry is not checked here; a consumer that must reject expired
    /// tickets compares the timeout itself.
    pub fn open_retryable(&self, id: B256, _current_timestamp: u64) -> Option<Retryable> {
        let backing = self.retryables.open_substorage(id.as_slice());
        if backing.get_by_u64(TIMEOUT_OFFSET).is_zero() {
            // vacant: a live retryable never has a zero timeout
            return None;
        }
        Some(Retryable::lazy(id, backing))
    }

    /// Size in bytes attributed to `id`: the six scalar slots plus the
    /// calldata. Zero if the slot is vacant.
    pub fn retryable_size_bytes(&self, id: B256, current_timestamp: u64) -> u64 {
        self.open_retryable(id, current_timestamp)
            .map_or(0, |retryable| 6 * 32 + retryable.calldata_size())
    }

    /// Clears the record under `id`. Returns false if it was already
    /// vacant.
    ///
    /// The id stays in the timeout queue; the reaper drops it as stale.
    pub fn delete_retryable(&mut self, id: B256) -> bool {
        let backing = self.retryables.open_substorage(id.as_slice());
        if backing.get_by_u64(TIMEOUT_OFFSET).is_zero() {
            return false;
        }
        backing.set_by_u64(NUM_TRIES_OFFSET, B256::ZERO);
        backing.set_by_u64(TIMEOUT_OFFSET, B256::ZERO);
        backing.set_by_u64(FROM_OFFSET, B256::ZERO);
        backing.set_by_u64(TO_OFFSET, B256::ZERO);
        backing.set_by_u64(CALLVALUE_OFFSET, B256::ZERO);
        backing.set_by_u64(BENEFICIARY_OFFSET, B256::ZERO);
        backing.open_substorage(CALLDATA_KEY).delete_bytes();
        true
    }

    /// Extends `ticket_id`'s timeout by `time_to_add` if it is close enough
    /// to expiry. Returns false when the ticket is vacant or its timeout
    /// still exceeds `limit_before_add`.
    pub fn keepalive(
        &mut self,
        ticket_id: B256,
        current_timestamp: u64,
        limit_before_add: u64,
        time_to_add: u64,
    ) -> bool {
        let Some(mut retryable) = self.open_retryable(ticket_id, current_timestamp) else {
            return false;
        };
        let timeout = retryable.timeout();
        if timeout > limit_before_add {
            return false;
        }
        retryable.set_timeout(timeout + time_to_add);
        true
    }

    /// Visits one entry of the timeout queue.
    ///
    /// A live entry goes back to the tail; a stale one, whose record has
    /// since been cleared, is dropped. No expiry comparison happens here —
    /// deletion is driven by the registry's callers, and this pass only
    /// amortizes cleanup of entries that are already gone.
    pub fn try_to_reap_one_retryable(&mut self, current_timestamp: u64) {
        if let Some(id) = self.timeout_queue.get() {
            if self.open_retryable(id, current_timestamp).is_some() {
                self.timeout_queue.put(id);
            } else {
                trace!(target: "retryables", %id, "dropped stale timeout queue entry");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use argon_storage::MemoryBackend;
    use rstest::rstest;
    use std::sync::Arc;

    const TICKET: B256 = b256!("1111111111111111111111111111111111111111111111111111111111111111");
    const OTHER: B256 = b256!("2222222222222222222222222222222222222222222222222222222222222222");
    const FROM: Address = address!("00000000000000000000000000000000000000aa");
    const BENEFICIARY: Address = address!("00000000000000000000000000000000000000bb");

    fn fresh_state() -> (RetryableState, Storage) {
        let root = Storage::new(Arc::new(MemoryBackend::default()));
        RetryableState::initialize(&root);
        (RetryableState::open(root.clone()), root)
    }

    fn create_simple(state: &mut RetryableState, id: B256, timeout: u64) -> Retryable {
        state.create_retryable(
            0,
            id,
            timeout,
            FROM,
            None,
            U256::ZERO,
            BENEFICIARY,
            Bytes::new(),
        )
    }

    /// The live span of the timeout queue, head first.
    fn queue_contents(root: &Storage) -> Vec<B256> {
        let queue = root.open_substorage(&[0]);
        let head = queue.get_u64_by_u64(1);
        let tail = queue.get_u64_by_u64(0);
        (head..tail).map(|slot| queue.get_by_u64(slot)).collect()
    }

    #[test]
    fn create_then_open_round_trips_every_field() {
        let (mut state, _) = fresh_state();
        let mut created = create_simple(&mut state, TICKET, 1000);

        let mut opened = state.open_retryable(TICKET, 0).expect("present");
        assert!(created.fields_equal(&mut opened));
        assert_eq!(opened.id(), TICKET);
        assert_eq!(opened.num_tries(), 0);
        assert_eq!(opened.timeout(), 1000);
        assert_eq!(opened.from(), FROM);
        assert_eq!(opened.to(), None);
        assert_eq!(opened.callvalue(), U256::ZERO);
        assert_eq!(opened.beneficiary(), BENEFICIARY);
        assert!(opened.calldata().is_empty());
        assert_eq!(state.retryable_size_bytes(TICKET, 0), 192);
    }

    #[test]
    fn destination_and_callvalue_round_trip() {
        let (mut state, _) = fresh_state();
        let to = address!("00000000000000000000000000000000000000cc");
        let mut created = state.create_retryable(
            0,
            TICKET,
            1000,
            FROM,
            Some(to),
            U256::from(123_456_789u64),
            BENEFICIARY,
            Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
        );

        let mut opened = state.open_retryable(TICKET, 0).expect("present");
        assert!(created.fields_equal(&mut opened));
        assert_eq!(opened.to(), Some(to));
        assert_eq!(opened.callvalue(), U256::from(123_456_789u64));
    }

    #[test]
    fn calldata_counts_toward_size() {
        let (mut state, _) = fresh_state();
        state.create_retryable(
            0,
            TICKET,
            1000,
            FROM,
            None,
            U256::ZERO,
            BENEFICIARY,
            Bytes::from_static(&[0xaa, 0xbb, 0xcc]),
        );

        assert_eq!(state.retryable_size_bytes(TICKET, 0), 195);
        let mut opened = state.open_retryable(TICKET, 0).expect("present");
        assert_eq!(opened.calldata_size(), 3);
        assert_eq!(opened.calldata(), Bytes::from_static(&[0xaa, 0xbb, 0xcc]));
    }

    #[test]
    fn vacant_slots_report_absence_everywhere() {
        let (mut state, _) = fresh_state();
        assert!(state.open_retryable(TICKET, 0).is_none());
        assert_eq!(state.retryable_size_bytes(TICKET, 0), 0);
        assert!(!state.delete_retryable(TICKET));
        assert!(!state.keepalive(TICKET, 0, u64::MAX, 1));
    }

    #[test]
    fn delete_restores_the_absence_sentinel() {
        let (mut state, _) = fresh_state();
        create_simple(&mut state, TICKET, 1000);

        assert!(state.delete_retryable(TICKET));
        assert!(state.open_retryable(TICKET, 0).is_none());
        assert_eq!(state.retryable_size_bytes(TICKET, 0), 0);
        assert!(!state.delete_retryable(TICKET));
    }

    #[rstest]
    #[case::too_early(1000, false, 1000)]
    #[case::extends(800, true, 1100)]
    fn keepalive_extends_only_near_expiry(
        #[case] timeout: u64,
        #[case] extended: bool,
        #[case] expected: u64,
    ) {
        let (mut state, _) = fresh_state();
        create_simple(&mut state, TICKET, timeout);

        assert_eq!(state.keepalive(TICKET, 500, 900, 300), extended);
        let mut opened = state.open_retryable(TICKET, 500).expect("present");
        assert_eq!(opened.timeout(), expected);
    }

    #[test]
    fn num_tries_is_monotonic_and_durable() {
        let (mut state, _) = fresh_state();
        create_simple(&mut state, TICKET, 1000);

        let mut opened = state.open_retryable(TICKET, 0).expect("present");
        assert_eq!(opened.num_tries(), 0);
        assert_eq!(opened.increment_num_tries(), 1);
        assert_eq!(opened.increment_num_tries(), 2);

        let mut reopened = state.open_retryable(TICKET, 0).expect("present");
        assert_eq!(reopened.num_tries(), 2);
    }

    #[test]
    fn every_live_ticket_appears_in_the_queue() {
        let (mut state, root) = fresh_state();
        create_simple(&mut state, TICKET, 1000);
        create_simple(&mut state, OTHER, 2000);
        assert_eq!(queue_contents(&root), vec![TICKET, OTHER]);
    }

    #[test]
    fn reaper_requeues_live_entries_and_drops_stale_ones() {
        let (mut state, root) = fresh_state();
        create_simple(&mut state, TICKET, 1000);
        create_simple(&mut state, OTHER, 2000);

        state.delete_retryable(TICKET);
        assert_eq!(queue_contents(&root), vec![TICKET, OTHER]);

        // the stale head is dropped without touching the live entry
        state.try_to_reap_one_retryable(0);
        assert_eq!(queue_contents(&root), vec![OTHER]);

        // a live head makes a round trip back to the tail
        state.try_to_reap_one_retryable(0);
        assert_eq!(queue_contents(&root), vec![OTHER]);
        assert!(state.open_retryable(OTHER, 0).is_some());
    }

    #[test]
    fn reaper_does_not_expire_live_entries() {
        let (mut state, root) = fresh_state();
        create_simple(&mut state, TICKET, 5);

        // visited long past its timeout, the record survives untouched
        state.try_to_reap_one_retryable(1_000_000);
        assert_eq!(queue_contents(&root), vec![TICKET]);
        let mut opened = state.open_retryable(TICKET, 1_000_000).expect("present");
        assert_eq!(opened.timeout(), 5);
    }

    #[test]
    fn reaper_on_an_empty_queue_is_a_no_op() {
        let (mut state, root) = fresh_state();
        state.try_to_reap_one_retryable(0);
        assert!(queue_contents(&root).is_empty());
    }
}
