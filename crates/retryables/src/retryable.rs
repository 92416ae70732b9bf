//! Handles to individual retryable records.

use crate::{
    BENEFICIARY_OFFSET, CALLDATA_KEY, CALLVALUE_OFFSET, FROM_OFFSET, NUM_TRIES_OFFSET,
    TIMEOUT_OFFSET, TO_OFFSET,
};
use alloy_primitives::{Address, B256, Bytes, U256, keccak256};
use argon_storage::Storage;

/// A read/write handle to one retryable's record.
///
/// Fields read through to storage on first access and are cached on the
/// handle afterwards. Handles returned by
/// [`crate::RetryableState::create_retryable`] come fully cached; handles
/// from [`crate::RetryableState::open_retryable`] start lazy. The handle is
/// only as valid as the registry it came from.
#[derive(Debug, Clone)]
pub struct Retryable {
    id: B256,
    backing: Storage,
    num_tries: Option<u64>,
    timeout: Option<u64>,
    from: Option<Address>,
    to: Option<Option<Address>>,
    callvalue: Option<U256>,
    beneficiary: Option<Address>,
    calldata: Option<Bytes>,
}

impl Retryable {
    /// A handle with every field pre-populated, for a record just written.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn cached(
        id: B256,
        backing: Storage,
        timeout: u64,
        from: Address,
        to: Option<Address>,
        callvalue: U256,
        beneficiary: Address,
        calldata: Bytes,
    ) -> Self {
        Self {
            id,
            backing,
            num_tries: Some(0),
            timeout: Some(timeout),
            from: Some(from),
            to: Some(to),
            callvalue: Some(callvalue),
            beneficiary: Some(beneficiary),
            calldata: Some(calldata),
        }
    }

    /// A handle that reads each field from storage on first access.
    pub(crate) const fn lazy(id: B256, backing: Storage) -> Self {
        Self {
            id,
            backing,
            num_tries: None,
            timeout: None,
            from: None,
            to: None,
            callvalue: None,
            beneficiary: None,
            calldata: None,
        }
    }

    /// The ticket id, which also keys the record's storage namespace.
    pub const fn id(&self) -> B256 {
        self.id
    }

    /// How many redemption attempts have run against this ticket.
    pub fn num_tries(&mut self) -> u64 {
        let backing = &self.backing;
        *self.num_tries.get_or_insert_with(|| backing.get_u64_by_u64(NUM_TRIES_OFFSET))
    }

    /// Overwrites the redemption counter.
    pub fn set_num_tries(&mut self, num_tries: u64) {
        self.num_tries = Some(num_tries);
        self.backing.set_u64_by_u64(NUM_TRIES_OFFSET, num_tries);
    }

    /// Bumps the redemption counter and returns the new value.
    pub fn increment_num_tries(&mut self) -> u64 {
        let num_tries = self.num_tries() + 1;
        self.set_num_tries(num_tries);
        num_tries
    }

    /// Expiry, in seconds since epoch. Never zero for a live record.
    pub fn timeout(&mut self) -> u64 {
        let backing = &self.backing;
        *self.timeout.get_or_insert_with(|| backing.get_u64_by_u64(TIMEOUT_OFFSET))
    }

    /// Overwrites the expiry.
    pub fn set_timeout(&mut self, timeout: u64) {
        self.timeout = Some(timeout);
        self.backing.set_u64_by_u64(TIMEOUT_OFFSET, timeout);
    }

    /// The submitter's address.
    pub fn from(&mut self) -> Address {
        let backing = &self.backing;
        *self.from.get_or_insert_with(|| Address::from_word(backing.get_by_u64(FROM_OFFSET)))
    }

    /// Destination address, or `None` for a contract creation.
    pub fn to(&mut self) -> Option<Address> {
        let backing = &self.backing;
        *self.to.get_or_insert_with(|| {
            let word = backing.get_by_u64(TO_OFFSET);
            (!word.is_zero()).then(|| Address::from_word(word))
        })
    }

    /// Value carried by a redemption.
    pub fn callvalue(&mut self) -> U256 {
        let backing = &self.backing;
        *self
            .callvalue
            .get_or_insert_with(|| U256::from_be_bytes(backing.get_by_u64(CALLVALUE_OFFSET).0))
    }

    /// Address refunded when the ticket is cancelled or expires.
    pub fn beneficiary(&mut self) -> Address {
        let backing = &self.backing;
        *self
            .beneficiary
            .get_or_insert_with(|| Address::from_word(backing.get_by_u64(BENEFICIARY_OFFSET)))
    }

    /// The redemption calldata.
    pub fn calldata(&mut self) -> Bytes {
        let backing = &self.backing;
        self.calldata
            .get_or_insert_with(|| backing.open_substorage(CALLDATA_KEY).get_bytes().into())
            .clone()
    }

    /// Calldata length, without loading the payload when uncached.
    pub fn calldata_size(&self) -> u64 {
        match &self.calldata {
            Some(calldata) => calldata.len() as u64,
            None => self.backing.open_substorage(CALLDATA_KEY).get_bytes_size(),
        }
    }

    /// Field-by-field comparison, reading through to storage where needed.
    pub fn fields_equal(&mut self, other: &mut Self) -> bool {
        self.id == other.id
            && self.timeout() == other.timeout()
            && self.from() == other.from()
            && self.to() == other.to()
            && self.callvalue() == other.callvalue()
            && self.beneficiary() == other.beneficiary()
            && self.calldata() == other.calldata()
    }
}

/// Derives the transaction id of the `try_sequence_num`-th redemption
/// attempt against `ticket_id`.
///
/// The interposed zero byte keeps these ids disjoint from the legacy
/// redemption id scheme. The sequence number is hashed little-endian.
pub fn tx_id_for_redeem_attempt(ticket_id: B256, try_sequence_num: u64) -> B256 {
    let mut preimage = [0u8; 41];
    preimage[..32].copy_from_slice(ticket_id.as_slice());
    preimage[33..].copy_from_slice(&try_sequence_num.to_le_bytes());
    keccak256(preimage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn redeem_attempt_id_hashes_the_domain_separated_preimage() {
        let mut preimage = Vec::new();
        preimage.extend_from_slice(&[0u8; 32]);
        preimage.push(0);
        preimage.extend_from_slice(&[1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(tx_id_for_redeem_attempt(B256::ZERO, 1), keccak256(&preimage));
    }

    #[test]
    fn redeem_attempt_ids_are_distinct_per_ticket_and_attempt() {
        let ticket =
            b256!("1111111111111111111111111111111111111111111111111111111111111111");
        assert_ne!(tx_id_for_redeem_attempt(ticket, 1), tx_id_for_redeem_attempt(ticket, 2));
        assert_ne!(
            tx_id_for_redeem_attempt(ticket, 1),
            tx_id_for_redeem_attempt(B256::ZERO, 1),
        );
        // the sequence number is little-endian, so these differ in the
        // first payload byte, not the last
        assert_ne!(
            tx_id_for_redeem_attempt(ticket, 1),
            tx_id_for_redeem_attempt(ticket, 1 << 56),
        );
    }
}
