//! Conversions between u64 scalars and right-aligned storage words.

use alloy_primitives::B256;

/// Encodes `value` as a 32-byte word, big-endian and right-aligned.
pub fn u64_to_word(value: u64) -> B256 {
    let mut word = B256::ZERO;
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Decodes the low eight bytes of `word`, discarding anything above them.
pub fn word_to_u64(word: B256) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&word[24..]);
    u64::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn words_are_big_endian_right_aligned() {
        assert_eq!(
            u64_to_word(0x0102030405060708),
            b256!("0000000000000000000000000000000000000000000000000102030405060708"),
        );
        assert_eq!(u64_to_word(0), B256::ZERO);
    }

    #[test]
    fn round_trips() {
        for value in [0, 1, u64::MAX, 0xdead_beef] {
            assert_eq!(word_to_u64(u64_to_word(value)), value);
        }
    }

    #[test]
    fn high_bytes_are_discarded() {
        let word = b256!("ffffffffffffffffffffffffffffffffffffffffffffffff0000000000000007");
        assert_eq!(word_to_u64(word), 7);
    }
}
