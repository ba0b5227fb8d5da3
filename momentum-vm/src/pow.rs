//! Proof-of-work over an account block's data hash.

use momentum_primitives::{Hash, NONCE_SIZE};

fn target(difficulty: u64) -> u64 {
    u64::MAX / difficulty.max(1)
}

/// Checks `nonce` against `difficulty` for `data_hash`.
///
/// The first eight bytes of `sha3(data_hash ++ nonce)`, read big-endian,
/// must not exceed `u64::MAX / difficulty`. Difficulty zero accepts any nonce.
pub fn check_nonce(data_hash: &Hash, nonce: &[u8; NONCE_SIZE], difficulty: u64) -> bool {
    if difficulty == 0 {
        return true;
    }
    let digest = Hash::digest_parts(&[data_hash.as_slice(), nonce]);
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_slice()[..8]);
    u64::from_be_bytes(head) <= target(difficulty)
}

/// Searches nonces sequentially from zero until one satisfies `difficulty`.
pub fn generate_nonce(data_hash: &Hash, difficulty: u64) -> [u8; NONCE_SIZE] {
    let mut candidate: u64 = 0;
    loop {
        let nonce = candidate.to_be_bytes();
        if check_nonce(data_hash, &nonce, difficulty) {
            return nonce;
        }
        candidate = candidate.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_nonce_verifies() {
        let data_hash = Hash::digest(b"account ++ previous");
        let nonce = generate_nonce(&data_hash, 5_000);
        assert!(check_nonce(&data_hash, &nonce, 5_000));
    }

    #[test]
    fn test_trivial_difficulties() {
        let data_hash = Hash::digest(b"x");
        assert!(check_nonce(&data_hash, &[0u8; 8], 0));
        assert!(check_nonce(&data_hash, &[7u8; 8], 1));
    }

    #[test]
    fn test_search_returns_first_valid_nonce() {
        let data_hash = Hash::digest(b"a");
        let nonce = generate_nonce(&data_hash, 1_000);
        let found = u64::from_be_bytes(nonce);
        for candidate in 0..found {
            assert!(!check_nonce(&data_hash, &candidate.to_be_bytes(), 1_000));
        }
    }
}
