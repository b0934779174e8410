use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::game::Weight;

const WEIGHT_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Zobrist keys for one grid.
///
/// A state hash is the XOR of the agent key and one key per stone, so it does
/// not depend on the order stones are visited in.
#[derive(Debug, Clone)]
pub struct Zobrist {
    stone_keys: Vec<u64>,
    agent_keys: Vec<u64>,
}

impl Zobrist {
    pub fn new(cells: usize) -> Self {
        // Fixed seed so hashes agree across runs
        let mut rng = ChaCha8Rng::seed_from_u64(0x123456789abcdef0);

        let stone_keys = (0..cells).map(|_| rng.next_u64()).collect();
        let agent_keys = (0..cells).map(|_| rng.next_u64()).collect();

        Zobrist {
            stone_keys,
            agent_keys,
        }
    }

    /// Hash of a stone of the given weight on cell `index`.
    pub fn stone_hash(&self, index: usize, weight: Weight) -> u64 {
        mix(self.stone_keys[index] ^ (weight as u64).wrapping_mul(WEIGHT_MIX))
    }

    /// Hash of the agent on cell `index`.
    pub fn agent_hash(&self, index: usize) -> u64 {
        self.agent_keys[index]
    }
}

// splitmix64 finalizer
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_reproducible() {
        let a = Zobrist::new(16);
        let b = Zobrist::new(16);
        for i in 0..16 {
            assert_eq!(a.agent_hash(i), b.agent_hash(i));
            assert_eq!(a.stone_hash(i, 3), b.stone_hash(i, 3));
        }
    }

    #[test]
    fn test_weight_changes_stone_hash() {
        let z = Zobrist::new(4);
        assert_ne!(z.stone_hash(0, 1), z.stone_hash(0, 2));
        // Swapping weights between two cells must not give the same combined hash.
        assert_ne!(
            z.stone_hash(0, 1) ^ z.stone_hash(1, 100),
            z.stone_hash(0, 100) ^ z.stone_hash(1, 1)
        );
    }
}
