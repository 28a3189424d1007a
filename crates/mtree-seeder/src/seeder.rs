//! Genome seeder implementing the [`TreeSeeder`] trait.
//!
//! Every field is derived from an independent SHA-256 digest of
//! `(token_id, entropy, field_tag)`. The per-field tag constants keep fields
//! uncorrelated; folding the token id into every digest rules out collisions
//! across token ids sharing an entropy source.

use sha2::{Digest, Sha256};

use mtree_core::constants::{
    ANGLE_BUCKETS, BRANCHES_MAX, BRANCHES_MIN, CLONE_ANGLE, CLONE_BRANCHES, DELTA_MAX,
    DIAMETER_MAX, DIAMETER_MIN, D_MAX, D_MIN, INIT_LENGTH_MAX, INIT_LENGTH_MIN,
};
use mtree_core::traits::TreeSeeder;
use mtree_core::types::{TokenId, TreeGenome};

// Field tags. Changing any of these reshuffles every minted genome, so they
// are part of the engine's consensus surface.
const TAG_INIT_LENGTH: u8 = 0x01;
const TAG_DIAMETER: u8 = 0x02;
const TAG_BRANCHES: u8 = 0x03;
const TAG_ANGLE: u8 = 0x04;
const TAG_D: u8 = 0x05;
const TAG_DELTA: u8 = 0x06;

/// The production genome seeder.
#[derive(Debug, Clone, Default)]
pub struct GenomeSeeder;

impl GenomeSeeder {
    pub fn new() -> Self {
        Self
    }
}

/// One field roll: first 8 digest bytes of `sha256(token_id ‖ entropy ‖ tag)`
/// as a little-endian u64.
fn roll(token_id: TokenId, entropy: u64, tag: u8) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(token_id.to_le_bytes());
    hasher.update(entropy.to_le_bytes());
    hasher.update([tag]);
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Map a roll into the inclusive range `[min, max]`.
fn bounded(value: u64, min: u64, max: u64) -> u64 {
    min + value % (max - min + 1)
}

impl TreeSeeder for GenomeSeeder {
    fn generate(&self, token_id: TokenId, entropy: u64) -> TreeGenome {
        let angle_idx = roll(token_id, entropy, TAG_ANGLE) as usize % ANGLE_BUCKETS.len();
        TreeGenome {
            init_length: bounded(
                roll(token_id, entropy, TAG_INIT_LENGTH),
                INIT_LENGTH_MIN as u64,
                INIT_LENGTH_MAX as u64,
            ) as u32,
            diameter: bounded(
                roll(token_id, entropy, TAG_DIAMETER),
                DIAMETER_MIN as u64,
                DIAMETER_MAX as u64,
            ) as u32,
            branches: bounded(
                roll(token_id, entropy, TAG_BRANCHES),
                BRANCHES_MIN as u64,
                BRANCHES_MAX as u64,
            ) as u8,
            angle: ANGLE_BUCKETS[angle_idx],
            d: bounded(roll(token_id, entropy, TAG_D), D_MIN as u64, D_MAX as u64) as u8,
            delta: bounded(roll(token_id, entropy, TAG_DELTA), 0, DELTA_MAX as u64) as u8,
        }
    }

    fn clone_genome(&self, source: &TreeGenome) -> TreeGenome {
        TreeGenome {
            init_length: source.init_length,
            diameter: source.diameter,
            branches: CLONE_BRANCHES,
            angle: CLONE_ANGLE,
            d: source.d,
            delta: source.delta,
        }
    }
}
