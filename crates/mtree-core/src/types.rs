//! Core engine types: addresses, genomes, per-token evolution state.
//!
//! All prices are in wei (u128). Block heights and token ids use u64 per
//! engine convention.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type TokenId = u64;
pub type BlockHeight = u64;
pub type Wei = u128;

/// A 20-byte account address.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address. Mints are recorded as transfers from it.
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Immutable structural genome of a tree, fixed at seeding time.
///
/// Field bounds are enforced by the seeder, not by this struct:
/// `init_length` 10–40, `diameter` 5–40, `branches` 2–4, `angle` one of the
/// discrete buckets in [`crate::constants::ANGLE_BUCKETS`], `d` 1–11
/// (branch-length decay), `delta` 0–3 (angle jitter amplitude).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeGenome {
    /// Trunk length at mint, before any growth.
    pub init_length: u32,
    /// Trunk diameter; tapers linearly with recursion depth when rendered.
    pub diameter: u32,
    /// Children per branching node.
    pub branches: u8,
    /// Base branching angle in degrees.
    pub angle: u16,
    /// Branch-length decay factor selector.
    pub d: u8,
    /// Angle jitter amplitude selector.
    pub delta: u8,
}

/// Mutable evolution state of a tree.
///
/// Created at mint/clone, advanced by the transfer hook and the hunt
/// mechanics, destroyed on burn. The cumulative transfer count lives in the
/// collection's books, not here — it is ledger bookkeeping, not tree state.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeState {
    /// Growth-stage bucket, 0–6. Recursion depth of the rendered crown.
    pub segments: u8,
    /// True while this tree was hare-hunted and its decline window is open.
    pub animated: bool,
    /// Stag hunts this tree was consumed by while mature.
    pub stags: u16,
    /// Hare hunts performed on this tree.
    pub hares: u16,
    /// Block offset from collection init at mint/clone time.
    pub minted_since: u32,
}

impl TreeState {
    /// State of a freshly seeded tree, before the mint transfer hook runs.
    pub fn fresh(minted_since: u32) -> Self {
        Self {
            segments: crate::constants::INITIAL_SEGMENTS,
            animated: false,
            stags: 0,
            hares: 0,
            minted_since,
        }
    }
}

/// A composable-marker reference: an externally owned token whose glyph
/// replaces the default branch-tip circle while ownership lines up.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker {
    pub contract: Address,
    pub token_id: TokenId,
}
