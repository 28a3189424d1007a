//! Growth/decline projection.
//!
//! All arithmetic is integer-only and saturating; the caller guarantees a
//! nonzero divider and decline window via [`GrowthConfig`]'s validated
//! setters, so projection itself is total and never fails.

use mtree_core::config::GrowthConfig;
use mtree_core::constants::{MAX_LENGTH, SEGMENTS_MAX};
use mtree_core::types::{BlockHeight, TreeGenome};

/// Which side of the evolution curve a tree currently sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowthPhase {
    /// No decline window is active; length follows elapsed blocks.
    Growing,
    /// A decline window is active; length interpolates back toward the
    /// genome's base length as the horizon approaches.
    Declining {
        /// Blocks left until the window closes, capped at the window length.
        remaining: u64,
    },
}

/// Result of projecting a tree at a block height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projection {
    /// Trunk length to render, in `[genome.init_length, MAX_LENGTH]`.
    pub length: u32,
    pub phase: GrowthPhase,
}

/// Project a tree's rendered length.
///
/// Growth: `init_length + elapsed / growth_divider`, capped at
/// [`MAX_LENGTH`], where `elapsed` counts blocks since the tree's mint
/// offset. Decline (active while `minted <= current_block <= decline_until`
/// with a nonzero horizon) overrides growth: the grown length shrinks
/// linearly toward `init_length`, reaching it exactly at the horizon block.
/// The window is inclusive of its end block; one block later the tree
/// resumes its full grown height.
pub fn project(
    genome: &TreeGenome,
    minted_since: u32,
    init_block: BlockHeight,
    decline_until: BlockHeight,
    current_block: BlockHeight,
    config: &GrowthConfig,
) -> Projection {
    let minted_at = init_block + minted_since as u64;
    let elapsed = current_block.saturating_sub(minted_at);
    let growth = elapsed / config.growth_divider();
    let grown = genome
        .init_length
        .saturating_add(growth.min(u32::MAX as u64) as u32)
        .min(MAX_LENGTH);

    if decline_until > 0 && current_block <= decline_until {
        let window = config.growth_decline_blocks();
        let remaining = (decline_until - current_block).min(window);
        let span = (grown - genome.init_length) as u64;
        let length = genome.init_length + (span * remaining / window) as u32;
        Projection {
            length,
            phase: GrowthPhase::Declining { remaining },
        }
    } else {
        Projection {
            length: grown,
            phase: GrowthPhase::Growing,
        }
    }
}

/// Segment bucket after one ownership transfer (mint included).
///
/// The single mutation path for `segments`: +1 while growing, -1 while a
/// decline window is active, clamped to `[0, SEGMENTS_MAX]`.
pub fn next_segments(segments: u8, decline_active: bool) -> u8 {
    if decline_active {
        segments.saturating_sub(1)
    } else {
        (segments + 1).min(SEGMENTS_MAX)
    }
}
