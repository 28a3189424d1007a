//! Protocol constants. All prices in wei (1 ether = 10^18 wei).

use crate::types::Wei;

pub const WEI_PER_ETHER: Wei = 1_000_000_000_000_000_000;

/// Rendered trunk length never exceeds this, no matter how long a tree grows.
pub const MAX_LENGTH: u32 = 227;

/// Growth-stage bucket range. Transfers nudge `segments` by ±1 within
/// `[0, SEGMENTS_MAX]`; the seeder starts every tree at `INITIAL_SEGMENTS`
/// so the mint-time transfer hook lands a fresh tree at 2.
pub const SEGMENTS_MAX: u8 = 6;
pub const INITIAL_SEGMENTS: u8 = 1;

/// Cumulative ownership transfers required before a tree is mature and
/// eligible for stag-hunt consumption.
pub const MATURITY_TRANSFERS: u32 = 5;

/// Minimum cooperation ratio (basis points) for a stag hunt to succeed.
pub const COOPERATION_THRESHOLD_BPS: u64 = 5_000;
pub const BPS_PRECISION: u64 = 10_000;

/// Supply at which minting permanently closes and the hunt phase opens.
/// The founders hold the first `FOUNDERS_PREMINE` tokens.
pub const BEFORE_HUNT_SUPPLY: u64 = 103;
pub const FOUNDERS_PREMINE: u64 = 3;

/// Per-address mint cap during the open phase (constructor-overridable).
pub const DEFAULT_BEFORE_HUNT_LIMIT_PER_ADDRESS: u64 = 3;

pub const OPEN_MINT_PRICE: Wei = 72_330_000_000_000_000; // 0.07233 ether

/// Hare-hunt price ladder: `HARE_BASE_PRICE + n * HARE_PRICE_STEP` where `n`
/// is the number of hare hunts performed so far collection-wide.
pub const HARE_BASE_PRICE: Wei = 50_000_000_000_000_000; // 0.05 ether
pub const HARE_PRICE_STEP: Wei = 60_000_000_000_000_000; // 0.06 ether

/// Blocks of elapsed growth per unit of rendered length.
pub const DEFAULT_GROWTH_DIVIDER: u64 = 200;

/// Decline-window length in blocks; each hare hunt extends the shared
/// `decline_until` horizon by exactly this much.
pub const DEFAULT_GROWTH_DECLINE_BLOCKS: u64 = 211_810;

/// Consecutive token ids sharing one palette bit and one color picker.
pub const COLOR_BUCKET: u64 = 12;

// Genome field bounds (inclusive). The angle is drawn from discrete buckets.
pub const INIT_LENGTH_MIN: u32 = 10;
pub const INIT_LENGTH_MAX: u32 = 40;
pub const DIAMETER_MIN: u32 = 5;
pub const DIAMETER_MAX: u32 = 40;
pub const BRANCHES_MIN: u8 = 2;
pub const BRANCHES_MAX: u8 = 4;
pub const ANGLE_BUCKETS: &[u16] = &[20, 30, 45, 60, 90];
pub const D_MIN: u8 = 1;
pub const D_MAX: u8 = 11;
pub const DELTA_MAX: u8 = 3;

/// Clones normalize display-affecting fields back to the base bucket.
pub const CLONE_ANGLE: u16 = 30;
pub const CLONE_BRANCHES: u8 = 2;

pub const DEFAULT_CONTRACT_URI_HASH: &str =
    "bafkreie6rjitehhq73ycddh7q4bojntobi3xev4eloi4rqfnlhwuyj3tqe";
