//! Owner-tunable growth configuration.
//!
//! Modeled as an explicit versioned record passed into the pure projection
//! functions rather than ambient globals. Zero divisors are rejected here,
//! at mutation time, so projection never has to handle them.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GROWTH_DECLINE_BLOCKS, DEFAULT_GROWTH_DIVIDER};
use crate::error::ConfigError;

/// Tunables shared by every tree in a collection.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthConfig {
    /// Blocks of elapsed time per unit of rendered length. Never zero.
    growth_divider: u64,
    /// Decline-window length in blocks; also the per-hare extension of the
    /// shared decline horizon. Never zero.
    growth_decline_blocks: u64,
    /// Bumped on every successful mutation.
    version: u32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            growth_divider: DEFAULT_GROWTH_DIVIDER,
            growth_decline_blocks: DEFAULT_GROWTH_DECLINE_BLOCKS,
            version: 0,
        }
    }
}

impl GrowthConfig {
    pub fn growth_divider(&self) -> u64 {
        self.growth_divider
    }

    pub fn growth_decline_blocks(&self) -> u64 {
        self.growth_decline_blocks
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn set_growth_divider(&mut self, divider: u64) -> Result<(), ConfigError> {
        if divider == 0 {
            return Err(ConfigError::ZeroGrowthDivider);
        }
        self.growth_divider = divider;
        self.version += 1;
        Ok(())
    }

    pub fn set_growth_decline_blocks(&mut self, blocks: u64) -> Result<(), ConfigError> {
        if blocks == 0 {
            return Err(ConfigError::ZeroDeclineBlocks);
        }
        self.growth_decline_blocks = blocks;
        self.version += 1;
        Ok(())
    }
}
