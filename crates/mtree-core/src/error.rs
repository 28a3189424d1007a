//! Error types for the Merge Trees engine.
use thiserror::Error;

use crate::types::{TokenId, Wei};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("growth divider must be nonzero")] ZeroGrowthDivider,
    #[error("growth decline blocks must be nonzero")] ZeroDeclineBlocks,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("nonexistent token: {0}")] Nonexistent(TokenId),
    #[error("caller is not the NFT owner")] NotNftOwner,
    #[error("caller is not the contract owner")] NotContractOwner,
    #[error("caller is not the founders")] NotFounders,
    #[error("caller is not the color picker of this bucket")] NotColorPicker,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MintError {
    #[error("below minimum price: sent {sent}, need {min}")] BelowMinPrice { sent: Wei, min: Wei },
    #[error("above max balance per address: holding {held}, limit {limit}")] AboveMaxBalancePerAddress { held: u64, limit: u64 },
    #[error("stag hunt started, minting is closed")] StagHuntStarted,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HuntError {
    #[error("stag hunt has not started")] StagHuntNotStarted,
    #[error("hunter tree is not mature")] NotMatureTree,
    #[error("not enough cooperation: {0} bps")] NotEnoughCooperation(u64),
    #[error("below minimum price: sent {sent}, need {min}")] BelowMinPrice { sent: Wei, min: Wei },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("nothing to claim")] NothingToClaim,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    #[error("contract is not approved for markers")] UnapprovedContract,
    #[error("founders not thanked: hold {held} of 3 required tokens")] FoundersNotThanked { held: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("seeder is already locked")] SeederAlreadyLocked,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Token(#[from] TokenError),
    #[error(transparent)] Mint(#[from] MintError),
    #[error(transparent)] Hunt(#[from] HuntError),
    #[error(transparent)] Claim(#[from] ClaimError),
    #[error(transparent)] Marker(#[from] MarkerError),
    #[error(transparent)] Admin(#[from] AdminError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooperation_error_carries_measured_ratio() {
        let err = TreeError::from(HuntError::NotEnoughCooperation(679));
        assert_eq!(err.to_string(), "not enough cooperation: 679 bps");
    }

    #[test]
    fn existence_distinct_from_authorization() {
        assert_ne!(
            TreeError::from(TokenError::Nonexistent(3000)),
            TreeError::from(TokenError::NotNftOwner),
        );
    }

    #[test]
    fn price_error_names_both_sides() {
        let err = MintError::BelowMinPrice { sent: 1, min: 2 };
        assert_eq!(err.to_string(), "below minimum price: sent 1, need 2");
    }
}
