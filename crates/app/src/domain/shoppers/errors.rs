//! Shoppers service errors.

use thiserror::Error;
use trinket::loyalty::LoyaltyError;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ShoppersServiceError {
    /// Redemption attempted with a balance below the reward's cost.
    #[error(transparent)]
    Loyalty(#[from] LoyaltyError),

    /// The named reward is not in the rewards catalog.
    #[error("reward not found")]
    RewardNotFound,

    /// The named redemption record does not exist.
    #[error("redemption not found")]
    RedemptionNotFound,

    /// The named redemption has already been consumed at a checkout.
    #[error("reward already used")]
    RewardAlreadyUsed,

    #[error("storage error")]
    Store(#[from] StoreError),
}
