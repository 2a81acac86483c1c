//! Shopper Models
//!
//! The shopper profile (points balance, premium window), the read-only
//! rewards catalog, and the redemption records minted when points are spent.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use trinket::loyalty::{TierSpec, tier_for_points};

use crate::uuids::TypedUuid;

/// Shopper UUID
pub type ShopperUuid = TypedUuid<ShopperRecord>;

/// Reward UUID (rewards-catalog entry)
pub type RewardUuid = TypedUuid<Reward>;

/// Redemption UUID
pub type RedemptionUuid = TypedUuid<RedeemedRewardRecord>;

/// The persisted shopper profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopperRecord {
    pub uuid: ShopperUuid,
    pub name: String,
    /// Non-negative; only redemption spends it.
    pub loyalty_points: u64,
    /// Premium membership runs until this instant, if set.
    pub premium_until: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl ShopperRecord {
    /// A fresh zero-point profile, minted on first use.
    #[must_use]
    pub fn fresh(point_in_time: Timestamp) -> Self {
        Self {
            uuid: ShopperUuid::generate(),
            name: "Guest".to_string(),
            loyalty_points: 0,
            premium_until: None,
            created_at: point_in_time,
        }
    }

    /// The loyalty tier this profile's balance resolves to.
    #[must_use]
    pub fn tier(&self) -> &'static TierSpec {
        tier_for_points(self.loyalty_points)
    }

    /// Whether premium membership is active at `now`. Expiry is automatic:
    /// the flag is never stored, always derived.
    #[must_use]
    pub fn is_premium(&self, now: Timestamp) -> bool {
        self.premium_until.is_some_and(|until| now < until)
    }
}

/// A rewards-catalog entry. The catalog is read-only input to the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    pub uuid: RewardUuid,
    pub name: String,
    pub points_cost: u64,
    pub effect: RewardEffect,
}

/// What a redeemed reward does when consumed at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardEffect {
    /// A percentage discount; occupies the checkout's single offer slot.
    DiscountPercent(u8),

    /// Waives the gift-wrap fee.
    FreeGiftWrap,
}

/// A spent-points record. `used` flips exactly once, when the redemption is
/// consumed as part of an order confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemedRewardRecord {
    pub uuid: RedemptionUuid,
    pub shopper: ShopperUuid,
    pub reward: RewardUuid,
    pub redeemed_at: Timestamp,
    pub used: bool,
}

/// The persisted redemptions document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedemptionsDoc {
    pub redemptions: Vec<RedeemedRewardRecord>,
}
