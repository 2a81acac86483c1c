//! Loyalty
//!
//! The loyalty-tier resolver: a fixed, ordered tier table, the
//! points-to-tier resolution rule, and the accrual/spend arithmetic the
//! session layer builds redemption on. Everything here is a pure function of
//! a points balance.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::discounts::rate_from_percent;

/// Loyalty-program ranks, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoyaltyTier {
    /// Entry tier, no discount.
    Bronze,

    /// 500 points and up.
    Silver,

    /// 1500 points and up.
    Gold,

    /// 3000 points and up.
    Platinum,
}

/// One row of the tier table.
#[derive(Debug, Clone, Copy)]
pub struct TierSpec {
    /// The rank this row describes.
    pub tier: LoyaltyTier,

    /// Display name.
    pub name: &'static str,

    /// Minimum points balance for this tier.
    pub min_points: u64,

    /// Whole-number discount percent applied to the checkout base.
    pub discount_percent: u8,

    /// Descriptive perks shown to the shopper.
    pub perks: &'static [&'static str],
}

impl TierSpec {
    /// The tier's discount as a rate.
    #[must_use]
    pub fn discount(&self) -> Percentage {
        rate_from_percent(self.discount_percent)
    }
}

const BRONZE: TierSpec = TierSpec {
    tier: LoyaltyTier::Bronze,
    name: "Bronze",
    min_points: 0,
    discount_percent: 0,
    perks: &["Birthday surprise sticker"],
};

const SILVER: TierSpec = TierSpec {
    tier: LoyaltyTier::Silver,
    name: "Silver",
    min_points: 500,
    discount_percent: 5,
    perks: &["5% off every order", "Early access to drops"],
};

const GOLD: TierSpec = TierSpec {
    tier: LoyaltyTier::Gold,
    name: "Gold",
    min_points: 1500,
    discount_percent: 10,
    perks: &["10% off every order", "Free gift wrap once a month"],
};

const PLATINUM: TierSpec = TierSpec {
    tier: LoyaltyTier::Platinum,
    name: "Platinum",
    min_points: 3000,
    discount_percent: 15,
    perks: &[
        "15% off every order",
        "Priority dispatch",
        "Exclusive quarterly mystery box",
    ],
};

/// The full tier table, ordered lowest to highest. `min_points` and
/// `discount_percent` are both non-decreasing across the table.
pub const TIERS: [TierSpec; 4] = [BRONZE, SILVER, GOLD, PLATINUM];

/// Resolve the tier for a points balance: the highest tier whose
/// `min_points` does not exceed the balance.
///
/// Total over the whole `u64` range; zero resolves to the lowest tier and
/// there is no upper bound.
#[must_use]
pub fn tier_for_points(points: u64) -> &'static TierSpec {
    TIERS
        .iter()
        .rev()
        .find(|spec| spec.min_points <= points)
        .unwrap_or(&BRONZE)
}

/// Points accrued for a completed order's final total, in minor units.
///
/// The accrual rate is 0.1 points per rupee. Accrual always floors, never
/// rounds up, so the program cannot over-credit.
#[must_use]
pub fn points_for_amount(final_total_minor: i64) -> u64 {
    if final_total_minor <= 0 {
        return 0;
    }

    // 0.1 points per rupee is 0.001 points per minor unit.
    let rate = Decimal::new(1, 3);

    (Decimal::from(final_total_minor) * rate)
        .floor()
        .to_u64()
        .unwrap_or(0)
}

/// Errors from loyalty-point arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoyaltyError {
    /// A redemption was attempted with a balance below the reward's cost.
    #[error("insufficient points: balance {balance}, required {required}")]
    InsufficientPoints {
        /// The balance at the time of the attempt.
        balance: u64,

        /// The points the reward costs.
        required: u64,
    },
}

/// Deduct a reward's cost from a points balance.
///
/// # Errors
///
/// Returns [`LoyaltyError::InsufficientPoints`] when the balance cannot
/// cover the cost; the balance is returned unchanged in the error fields.
pub fn spend_points(balance: u64, cost: u64) -> Result<u64, LoyaltyError> {
    balance
        .checked_sub(cost)
        .ok_or(LoyaltyError::InsufficientPoints {
            balance,
            required: cost,
        })
}
