//! Order Models
//!
//! Orders are immutable snapshots minted at checkout confirmation: the lines
//! as purchased, the full quote breakdown, shipping details, and a status
//! that only ever moves forward through the fulfilment lifecycle.

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use trinket::checkout::Quote;

use crate::{
    domain::{offers::models::OfferUuid, shoppers::models::{RedemptionUuid, ShopperUuid}},
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// The fulfilment lifecycle. Declaration order is the lifecycle order;
/// `Cancelled` sits outside the forward chain as the terminal escape hatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the lifecycle admits moving from `self` to `next`. Forward
    /// moves only, cancellation allowed from any non-terminal state.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }

        if next == Self::Cancelled {
            return true;
        }

        next > self
    }
}

/// Shipping details captured at checkout. All four fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub name: String,
    pub address: String,
    pub pincode: String,
    pub phone: String,
}

impl ShippingDetails {
    /// The first required field that is missing, if any.
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("address", &self.address),
            ("pincode", &self.pincode),
            ("phone", &self.phone),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
    }
}

/// One purchased line, as priced at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRecord {
    pub product_code: String,
    pub case_code: Option<String>,
    pub description: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub line_total: i64,
}

/// The quote breakdown frozen onto an order, in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub subtotal: i64,
    pub gift_wrap_fee: i64,
    pub base_for_discount: i64,
    pub offer_discount: i64,
    pub loyalty_discount: i64,
    pub amount_after_discounts: i64,
    pub delivery_fee: i64,
    pub final_total: i64,
    pub points_earned: u64,
    pub bundle_offer_eligible: bool,
}

impl From<&Quote<'_>> for QuoteRecord {
    fn from(quote: &Quote<'_>) -> Self {
        Self {
            subtotal: quote.subtotal.to_minor_units(),
            gift_wrap_fee: quote.gift_wrap_fee.to_minor_units(),
            base_for_discount: quote.base_for_discount.to_minor_units(),
            offer_discount: quote.offer_discount.to_minor_units(),
            loyalty_discount: quote.loyalty_discount.to_minor_units(),
            amount_after_discounts: quote.amount_after_discounts.to_minor_units(),
            delivery_fee: quote.delivery_fee.to_minor_units(),
            final_total: quote.final_total.to_minor_units(),
            points_earned: quote.points_earned,
            bundle_offer_eligible: quote.bundle_offer_eligible,
        }
    }
}

impl QuoteRecord {
    /// Rehydrate the frozen breakdown into core money values for display.
    #[must_use]
    pub fn to_quote(&self, currency: &'static Currency) -> Quote<'static> {
        Quote {
            subtotal: Money::from_minor(self.subtotal, currency),
            gift_wrap_fee: Money::from_minor(self.gift_wrap_fee, currency),
            base_for_discount: Money::from_minor(self.base_for_discount, currency),
            offer_discount: Money::from_minor(self.offer_discount, currency),
            loyalty_discount: Money::from_minor(self.loyalty_discount, currency),
            amount_after_discounts: Money::from_minor(self.amount_after_discounts, currency),
            delivery_fee: Money::from_minor(self.delivery_fee, currency),
            final_total: Money::from_minor(self.final_total, currency),
            points_earned: self.points_earned,
            bundle_offer_eligible: self.bundle_offer_eligible,
        }
    }
}

/// An immutable order snapshot. Never deleted; only `status` ever changes,
/// and only forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub shopper: ShopperUuid,
    pub lines: Vec<OrderLineRecord>,
    pub quote: QuoteRecord,
    pub shipping: ShippingDetails,
    pub offer: Option<OfferUuid>,
    pub status: OrderStatus,
    pub placed_at: Timestamp,
}

/// The persisted order history document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdersDoc {
    pub orders: Vec<OrderRecord>,
}

/// A user-initiated checkout submission.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub shipping: ShippingDetails,
    pub gift_wrap: bool,
    /// The single selected promotional offer, if any.
    pub offer: Option<OfferUuid>,
    /// A redeemed reward to consume with this order, if any.
    pub redemption: Option<RedemptionUuid>,
}

/// The result of a confirmed checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: OrderRecord,
    /// User-visible notices gathered along the way (expired offer dropped,
    /// points crediting delayed, and so on).
    pub notices: Vec<String>,
}

/// The checkout submission state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Confirmed,
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_advance_forward_only() {
        use OrderStatus::*;

        assert!(Pending.can_advance_to(Confirmed));
        assert!(Confirmed.can_advance_to(Shipped));
        assert!(Shipped.can_advance_to(OutForDelivery));
        assert!(OutForDelivery.can_advance_to(Delivered));
        assert!(Pending.can_advance_to(Shipped), "skipping forward is a forward move");

        assert!(!Shipped.can_advance_to(Confirmed));
        assert!(!Confirmed.can_advance_to(Pending));
        assert!(!Pending.can_advance_to(Pending));
    }

    #[test]
    fn cancellation_is_reachable_from_any_non_terminal_state() {
        use OrderStatus::*;

        for status in [Pending, Confirmed, Shipped, OutForDelivery] {
            assert!(status.can_advance_to(Cancelled), "{status:?} can cancel");
        }

        assert!(!Delivered.can_advance_to(Cancelled));
        assert!(!Cancelled.can_advance_to(Pending));
        assert!(!Cancelled.can_advance_to(Cancelled));
    }

    #[test]
    fn missing_field_reports_the_first_gap_in_order() {
        let mut shipping = ShippingDetails {
            name: "Meera Joshi".to_string(),
            address: "14 Lakeview Road, Pune".to_string(),
            pincode: "411001".to_string(),
            phone: "9876543210".to_string(),
        };

        assert_eq!(shipping.missing_field(), None);

        shipping.phone = "  ".to_string();
        assert_eq!(shipping.missing_field(), Some("phone"));

        shipping.address = String::new();
        assert_eq!(shipping.missing_field(), Some("address"));
    }
}
