//! Checkout
//!
//! The quote pipeline. Adjustments combine in a fixed order: gift wrap joins
//! the subtotal to form the discount base; the promotional-offer discount and
//! the loyalty-tier discount are each computed from that same base and both
//! subtracted (they are never compounded against each other's already-reduced
//! amount); the result is clamped at zero, the delivery fee is added, and
//! point accrual is computed from the final total. Every intermediate figure
//! is carried on the resulting [`Quote`] so the session layer and the receipt
//! render from one authoritative breakdown.

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};

use crate::{
    delivery::DeliveryRule,
    discounts::{DiscountError, percent_of_minor},
    loyalty::points_for_amount,
};

/// Inputs to a quote computation.
#[derive(Debug)]
pub struct CheckoutInputs<'a> {
    /// The cart subtotal.
    pub subtotal: Money<'a, Currency>,

    /// The gift-wrap fee, present when the add-on is selected.
    pub gift_wrap_fee: Option<Money<'a, Currency>>,

    /// The rate of the single applied promotional offer, if any.
    pub offer_percent: Option<Percentage>,

    /// The shopper's loyalty-tier rate.
    pub loyalty_percent: Percentage,

    /// Destination pincode, as entered.
    pub pincode: &'a str,

    /// Whether the cart unlocked the keychain bundle offer.
    pub bundle_offer_eligible: bool,
}

/// A priced checkout.
#[derive(Debug, Clone)]
pub struct Quote<'a> {
    /// The cart subtotal the quote was computed from.
    pub subtotal: Money<'a, Currency>,

    /// The gift-wrap fee included in the discount base (zero when not selected).
    pub gift_wrap_fee: Money<'a, Currency>,

    /// Subtotal plus gift wrap: the base both discounts are computed from.
    pub base_for_discount: Money<'a, Currency>,

    /// The promotional-offer rebate.
    pub offer_discount: Money<'a, Currency>,

    /// The loyalty-tier rebate.
    pub loyalty_discount: Money<'a, Currency>,

    /// The discount base less both rebates, clamped at zero.
    pub amount_after_discounts: Money<'a, Currency>,

    /// The delivery fee charged on top.
    pub delivery_fee: Money<'a, Currency>,

    /// The amount payable.
    pub final_total: Money<'a, Currency>,

    /// Loyalty points the order will accrue.
    pub points_earned: u64,

    /// Whether the keychain bundle offer applies to this order.
    pub bundle_offer_eligible: bool,
}

/// Compute a quote.
///
/// Total over valid monetary input; preconditions such as a non-empty cart
/// and complete shipping details are the caller's to enforce before
/// submission.
///
/// # Errors
///
/// Returns a [`DiscountError`] only if a percentage calculation overflows.
pub fn quote<'a>(
    inputs: &CheckoutInputs<'a>,
    rule: &DeliveryRule,
    fallback_delivery_fee: i64,
) -> Result<Quote<'a>, DiscountError> {
    let currency = inputs.subtotal.currency();

    let gift_wrap_minor = inputs
        .gift_wrap_fee
        .map_or(0, |fee| fee.to_minor_units());

    let base = inputs.subtotal.to_minor_units() + gift_wrap_minor;

    let offer_discount = match &inputs.offer_percent {
        Some(percent) => percent_of_minor(percent, base)?,
        None => 0,
    };

    let loyalty_discount = percent_of_minor(&inputs.loyalty_percent, base)?;

    let after = 0.max(base - offer_discount - loyalty_discount);

    let delivery_fee = rule.fee(after, inputs.pincode, fallback_delivery_fee);
    let final_total = after + delivery_fee;

    Ok(Quote {
        subtotal: inputs.subtotal,
        gift_wrap_fee: Money::from_minor(gift_wrap_minor, currency),
        base_for_discount: Money::from_minor(base, currency),
        offer_discount: Money::from_minor(offer_discount, currency),
        loyalty_discount: Money::from_minor(loyalty_discount, currency),
        amount_after_discounts: Money::from_minor(after, currency),
        delivery_fee: Money::from_minor(delivery_fee, currency),
        final_total: Money::from_minor(final_total, currency),
        points_earned: points_for_amount(final_total),
        bundle_offer_eligible: inputs.bundle_offer_eligible,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;
    use testresult::TestResult;

    use crate::discounts::rate_from_percent;

    use super::*;

    fn flat_rule(free_threshold: i64, base_fee: i64) -> DeliveryRule {
        DeliveryRule {
            free_threshold,
            base_fee,
            remote_surcharge: 0,
            remote_prefixes: Vec::new(),
        }
    }

    fn inputs(subtotal_minor: i64) -> CheckoutInputs<'static> {
        CheckoutInputs {
            subtotal: Money::from_minor(subtotal_minor, INR),
            gift_wrap_fee: None,
            offer_percent: None,
            loyalty_percent: rate_from_percent(0),
            pincode: "110001",
            bundle_offer_eligible: false,
        }
    }

    #[test]
    fn silver_tier_end_to_end_example() -> TestResult {
        // Two stickers at ₹100 and two cased keychains at ₹110 + ₹10:
        // subtotal ₹440, Silver 5% takes ₹22, ₹418 clears the free-delivery
        // threshold, and 0.1 points per rupee floors to 41.
        let mut inputs = inputs(44000);
        inputs.loyalty_percent = rate_from_percent(5);
        inputs.bundle_offer_eligible = true;

        let quote = quote(&inputs, &flat_rule(5000, 4000), 4000)?;

        assert_eq!(quote.base_for_discount, Money::from_minor(44000, INR));
        assert_eq!(quote.offer_discount, Money::from_minor(0, INR));
        assert_eq!(quote.loyalty_discount, Money::from_minor(2200, INR));
        assert_eq!(quote.amount_after_discounts, Money::from_minor(41800, INR));
        assert_eq!(quote.delivery_fee, Money::from_minor(0, INR));
        assert_eq!(quote.final_total, Money::from_minor(41800, INR));
        assert_eq!(quote.points_earned, 41);
        assert!(quote.bundle_offer_eligible);

        Ok(())
    }

    #[test]
    fn both_discounts_come_off_the_same_base() -> TestResult {
        // 10% offer and 5% loyalty on a ₹1000 base take ₹100 and ₹50 —
        // not ₹100 then 5% of the reduced ₹900.
        let mut inputs = inputs(100_000);
        inputs.offer_percent = Some(rate_from_percent(10));
        inputs.loyalty_percent = rate_from_percent(5);

        let quote = quote(&inputs, &flat_rule(5000, 4000), 4000)?;

        assert_eq!(quote.offer_discount, Money::from_minor(10000, INR));
        assert_eq!(quote.loyalty_discount, Money::from_minor(5000, INR));
        assert_eq!(quote.amount_after_discounts, Money::from_minor(85000, INR));

        Ok(())
    }

    #[test]
    fn gift_wrap_joins_the_discount_base() -> TestResult {
        let mut inputs = inputs(10000);
        inputs.gift_wrap_fee = Some(Money::from_minor(2500, INR));
        inputs.offer_percent = Some(rate_from_percent(10));

        let quote = quote(&inputs, &flat_rule(50000, 4000), 4000)?;

        assert_eq!(quote.base_for_discount, Money::from_minor(12500, INR));
        assert_eq!(quote.offer_discount, Money::from_minor(1250, INR));

        Ok(())
    }

    #[test]
    fn discounts_clamp_at_zero_and_delivery_still_applies() -> TestResult {
        let mut inputs = inputs(100);
        inputs.offer_percent = Some(rate_from_percent(60));
        inputs.loyalty_percent = rate_from_percent(50);

        let quote = quote(&inputs, &flat_rule(50, 40), 40)?;

        assert_eq!(quote.amount_after_discounts, Money::from_minor(0, INR));
        assert_eq!(quote.delivery_fee, Money::from_minor(40, INR));
        assert_eq!(quote.final_total, Money::from_minor(40, INR));
        assert_eq!(quote.points_earned, 0);

        Ok(())
    }

    #[test]
    fn below_threshold_totals_pay_the_delivery_fee() -> TestResult {
        let quote = quote(&inputs(49), &flat_rule(50, 40), 40)?;

        assert_eq!(quote.delivery_fee, Money::from_minor(40, INR));
        assert_eq!(quote.final_total, Money::from_minor(89, INR));

        Ok(())
    }

    #[test]
    fn no_adjustments_leaves_the_subtotal_payable() -> TestResult {
        let quote = quote(&inputs(50000), &flat_rule(5000, 4000), 4000)?;

        assert_eq!(quote.final_total, Money::from_minor(50000, INR));

        Ok(())
    }

    #[test]
    fn discount_rounding_is_half_up() -> TestResult {
        // 5% of ₹4.50 is 22.5 paise; the shopper gets the full 23.
        let mut inputs = inputs(450);
        inputs.loyalty_percent = rate_from_percent(5);

        let quote = quote(&inputs, &flat_rule(0, 0), 0)?;

        assert_eq!(quote.loyalty_discount, Money::from_minor(23, INR));
        assert_eq!(quote.final_total, Money::from_minor(427, INR));

        Ok(())
    }
}
