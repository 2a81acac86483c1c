//! Configuration

use serde::{Deserialize, Serialize};
use trinket::delivery::DeliveryRule;

/// Checkout configuration: the delivery rule plus the flat add-on fees, all
/// in minor units. Defaults are the storefront constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// The delivery-fee rule.
    pub delivery: DeliveryRule,

    /// Flat fee for the gift-wrap add-on.
    pub gift_wrap_fee: i64,

    /// Fee charged when the destination pincode cannot be parsed.
    pub fallback_delivery_fee: i64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            delivery: DeliveryRule::default(),
            gift_wrap_fee: 2500,
            fallback_delivery_fee: 4900,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_json() {
        let config = CheckoutConfig::default();

        let json = serde_json::to_string(&config).expect("serializes");
        let back: CheckoutConfig = serde_json::from_str(&json).expect("deserializes");

        assert_eq!(back.gift_wrap_fee, config.gift_wrap_fee);
        assert_eq!(back.delivery.free_threshold, config.delivery.free_threshold);
    }
}
