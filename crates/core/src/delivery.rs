//! Delivery
//!
//! The delivery-fee rule: orders at or above the free-delivery threshold
//! ship free; everything else pays the base fee, plus a surcharge when the
//! destination pincode falls in a configured remote-area prefix. A malformed
//! pincode falls back to a caller-supplied default fee rather than erroring.

use serde::{Deserialize, Serialize};

/// A validated Indian postal code: exactly six ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pincode(String);

impl Pincode {
    /// Parse a raw pincode string. Returns `None` unless the input is
    /// exactly six ASCII digits.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() == 6 && raw.bytes().all(|b| b.is_ascii_digit());

        valid.then(|| Self(raw.to_string()))
    }

    /// The validated digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The configurable delivery-fee rule. All amounts are in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRule {
    /// Order totals at or above this ship free.
    pub free_threshold: i64,

    /// Flat fee below the threshold.
    pub base_fee: i64,

    /// Added on top of the base fee for remote-area pincodes.
    pub remote_surcharge: i64,

    /// Pincode prefixes that count as remote areas.
    pub remote_prefixes: Vec<String>,
}

impl Default for DeliveryRule {
    fn default() -> Self {
        Self {
            free_threshold: 49900,
            base_fee: 4900,
            remote_surcharge: 3000,
            // Ladakh / far North-East pincode ranges.
            remote_prefixes: vec!["194".to_string(), "79".to_string()],
        }
    }
}

impl DeliveryRule {
    /// The delivery fee for an order total and destination pincode.
    ///
    /// Totals at or above the free threshold always ship free. Below it, a
    /// malformed pincode yields `fallback_fee`; a valid one pays the base
    /// fee plus the remote surcharge when a remote prefix matches.
    #[must_use]
    pub fn fee(&self, order_total_minor: i64, pincode: &str, fallback_fee: i64) -> i64 {
        if order_total_minor >= self.free_threshold {
            return 0;
        }

        match Pincode::parse(pincode) {
            None => fallback_fee,
            Some(pincode) => {
                let remote = self
                    .remote_prefixes
                    .iter()
                    .any(|prefix| pincode.as_str().starts_with(prefix.as_str()));

                if remote {
                    self.base_fee + self.remote_surcharge
                } else {
                    self.base_fee
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_rule(free_threshold: i64, base_fee: i64) -> DeliveryRule {
        DeliveryRule {
            free_threshold,
            base_fee,
            remote_surcharge: 0,
            remote_prefixes: Vec::new(),
        }
    }

    #[test]
    fn pincode_accepts_exactly_six_digits() {
        assert!(Pincode::parse("110001").is_some());
        assert!(Pincode::parse("11000").is_none());
        assert!(Pincode::parse("1100011").is_none());
        assert!(Pincode::parse("11000a").is_none());
        assert!(Pincode::parse("").is_none());
    }

    #[test]
    fn free_delivery_boundary_is_inclusive() {
        let rule = flat_rule(50, 40);

        assert_eq!(rule.fee(49, "110001", 40), 40);
        assert_eq!(rule.fee(50, "110001", 40), 0);
    }

    #[test]
    fn remote_prefix_adds_the_surcharge() {
        let rule = DeliveryRule {
            free_threshold: 49900,
            base_fee: 4900,
            remote_surcharge: 3000,
            remote_prefixes: vec!["194".to_string()],
        };

        assert_eq!(rule.fee(10000, "194101", 4900), 7900);
        assert_eq!(rule.fee(10000, "110001", 4900), 4900);
    }

    #[test]
    fn malformed_pincode_falls_back_to_the_supplied_fee() {
        let rule = flat_rule(49900, 4900);

        assert_eq!(rule.fee(10000, "not-a-pin", 6000), 6000);
    }

    #[test]
    fn malformed_pincode_above_threshold_still_ships_free() {
        let rule = flat_rule(49900, 4900);

        assert_eq!(rule.fee(50000, "???", 6000), 0);
    }

    #[test]
    fn default_rule_matches_storefront_constants() {
        let rule = DeliveryRule::default();

        assert_eq!(rule.fee(49900, "110001", rule.base_fee), 0);
        assert_eq!(rule.fee(49899, "110001", rule.base_fee), 4900);
        assert_eq!(rule.fee(1000, "790001", rule.base_fee), 7900);
    }
}
