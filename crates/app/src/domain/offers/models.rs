//! Offer Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Offer UUID
pub type OfferUuid = TypedUuid<OfferRecord>;

/// The promotional mechanic an offer was won through. The checkout never
/// branches on this; it exists for display and analytics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferMechanic {
    SpinWheel,
    ScratchCard,
    TreasureHunt,
}

/// A won promotional discount. Usable at most once, and invalid once
/// `expires_at` passes — validity is re-checked at apply time, not only when
/// the pool is displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferRecord {
    pub uuid: OfferUuid,
    pub mechanic: OfferMechanic,
    pub label: String,
    pub discount_percent: u8,
    pub expires_at: Timestamp,
}

impl OfferRecord {
    /// Whether the offer's expiry has passed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }
}

/// The persisted offer pool document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferPoolDoc {
    pub offers: Vec<OfferRecord>,
}
