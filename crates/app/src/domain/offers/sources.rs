//! Offer producers.
//!
//! Every promotional mechanic (spin wheel, scratch card, treasure hunt) is
//! the same machine underneath: a weighted prize table drawn with a uniform
//! roll in `[0, total_weight)` walked against cumulative weights. The
//! checkout only ever sees the [`OfferRecord`]s these mint; it never knows
//! which mechanic produced one.

use jiff::{Span, Timestamp};
use rand::{Rng, RngCore};
use thiserror::Error;
use tracing::debug;

use crate::domain::offers::models::{OfferMechanic, OfferRecord, OfferUuid};

/// Errors raised while drawing an offer.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The won offer's expiry could not be computed.
    #[error("could not compute offer expiry")]
    Expiry(#[from] jiff::Error),
}

/// A winnable prize: the discount and how long the offer stays valid.
#[derive(Debug, Clone, Copy)]
pub struct OfferPrize {
    pub label: &'static str,
    pub discount_percent: u8,
    pub validity_hours: i64,
}

/// A weighted outcome table.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    entries: Vec<(u32, T)>,
    total: u32,
}

impl<T> WeightedTable<T> {
    /// Build a table from (weight, outcome) entries. Zero-weight entries can
    /// never be drawn.
    #[must_use]
    pub fn new(entries: Vec<(u32, T)>) -> Self {
        let total = entries.iter().map(|(weight, _)| *weight).sum();

        Self { entries, total }
    }

    /// Total weight across all entries.
    #[must_use]
    pub fn total_weight(&self) -> u32 {
        self.total
    }

    /// Draw one outcome: a uniform roll in `[0, total_weight)` walked
    /// against cumulative weights. `None` only for an empty/zero-weight
    /// table.
    pub fn draw(&self, rng: &mut dyn RngCore) -> Option<&T> {
        if self.total == 0 {
            return None;
        }

        let roll = rng.gen_range(0..self.total);
        let mut cumulative = 0u32;

        self.entries
            .iter()
            .find(|(weight, _)| {
                cumulative += weight;
                roll < cumulative
            })
            .map(|(_, outcome)| outcome)
    }
}

/// A producer of one-time offers. The pool and the checkout depend on this
/// interface, never on a concrete mechanic.
pub trait OfferSource: Send + Sync {
    /// The mechanic this source represents.
    fn mechanic(&self) -> OfferMechanic;

    /// Play the mechanic once. `Ok(None)` is a losing draw.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] if the won offer's expiry cannot be
    /// computed.
    fn draw(
        &self,
        rng: &mut dyn RngCore,
        point_in_time: Timestamp,
    ) -> Result<Option<OfferRecord>, SourceError>;
}

/// A mechanic backed by a weighted prize table. Losing slots are `None`
/// entries.
#[derive(Debug, Clone)]
pub struct MechanicSource {
    mechanic: OfferMechanic,
    table: WeightedTable<Option<OfferPrize>>,
}

impl MechanicSource {
    #[must_use]
    pub fn new(mechanic: OfferMechanic, table: WeightedTable<Option<OfferPrize>>) -> Self {
        Self { mechanic, table }
    }
}

impl OfferSource for MechanicSource {
    fn mechanic(&self) -> OfferMechanic {
        self.mechanic
    }

    fn draw(
        &self,
        rng: &mut dyn RngCore,
        point_in_time: Timestamp,
    ) -> Result<Option<OfferRecord>, SourceError> {
        let Some(Some(prize)) = self.table.draw(rng) else {
            debug!(mechanic = ?self.mechanic, "losing draw");
            return Ok(None);
        };

        let expires_at = point_in_time.checked_add(Span::new().hours(prize.validity_hours))?;

        debug!(mechanic = ?self.mechanic, label = prize.label, "winning draw");

        Ok(Some(OfferRecord {
            uuid: OfferUuid::generate(),
            mechanic: self.mechanic,
            label: prize.label.to_string(),
            discount_percent: prize.discount_percent,
            expires_at,
        }))
    }
}

/// The storefront spin wheel: frequent small wins, one rare jackpot slice,
/// and two losing slices.
#[must_use]
pub fn spin_wheel() -> MechanicSource {
    MechanicSource::new(
        OfferMechanic::SpinWheel,
        WeightedTable::new(vec![
            (30, Some(OfferPrize { label: "5% off", discount_percent: 5, validity_hours: 24 })),
            (20, Some(OfferPrize { label: "10% off", discount_percent: 10, validity_hours: 24 })),
            (5, Some(OfferPrize { label: "25% off", discount_percent: 25, validity_hours: 12 })),
            (1, Some(OfferPrize { label: "50% off jackpot", discount_percent: 50, validity_hours: 6 })),
            (44, None),
        ]),
    )
}

/// The scratch card: fewer, slightly larger wins.
#[must_use]
pub fn scratch_card() -> MechanicSource {
    MechanicSource::new(
        OfferMechanic::ScratchCard,
        WeightedTable::new(vec![
            (15, Some(OfferPrize { label: "15% off", discount_percent: 15, validity_hours: 48 })),
            (5, Some(OfferPrize { label: "30% off", discount_percent: 30, validity_hours: 24 })),
            (80, None),
        ]),
    )
}

/// The treasure hunt: a guaranteed but modest find.
#[must_use]
pub fn treasure_hunt() -> MechanicSource {
    MechanicSource::new(
        OfferMechanic::TreasureHunt,
        WeightedTable::new(vec![
            (70, Some(OfferPrize { label: "5% off", discount_percent: 5, validity_hours: 72 })),
            (30, Some(OfferPrize { label: "12% off", discount_percent: 12, validity_hours: 72 })),
        ]),
    )
}
