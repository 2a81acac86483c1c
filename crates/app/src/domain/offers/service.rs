//! Offers service.
//!
//! The shared offer pool every promotional mechanic appends to and the
//! checkout reads from. Expiry is a pure time check against the caller's
//! `point_in_time`, evaluated freshly on every lookup, so an offer that
//! expires between display and apply is rejected at apply time.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, warn};

use crate::{
    domain::offers::{
        errors::OffersServiceError,
        models::{OfferPoolDoc, OfferRecord, OfferUuid},
    },
    store::{DocumentStore, load_doc, save_doc},
};

/// Document key for the offer pool.
pub const OFFERS_DOC_KEY: &str = "trinket.offers";

#[automock]
#[async_trait]
pub trait OffersService: Send + Sync {
    /// Offers still valid at `point_in_time`, display order.
    async fn available(&self, point_in_time: Timestamp) -> Vec<OfferRecord>;

    /// Append a freshly won offer to the pool.
    async fn grant(&self, offer: OfferRecord) -> Result<(), OffersServiceError>;

    /// Look up an offer for application at checkout.
    ///
    /// An offer whose expiry has passed is pruned from the pool and
    /// reported as [`OffersServiceError::Expired`]; a consumed or unknown
    /// offer reports [`OffersServiceError::NotFound`].
    async fn offer(
        &self,
        uuid: OfferUuid,
        point_in_time: Timestamp,
    ) -> Result<OfferRecord, OffersServiceError>;

    /// Permanently remove an offer from the pool. Called once per applied
    /// offer, as part of order confirmation.
    async fn consume(&self, uuid: OfferUuid) -> Result<(), OffersServiceError>;
}

/// Offers service over the session document store.
pub struct LocalOffersService {
    store: Arc<dyn DocumentStore>,
}

impl LocalOffersService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    async fn load_pool(&self) -> OfferPoolDoc {
        load_doc(self.store.as_ref(), OFFERS_DOC_KEY)
            .await
            .unwrap_or_default()
    }
}

#[async_trait]
impl OffersService for LocalOffersService {
    async fn available(&self, point_in_time: Timestamp) -> Vec<OfferRecord> {
        self.load_pool()
            .await
            .offers
            .into_iter()
            .filter(|offer| !offer.is_expired(point_in_time))
            .collect()
    }

    async fn grant(&self, offer: OfferRecord) -> Result<(), OffersServiceError> {
        let mut pool = self.load_pool().await;

        debug!(offer = %offer.uuid, label = %offer.label, "offer granted");

        pool.offers.push(offer);
        save_doc(self.store.as_ref(), OFFERS_DOC_KEY, &pool).await?;

        Ok(())
    }

    async fn offer(
        &self,
        uuid: OfferUuid,
        point_in_time: Timestamp,
    ) -> Result<OfferRecord, OffersServiceError> {
        let mut pool = self.load_pool().await;

        let offer = pool
            .offers
            .iter()
            .find(|offer| offer.uuid == uuid)
            .cloned()
            .ok_or(OffersServiceError::NotFound)?;

        if offer.is_expired(point_in_time) {
            // Prune the dead offer so it stops showing up; losing the prune
            // to a storage hiccup only means it gets pruned next time.
            pool.offers.retain(|candidate| candidate.uuid != uuid);

            if let Err(err) = save_doc(self.store.as_ref(), OFFERS_DOC_KEY, &pool).await {
                warn!(%err, "could not prune expired offer");
            }

            return Err(OffersServiceError::Expired);
        }

        Ok(offer)
    }

    async fn consume(&self, uuid: OfferUuid) -> Result<(), OffersServiceError> {
        let mut pool = self.load_pool().await;
        let before = pool.offers.len();

        pool.offers.retain(|offer| offer.uuid != uuid);

        if pool.offers.len() == before {
            return Err(OffersServiceError::NotFound);
        }

        save_doc(self.store.as_ref(), OFFERS_DOC_KEY, &pool).await?;

        Ok(())
    }
}
