//! Shoppers service.
//!
//! Owns the shopper profile and the redemption ledger. Accrual and
//! redemption both run inside one balance lock, so a redeem can never
//! interleave with another balance mutation: the read-check-write is a
//! single critical section.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tokio::sync::Mutex;
use tracing::{info, warn};
use trinket::loyalty::{points_for_amount, spend_points};

use crate::{
    domain::shoppers::{
        errors::ShoppersServiceError,
        models::{
            RedeemedRewardRecord, RedemptionUuid, RedemptionsDoc, Reward, RewardUuid,
            ShopperRecord,
        },
    },
    store::{DocumentStore, load_doc, save_doc},
};

/// Document key for the shopper profile.
pub const SHOPPER_DOC_KEY: &str = "trinket.shopper";

/// Document key for the redemption ledger.
pub const REDEMPTIONS_DOC_KEY: &str = "trinket.redemptions";

#[automock]
#[async_trait]
pub trait ShoppersService: Send + Sync {
    /// The current shopper profile; a fresh zero-point profile on first use.
    async fn get_shopper(&self, point_in_time: Timestamp) -> ShopperRecord;

    /// Credit the floor-accrued points for a completed order's final total.
    /// The orders service calls this exactly once per order.
    async fn accrue_points(
        &self,
        final_total_minor: i64,
        point_in_time: Timestamp,
    ) -> Result<ShopperRecord, ShoppersServiceError>;

    /// Spend points on a rewards-catalog entry, minting a redemption record.
    async fn redeem(
        &self,
        reward: RewardUuid,
        point_in_time: Timestamp,
    ) -> Result<RedeemedRewardRecord, ShoppersServiceError>;

    /// Look up a redemption and its catalog reward.
    async fn redemption(
        &self,
        uuid: RedemptionUuid,
    ) -> Result<(RedeemedRewardRecord, Reward), ShoppersServiceError>;

    /// Consume a redemption: flips `used`, exactly once.
    async fn mark_redemption_used(
        &self,
        uuid: RedemptionUuid,
    ) -> Result<(), ShoppersServiceError>;

    /// All redemption records, newest last.
    async fn redemptions(&self) -> Vec<RedeemedRewardRecord>;
}

/// Shoppers service over the session document store.
pub struct LocalShoppersService {
    store: Arc<dyn DocumentStore>,
    rewards: Vec<Reward>,
    balance_lock: Mutex<()>,
}

impl LocalShoppersService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, rewards: Vec<Reward>) -> Self {
        Self {
            store,
            rewards,
            balance_lock: Mutex::new(()),
        }
    }

    /// The read-only rewards catalog.
    #[must_use]
    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    /// Load the profile, minting (and persisting) a fresh zero-point one on
    /// first use so the shopper's identity stays stable across calls.
    async fn load_shopper(&self, point_in_time: Timestamp) -> ShopperRecord {
        if let Some(shopper) = load_doc(self.store.as_ref(), SHOPPER_DOC_KEY).await {
            return shopper;
        }

        let fresh = ShopperRecord::fresh(point_in_time);

        if let Err(err) = save_doc(self.store.as_ref(), SHOPPER_DOC_KEY, &fresh).await {
            warn!(%err, "could not persist fresh shopper profile");
        }

        fresh
    }

    async fn load_redemptions(&self) -> RedemptionsDoc {
        load_doc(self.store.as_ref(), REDEMPTIONS_DOC_KEY)
            .await
            .unwrap_or_default()
    }
}

#[async_trait]
impl ShoppersService for LocalShoppersService {
    async fn get_shopper(&self, point_in_time: Timestamp) -> ShopperRecord {
        self.load_shopper(point_in_time).await
    }

    async fn accrue_points(
        &self,
        final_total_minor: i64,
        point_in_time: Timestamp,
    ) -> Result<ShopperRecord, ShoppersServiceError> {
        let _guard = self.balance_lock.lock().await;

        let mut shopper = self.load_shopper(point_in_time).await;
        let earned = points_for_amount(final_total_minor);

        shopper.loyalty_points = shopper.loyalty_points.saturating_add(earned);
        save_doc(self.store.as_ref(), SHOPPER_DOC_KEY, &shopper).await?;

        info!(earned, balance = shopper.loyalty_points, "loyalty points accrued");

        Ok(shopper)
    }

    async fn redeem(
        &self,
        reward: RewardUuid,
        point_in_time: Timestamp,
    ) -> Result<RedeemedRewardRecord, ShoppersServiceError> {
        let _guard = self.balance_lock.lock().await;

        let reward = self
            .rewards
            .iter()
            .find(|entry| entry.uuid == reward)
            .cloned()
            .ok_or(ShoppersServiceError::RewardNotFound)?;

        let mut shopper = self.load_shopper(point_in_time).await;
        let previous_balance = shopper.loyalty_points;

        shopper.loyalty_points = spend_points(previous_balance, reward.points_cost)?;
        save_doc(self.store.as_ref(), SHOPPER_DOC_KEY, &shopper).await?;

        let record = RedeemedRewardRecord {
            uuid: RedemptionUuid::generate(),
            shopper: shopper.uuid,
            reward: reward.uuid,
            redeemed_at: point_in_time,
            used: false,
        };

        let mut ledger = self.load_redemptions().await;
        ledger.redemptions.push(record.clone());

        if let Err(err) = save_doc(self.store.as_ref(), REDEMPTIONS_DOC_KEY, &ledger).await {
            // The points were deducted but the record did not land; restore
            // the balance so the shopper is not charged for nothing.
            shopper.loyalty_points = previous_balance;

            if let Err(restore_err) =
                save_doc(self.store.as_ref(), SHOPPER_DOC_KEY, &shopper).await
            {
                warn!(%restore_err, "could not restore balance after failed redemption write");
            }

            return Err(err.into());
        }

        info!(reward = %reward.uuid, cost = reward.points_cost, "reward redeemed");

        Ok(record)
    }

    async fn redemption(
        &self,
        uuid: RedemptionUuid,
    ) -> Result<(RedeemedRewardRecord, Reward), ShoppersServiceError> {
        let ledger = self.load_redemptions().await;

        let record = ledger
            .redemptions
            .iter()
            .find(|record| record.uuid == uuid)
            .cloned()
            .ok_or(ShoppersServiceError::RedemptionNotFound)?;

        let reward = self
            .rewards
            .iter()
            .find(|entry| entry.uuid == record.reward)
            .cloned()
            .ok_or(ShoppersServiceError::RewardNotFound)?;

        Ok((record, reward))
    }

    async fn mark_redemption_used(
        &self,
        uuid: RedemptionUuid,
    ) -> Result<(), ShoppersServiceError> {
        let mut ledger = self.load_redemptions().await;

        let record = ledger
            .redemptions
            .iter_mut()
            .find(|record| record.uuid == uuid)
            .ok_or(ShoppersServiceError::RedemptionNotFound)?;

        if record.used {
            return Err(ShoppersServiceError::RewardAlreadyUsed);
        }

        record.used = true;
        save_doc(self.store.as_ref(), REDEMPTIONS_DOC_KEY, &ledger).await?;

        Ok(())
    }

    async fn redemptions(&self) -> Vec<RedeemedRewardRecord> {
        self.load_redemptions().await.redemptions
    }
}
