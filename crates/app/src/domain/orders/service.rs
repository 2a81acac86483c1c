//! Orders service.
//!
//! Orchestrates checkout: precondition checks, offer and reward resolution,
//! the quote, order minting, and the post-commit side effects (point
//! accrual, cart clearing, offer consumption, fulfilment notification). A
//! `try_lock` on the submission state is the in-flight guard — a second
//! submit while one is running is rejected, never queued, so a double click
//! cannot mint two orders.
//!
//! Once the order document is persisted the checkout is committed: every
//! later side effect is best-effort and failure is logged, never rolled
//! back.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rusty_money::Money;
use tokio::sync::Mutex;
use tracing::{info, warn};
use trinket::{
    cart::Cart,
    checkout::{CheckoutInputs, quote},
    discounts::rate_from_percent,
    fixtures::CatalogBundle,
};

use crate::{
    config::CheckoutConfig,
    domain::{
        carts::CartsService,
        offers::{OffersService, errors::OffersServiceError, models::OfferRecord},
        orders::{
            errors::OrdersServiceError,
            models::{
                CheckoutOutcome, CheckoutRequest, OrderLineRecord, OrderRecord, OrderStatus,
                OrderUuid, OrdersDoc, QuoteRecord, SubmissionState,
            },
            notifier::FulfillmentNotifier,
        },
        shoppers::{
            ShoppersService,
            errors::ShoppersServiceError,
            models::{RedeemedRewardRecord, Reward, RewardEffect},
        },
    },
    store::{DocumentStore, load_doc, save_doc},
};

/// Document key for the order history.
pub const ORDERS_DOC_KEY: &str = "trinket.orders";

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Run a user-initiated checkout to completion.
    async fn submit_checkout(
        &self,
        request: CheckoutRequest,
        point_in_time: Timestamp,
    ) -> Result<CheckoutOutcome, OrdersServiceError>;

    /// The full order history, oldest first.
    async fn orders(&self) -> Vec<OrderRecord>;

    /// Look up a single order.
    async fn order(&self, uuid: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Advance an order's status. Forward moves only; driven by the external
    /// fulfilment process.
    async fn advance_status(
        &self,
        uuid: OrderUuid,
        next: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

/// Orders service over the session document store.
pub struct LocalOrdersService {
    store: Arc<dyn DocumentStore>,
    bundle: Arc<CatalogBundle>,
    config: CheckoutConfig,
    carts: Arc<dyn CartsService>,
    shoppers: Arc<dyn ShoppersService>,
    offers: Arc<dyn OffersService>,
    notifier: Arc<dyn FulfillmentNotifier>,
    submission: Mutex<SubmissionState>,
}

impl LocalOrdersService {
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        bundle: Arc<CatalogBundle>,
        config: CheckoutConfig,
        carts: Arc<dyn CartsService>,
        shoppers: Arc<dyn ShoppersService>,
        offers: Arc<dyn OffersService>,
        notifier: Arc<dyn FulfillmentNotifier>,
    ) -> Self {
        Self {
            store,
            bundle,
            config,
            carts,
            shoppers,
            offers,
            notifier,
            submission: Mutex::new(SubmissionState::Idle),
        }
    }

    /// The submission state machine's current position.
    pub async fn submission_state(&self) -> SubmissionState {
        *self.submission.lock().await
    }

    async fn load_orders(&self) -> OrdersDoc {
        load_doc(self.store.as_ref(), ORDERS_DOC_KEY)
            .await
            .unwrap_or_default()
    }

    /// Freeze the cart's resolvable lines into order line records.
    fn order_lines(&self, cart: &Cart) -> Vec<OrderLineRecord> {
        cart.iter()
            .filter_map(|line| {
                let product = self.bundle.catalog.product(line.product())?;
                let unit = self
                    .bundle
                    .catalog
                    .unit_price(line.product(), line.case())?
                    .to_minor_units();
                let product_code = self.bundle.code_by_product.get(&line.product())?.clone();

                let (case_code, case_name) = match line.case() {
                    None => (None, None),
                    Some(case) => (
                        self.bundle.code_by_case.get(&case).cloned(),
                        self.bundle.catalog.case(case).map(|c| c.name.clone()),
                    ),
                };

                let description = match case_name {
                    Some(case_name) => format!("{} ({case_name})", product.name),
                    None => product.name.clone(),
                };

                Some(OrderLineRecord {
                    product_code,
                    case_code,
                    description,
                    quantity: line.quantity(),
                    unit_price: unit,
                    line_total: unit * i64::from(line.quantity()),
                })
            })
            .collect()
    }
}

#[async_trait]
impl OrdersService for LocalOrdersService {
    async fn submit_checkout(
        &self,
        request: CheckoutRequest,
        point_in_time: Timestamp,
    ) -> Result<CheckoutOutcome, OrdersServiceError> {
        // The guard: holding the state lock for the whole submission is what
        // makes a concurrent submit observable and rejectable.
        let Ok(mut state) = self.submission.try_lock() else {
            return Err(OrdersServiceError::SubmissionInFlight);
        };

        // Preconditions, all rejected before entering Submitting.
        if let Some(field) = request.shipping.missing_field() {
            return Err(OrdersServiceError::MissingShippingField(field));
        }

        let cart = self.carts.get_cart().await;

        if cart.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        let redemption: Option<(RedeemedRewardRecord, Reward)> = match request.redemption {
            None => None,
            Some(uuid) => {
                let (record, reward) = self.shoppers.redemption(uuid).await?;

                if record.used {
                    return Err(ShoppersServiceError::RewardAlreadyUsed.into());
                }

                Some((record, reward))
            }
        };

        let reward_discount = redemption.as_ref().and_then(|(_, reward)| match reward.effect {
            RewardEffect::DiscountPercent(percent) => Some(percent),
            RewardEffect::FreeGiftWrap => None,
        });

        // A reward discount rides in the checkout's single offer slot.
        if reward_discount.is_some() && request.offer.is_some() {
            return Err(OrdersServiceError::OfferRewardConflict);
        }

        *state = SubmissionState::Submitting;

        let mut notices = Vec::new();

        // An offer that expired or vanished between display and apply
        // degrades to a no-offer checkout with a notice; it never blocks.
        let offer: Option<OfferRecord> = match request.offer {
            None => None,
            Some(uuid) => match self.offers.offer(uuid, point_in_time).await {
                Ok(offer) => Some(offer),
                Err(OffersServiceError::Expired) => {
                    notices.push("The selected offer has expired and was not applied.".to_string());
                    None
                }
                Err(OffersServiceError::NotFound) => {
                    notices.push("The selected offer is no longer available.".to_string());
                    None
                }
                Err(err) => {
                    *state = SubmissionState::Failed;
                    return Err(err.into());
                }
            },
        };

        let shopper = self.shoppers.get_shopper(point_in_time).await;
        let currency = self.bundle.catalog.currency();

        let offer_percent = offer
            .as_ref()
            .map(|offer| rate_from_percent(offer.discount_percent))
            .or_else(|| reward_discount.map(rate_from_percent));

        let wrap_waived = redemption
            .as_ref()
            .is_some_and(|(_, reward)| reward.effect == RewardEffect::FreeGiftWrap);

        if request.gift_wrap && wrap_waived {
            notices.push("Gift wrap is on the house — reward applied.".to_string());
        }

        let gift_wrap_fee = (request.gift_wrap && !wrap_waived)
            .then(|| Money::from_minor(self.config.gift_wrap_fee, currency));

        let inputs = CheckoutInputs {
            subtotal: cart.subtotal(&self.bundle.catalog),
            gift_wrap_fee,
            offer_percent,
            loyalty_percent: shopper.tier().discount(),
            pincode: &request.shipping.pincode,
            bundle_offer_eligible: cart.bundle_offer_eligible(&self.bundle.catalog),
        };

        let priced = match quote(&inputs, &self.config.delivery, self.config.fallback_delivery_fee)
        {
            Ok(priced) => priced,
            Err(err) => {
                *state = SubmissionState::Failed;
                return Err(err.into());
            }
        };

        let quote_record = QuoteRecord::from(&priced);
        let final_total = quote_record.final_total;

        let order = OrderRecord {
            uuid: OrderUuid::generate(),
            shopper: shopper.uuid,
            lines: self.order_lines(&cart),
            quote: quote_record,
            shipping: request.shipping,
            offer: offer.as_ref().map(|offer| offer.uuid),
            status: OrderStatus::Pending,
            placed_at: point_in_time,
        };

        let mut doc = self.load_orders().await;
        doc.orders.push(order.clone());

        if let Err(err) = save_doc(self.store.as_ref(), ORDERS_DOC_KEY, &doc).await {
            *state = SubmissionState::Failed;
            return Err(err.into());
        }

        // The order is committed; everything below is best-effort.
        *state = SubmissionState::Confirmed;
        info!(order = %order.uuid, total = final_total, "order placed");

        if let Err(err) = self.shoppers.accrue_points(final_total, point_in_time).await {
            warn!(%err, "point accrual failed after order placement");
            notices.push("Loyalty points for this order will be credited shortly.".to_string());
        }

        if let Some((record, _)) = &redemption {
            if let Err(err) = self.shoppers.mark_redemption_used(record.uuid).await {
                warn!(%err, "could not mark redemption used");
            }
        }

        if let Err(err) = self.carts.clear().await {
            warn!(%err, "cart clear failed after order placement");
        }

        if let Some(offer) = &offer {
            if let Err(err) = self.offers.consume(offer.uuid).await {
                warn!(%err, "offer consumption failed");
            }
        }

        if let Err(err) = self.notifier.order_placed(&order).await {
            warn!(%err, "fulfilment notification failed; order stands");
        }

        Ok(CheckoutOutcome { order, notices })
    }

    async fn orders(&self) -> Vec<OrderRecord> {
        self.load_orders().await.orders
    }

    async fn order(&self, uuid: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        self.load_orders()
            .await
            .orders
            .into_iter()
            .find(|order| order.uuid == uuid)
            .ok_or(OrdersServiceError::OrderNotFound)
    }

    async fn advance_status(
        &self,
        uuid: OrderUuid,
        next: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut doc = self.load_orders().await;

        let order = doc
            .orders
            .iter_mut()
            .find(|order| order.uuid == uuid)
            .ok_or(OrdersServiceError::OrderNotFound)?;

        if !order.status.can_advance_to(next) {
            return Err(OrdersServiceError::InvalidStatusTransition {
                from: order.status,
                to: next,
            });
        }

        order.status = next;
        let updated = order.clone();

        save_doc(self.store.as_ref(), ORDERS_DOC_KEY, &doc).await?;

        info!(order = %uuid, status = ?next, "order status advanced");

        Ok(updated)
    }
}
