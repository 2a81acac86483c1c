//! Orders service errors.

use thiserror::Error;
use trinket::discounts::DiscountError;

use crate::{
    domain::{offers::OffersServiceError, orders::models::OrderStatus, shoppers::ShoppersServiceError},
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    /// A required shipping field is empty. Surfaced before submission
    /// begins; required fields are never silently defaulted.
    #[error("missing required shipping field: {0}")]
    MissingShippingField(&'static str),

    /// Checkout attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// A submit arrived while another was in flight.
    #[error("a checkout is already in flight")]
    SubmissionInFlight,

    /// A promotional offer and a reward discount both asked for the single
    /// offer slot.
    #[error("an offer and a reward discount cannot both apply")]
    OfferRewardConflict,

    #[error("order not found")]
    OrderNotFound,

    /// Order statuses only move forward through the lifecycle.
    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error(transparent)]
    Pricing(#[from] DiscountError),

    #[error(transparent)]
    Offers(#[from] OffersServiceError),

    #[error(transparent)]
    Shoppers(#[from] ShoppersServiceError),

    #[error("storage error")]
    Store(#[from] StoreError),
}
