//! Offers service errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum OffersServiceError {
    /// The offer is not in the pool — never granted, or already consumed.
    #[error("offer not found")]
    NotFound,

    /// The offer's expiry passed before it could be applied.
    #[error("offer expired")]
    Expired,

    #[error("storage error")]
    Store(#[from] StoreError),
}
