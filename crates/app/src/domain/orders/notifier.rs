//! Fulfilment notification boundary.
//!
//! Orders are announced to the fulfilment collaborator fire-and-forget: a
//! failed notification is logged and the order stands.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::domain::orders::models::OrderRecord;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("fulfilment endpoint unavailable")]
    Unavailable,
}

#[automock]
#[async_trait]
pub trait FulfillmentNotifier: Send + Sync {
    /// Announce a freshly placed order. Best-effort; the caller never rolls
    /// back on failure.
    async fn order_placed(&self, order: &OrderRecord) -> Result<(), NotifyError>;
}

/// Notifier for sessions without a fulfilment hookup.
#[derive(Debug, Default, Clone)]
pub struct NoopNotifier;

#[async_trait]
impl FulfillmentNotifier for NoopNotifier {
    async fn order_placed(&self, _order: &OrderRecord) -> Result<(), NotifyError> {
        Ok(())
    }
}
