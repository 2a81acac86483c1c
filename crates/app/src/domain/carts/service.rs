//! Carts service.
//!
//! Persists the session's cart as a single document and delegates all cart
//! semantics (line merging, quantity flooring, derived totals) to the core
//! aggregate. Codes that no longer resolve in the catalog degrade to logged
//! no-ops, never errors.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, warn};
use trinket::{
    cart::Cart,
    fixtures::CatalogBundle,
    products::{CaseKey, ProductKey},
};

use crate::{
    domain::carts::{
        errors::CartsServiceError,
        models::{CartDoc, CartLineRecord, LineSelection},
    },
    store::{DocumentStore, load_doc, save_doc},
};

/// Document key for the session cart.
pub const CART_DOC_KEY: &str = "trinket.cart";

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The current cart, resolved against the catalog.
    async fn get_cart(&self) -> Cart;

    /// Add one unit of a selection. Unknown codes are a no-op; the
    /// unchanged cart is returned.
    async fn add_item(&self, selection: &LineSelection) -> Result<Cart, CartsServiceError>;

    /// Remove the line for a selection; a no-op if absent.
    async fn remove_item(&self, selection: &LineSelection) -> Result<Cart, CartsServiceError>;

    /// Overwrite a line's quantity; zero or less removes the line.
    async fn set_quantity(
        &self,
        selection: &LineSelection,
        quantity: i64,
    ) -> Result<Cart, CartsServiceError>;

    /// Attach (or clear) the customisation note on a line.
    async fn set_note(
        &self,
        selection: &LineSelection,
        note: Option<String>,
    ) -> Result<Cart, CartsServiceError>;

    /// Empty the cart. Called once, after a successful checkout.
    async fn clear(&self) -> Result<(), CartsServiceError>;
}

/// Carts service over the session document store.
#[derive(Clone)]
pub struct LocalCartsService {
    store: Arc<dyn DocumentStore>,
    bundle: Arc<CatalogBundle>,
}

impl LocalCartsService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, bundle: Arc<CatalogBundle>) -> Self {
        Self { store, bundle }
    }

    /// Rebuild the core aggregate from the persisted document, skipping
    /// records that no longer resolve in the catalog.
    fn resolve(&self, doc: &CartDoc) -> Cart {
        let mut cart = Cart::new();

        for record in &doc.lines {
            let Some(product) = self.bundle.product(&record.product_code) else {
                warn!(code = %record.product_code, "cart line references unknown product; skipping");
                continue;
            };

            let case = match &record.case_code {
                None => None,
                Some(code) => match self.bundle.case(code) {
                    Some(case) => Some(case),
                    None => {
                        warn!(code = %code, "cart line references unknown case; skipping");
                        continue;
                    }
                },
            };

            cart.add_line(product, case);
            cart.set_quantity(product, case, i64::from(record.quantity));
            cart.set_note(product, case, record.note.clone());
        }

        cart
    }

    /// Snapshot the aggregate back into its persisted form.
    fn snapshot(&self, cart: &Cart) -> CartDoc {
        let lines = cart
            .iter()
            .filter_map(|line| {
                let product_code = self.bundle.code_by_product.get(&line.product())?;

                let case_code = match line.case() {
                    None => None,
                    Some(case) => Some(self.bundle.code_by_case.get(&case)?.clone()),
                };

                Some(CartLineRecord {
                    product_code: product_code.clone(),
                    case_code,
                    quantity: line.quantity(),
                    note: line.note().map(str::to_string),
                })
            })
            .collect();

        CartDoc { lines }
    }

    async fn load_cart(&self) -> Cart {
        let doc: CartDoc = load_doc(self.store.as_ref(), CART_DOC_KEY)
            .await
            .unwrap_or_default();

        self.resolve(&doc)
    }

    async fn persist(&self, cart: &Cart) -> Result<(), CartsServiceError> {
        save_doc(self.store.as_ref(), CART_DOC_KEY, &self.snapshot(cart)).await?;

        Ok(())
    }

    /// Resolve a selection's codes against the catalog.
    fn keys(&self, selection: &LineSelection) -> Option<(ProductKey, Option<CaseKey>)> {
        let product = self.bundle.product(&selection.product_code)?;

        let case = match &selection.case_code {
            None => None,
            Some(code) => Some(self.bundle.case(code)?),
        };

        Some((product, case))
    }
}

#[async_trait]
impl CartsService for LocalCartsService {
    async fn get_cart(&self) -> Cart {
        self.load_cart().await
    }

    async fn add_item(&self, selection: &LineSelection) -> Result<Cart, CartsServiceError> {
        let mut cart = self.load_cart().await;

        let Some((product, case)) = self.keys(selection) else {
            warn!(code = %selection.product_code, "add_item with unknown selection; cart unchanged");
            return Ok(cart);
        };

        cart.add_line(product, case);
        self.persist(&cart).await?;

        debug!(code = %selection.product_code, "cart line added");

        Ok(cart)
    }

    async fn remove_item(&self, selection: &LineSelection) -> Result<Cart, CartsServiceError> {
        let mut cart = self.load_cart().await;

        if let Some((product, case)) = self.keys(selection) {
            cart.remove_line(product, case);
            self.persist(&cart).await?;
        }

        Ok(cart)
    }

    async fn set_quantity(
        &self,
        selection: &LineSelection,
        quantity: i64,
    ) -> Result<Cart, CartsServiceError> {
        let mut cart = self.load_cart().await;

        if let Some((product, case)) = self.keys(selection) {
            cart.set_quantity(product, case, quantity);
            self.persist(&cart).await?;
        }

        Ok(cart)
    }

    async fn set_note(
        &self,
        selection: &LineSelection,
        note: Option<String>,
    ) -> Result<Cart, CartsServiceError> {
        let mut cart = self.load_cart().await;

        if let Some((product, case)) = self.keys(selection) {
            cart.set_note(product, case, note);
            self.persist(&cart).await?;
        }

        Ok(cart)
    }

    async fn clear(&self) -> Result<(), CartsServiceError> {
        self.persist(&Cart::new()).await
    }
}
