//! Cart Records
//!
//! Persisted cart state references the catalog by stable code, never by
//! ephemeral catalog key, so a stored cart survives catalog rebuilds.

use serde::{Deserialize, Serialize};

/// The persisted cart document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartDoc {
    pub lines: Vec<CartLineRecord>,
}

/// One persisted cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineRecord {
    pub product_code: String,
    pub case_code: Option<String>,
    pub quantity: u32,
    pub note: Option<String>,
}

/// A (product, case) selection addressed by catalog codes — how the UI and
/// the services name a cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSelection {
    pub product_code: String,
    pub case_code: Option<String>,
}

impl LineSelection {
    /// Select a product with no case.
    #[must_use]
    pub fn product(code: &str) -> Self {
        Self {
            product_code: code.to_string(),
            case_code: None,
        }
    }

    /// Select a product with a case.
    #[must_use]
    pub fn with_case(product: &str, case: &str) -> Self {
        Self {
            product_code: product.to_string(),
            case_code: Some(case.to_string()),
        }
    }
}
