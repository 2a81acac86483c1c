//! Fixtures
//!
//! YAML catalog loading for tests and the demo. A fixture maps stable
//! product and case codes (unique across the file) to catalog entries; the
//! returned bundle keeps both directions of the code↔key mapping so session
//! state can reference products by code and survive catalog rebuilds.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::iso::{Currency, EUR, INR, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::products::{CaseKey, CaseOption, Catalog, Product, ProductKey, ProductKind};

/// The storefront's demo catalog.
pub const DEMO_CATALOG: &str = include_str!("../fixtures/catalog.yml");

/// Errors raised while loading a catalog fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// The YAML could not be parsed.
    #[error(transparent)]
    Parse(#[from] serde_norway::Error),

    /// A price string was not in the form "AMOUNT CURRENCY".
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// A price named a currency code that is not a known ISO code.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    /// A price's currency differs from the catalog currency.
    #[error("currency {0} does not match the catalog currency")]
    CurrencyMismatch(String),
}

/// Wrapper for a whole catalog in YAML.
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// ISO code all prices must be quoted in.
    pub currency: String,

    /// Map of product code → product fixture.
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product fixture.
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Display name.
    pub name: String,

    /// Product kind.
    pub kind: ProductKind,

    /// Category tag.
    pub category: String,

    /// Price string, e.g. "199 INR".
    pub price: String,

    /// Image reference.
    pub image: String,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,

    /// Map of case code → case fixture (keychains only).
    #[serde(default)]
    pub cases: FxHashMap<String, CaseFixture>,
}

/// Case option fixture.
#[derive(Debug, Deserialize)]
pub struct CaseFixture {
    /// Display name.
    pub name: String,

    /// Case colour.
    pub color: String,

    /// Signed price modifier string, e.g. "10 INR" or "-5 INR".
    pub modifier: String,
}

/// A loaded catalog plus the code↔key maps session state resolves through.
#[derive(Debug)]
pub struct CatalogBundle {
    /// The catalog itself.
    pub catalog: Catalog<'static>,

    /// Product code → key.
    pub product_by_code: FxHashMap<String, ProductKey>,

    /// Product key → code.
    pub code_by_product: FxHashMap<ProductKey, String>,

    /// Case code → key.
    pub case_by_code: FxHashMap<String, CaseKey>,

    /// Case key → code.
    pub code_by_case: FxHashMap<CaseKey, String>,
}

impl CatalogBundle {
    /// Resolve a product code.
    #[must_use]
    pub fn product(&self, code: &str) -> Option<ProductKey> {
        self.product_by_code.get(code).copied()
    }

    /// Resolve a case code.
    #[must_use]
    pub fn case(&self, code: &str) -> Option<CaseKey> {
        self.case_by_code.get(code).copied()
    }
}

/// Load a catalog bundle from YAML.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the YAML cannot be parsed, a price string
/// is malformed, or a price is quoted in the wrong currency.
pub fn load_catalog(yaml: &str) -> Result<CatalogBundle, FixtureError> {
    let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

    let currency = currency_for_code(&fixture.currency)?;

    let mut catalog = Catalog::new(currency);
    let mut product_by_code = FxHashMap::default();
    let mut code_by_product = FxHashMap::default();
    let mut case_by_code = FxHashMap::default();
    let mut code_by_case = FxHashMap::default();

    for (code, product) in fixture.products {
        let price_minor = parse_amount(&product.price, currency)?;

        let mut cases = Vec::with_capacity(product.cases.len());

        for (case_code, case) in product.cases {
            let modifier = parse_amount(&case.modifier, currency)?;

            let case_key = catalog.add_case(CaseOption {
                name: case.name,
                color: case.color,
                price_modifier: modifier,
            });

            cases.push(case_key);
            case_by_code.insert(case_code.clone(), case_key);
            code_by_case.insert(case_key, case_code);
        }

        let product_key = catalog.add_product(Product {
            name: product.name,
            kind: product.kind,
            category: product.category,
            price: rusty_money::Money::from_minor(price_minor, currency),
            image: product.image,
            description: product.description,
            cases,
        });

        product_by_code.insert(code.clone(), product_key);
        code_by_product.insert(product_key, code);
    }

    Ok(CatalogBundle {
        catalog,
        product_by_code,
        code_by_product,
        case_by_code,
        code_by_case,
    })
}

/// Parse a signed "AMOUNT CURRENCY" string into minor units of the expected
/// currency.
fn parse_amount(raw: &str, expected: &'static Currency) -> Result<i64, FixtureError> {
    let mut parts = raw.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(raw.to_string()));
    };

    let currency = currency_for_code(code)?;

    if currency != expected {
        return Err(FixtureError::CurrencyMismatch(code.to_string()));
    }

    let amount = amount
        .parse::<Decimal>()
        .map_err(|err| FixtureError::InvalidPrice(format!("{raw}: {err}")))?;

    amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(raw.to_string()))
}

fn currency_for_code(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "INR" => Ok(INR),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
