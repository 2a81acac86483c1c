//! Products
//!
//! The immutable storefront catalog: sticker and keychain products, plus the
//! case options selectable for keychains. Catalog entries are defined at
//! build time and never mutated afterwards; everything downstream (cart,
//! checkout) refers to them by key.

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Product Key
    pub struct ProductKey;

    /// Case Option Key
    pub struct CaseKey;
}

/// The kind of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    /// A printed sticker.
    Sticker,

    /// A keychain, customisable with a [`CaseOption`].
    Keychain,
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Display name
    pub name: String,

    /// Product kind
    pub kind: ProductKind,

    /// Free-form category tag, used for filtering only, never pricing
    pub category: String,

    /// Base price
    pub price: Money<'a, Currency>,

    /// Image reference
    pub image: String,

    /// Optional description
    pub description: Option<String>,

    /// Case options selectable for this product (keychains only)
    pub cases: Vec<CaseKey>,
}

/// A keychain case variant. Selecting a case never creates a new product;
/// the cart line carries the case key alongside the product key.
#[derive(Debug, Clone)]
pub struct CaseOption {
    /// Display name
    pub name: String,

    /// Case colour
    pub color: String,

    /// Signed amount added to the product's base price, in minor units
    pub price_modifier: i64,
}

/// The storefront catalog.
#[derive(Debug)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    cases: SlotMap<CaseKey, CaseOption>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog priced in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: SlotMap::with_key(),
            cases: SlotMap::with_key(),
            currency,
        }
    }

    /// Add a product to the catalog.
    pub fn add_product(&mut self, product: Product<'a>) -> ProductKey {
        self.products.insert(product)
    }

    /// Add a case option to the catalog.
    pub fn add_case(&mut self, case: CaseOption) -> CaseKey {
        self.cases.insert(case)
    }

    /// Look up a product.
    #[must_use]
    pub fn product(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Look up a case option.
    #[must_use]
    pub fn case(&self, key: CaseKey) -> Option<&CaseOption> {
        self.cases.get(key)
    }

    /// Unit price for a (product, case) selection: base price plus the case's
    /// price modifier, clamped at zero.
    ///
    /// Returns `None` when the product is absent, when the case is absent, or
    /// when the case is not one of the product's options — callers treat an
    /// unresolvable selection as a skipped line, never an error.
    #[must_use]
    pub fn unit_price(&self, product: ProductKey, case: Option<CaseKey>) -> Option<Money<'a, Currency>> {
        let product = self.products.get(product)?;

        let modifier = match case {
            None => 0,
            Some(case_key) => {
                if !product.cases.contains(&case_key) {
                    return None;
                }

                self.cases.get(case_key)?.price_modifier
            }
        };

        let minor = 0.max(product.price.to_minor_units() + modifier);

        Some(Money::from_minor(minor, self.currency))
    }

    /// Iterate over all products.
    pub fn products(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products.iter()
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// The currency all catalog prices are quoted in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;

    use super::*;

    fn sticker<'a>(name: &str, price_minor: i64) -> Product<'a> {
        Product {
            name: name.to_string(),
            kind: ProductKind::Sticker,
            category: "animals".to_string(),
            price: Money::from_minor(price_minor, INR),
            image: format!("stickers/{name}.png"),
            description: None,
            cases: Vec::new(),
        }
    }

    #[test]
    fn unit_price_without_case_is_base_price() {
        let mut catalog = Catalog::new(INR);
        let key = catalog.add_product(sticker("holo-cat", 4900));

        assert_eq!(
            catalog.unit_price(key, None),
            Some(Money::from_minor(4900, INR))
        );
    }

    #[test]
    fn unit_price_applies_case_modifier() {
        let mut catalog = Catalog::new(INR);

        let case = catalog.add_case(CaseOption {
            name: "Matte Black".to_string(),
            color: "#111111".to_string(),
            price_modifier: 1000,
        });

        let mut keychain = sticker("galaxy", 19900);
        keychain.kind = ProductKind::Keychain;
        keychain.cases = vec![case];
        let key = catalog.add_product(keychain);

        assert_eq!(
            catalog.unit_price(key, Some(case)),
            Some(Money::from_minor(20900, INR))
        );
    }

    #[test]
    fn unit_price_clamps_negative_modifier_at_zero() {
        let mut catalog = Catalog::new(INR);

        let case = catalog.add_case(CaseOption {
            name: "Promo".to_string(),
            color: "#ffffff".to_string(),
            price_modifier: -5000,
        });

        let mut keychain = sticker("budget", 900);
        keychain.kind = ProductKind::Keychain;
        keychain.cases = vec![case];
        let key = catalog.add_product(keychain);

        assert_eq!(
            catalog.unit_price(key, Some(case)),
            Some(Money::from_minor(0, INR))
        );
    }

    #[test]
    fn unit_price_missing_product_is_none() {
        let catalog = Catalog::new(INR);

        assert_eq!(catalog.unit_price(ProductKey::default(), None), None);
    }

    #[test]
    fn unit_price_case_not_offered_for_product_is_none() {
        let mut catalog = Catalog::new(INR);

        let unrelated_case = catalog.add_case(CaseOption {
            name: "Clear".to_string(),
            color: "#eeeeee".to_string(),
            price_modifier: 500,
        });

        let key = catalog.add_product(sticker("holo-cat", 4900));

        assert_eq!(catalog.unit_price(key, Some(unrelated_case)), None);
    }

    #[test]
    fn len_and_is_empty() {
        let mut catalog = Catalog::new(INR);

        assert!(catalog.is_empty());

        catalog.add_product(sticker("one", 100));
        catalog.add_product(sticker("two", 200));

        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());
    }
}
