//! Cart
//!
//! The cart aggregate: an ordered collection of lines, each a
//! (product, case) pairing with a quantity and an optional customisation
//! note. All pricing derives from here. Every operation is total — malformed
//! input degrades to a no-op, never a panic — and derived queries skip lines
//! whose product no longer resolves in the catalog.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::products::{CaseKey, Catalog, ProductKey, ProductKind};

/// Keychain units required in a cart before the sticker bundle offer unlocks.
pub const KEYCHAIN_BUNDLE_THRESHOLD: u64 = 2;

/// One (product, case) pairing with a quantity inside a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    product: ProductKey,
    case: Option<CaseKey>,
    quantity: u32,
    note: Option<String>,
}

impl CartLine {
    /// The product this line refers to.
    #[must_use]
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// The selected case option, if any.
    #[must_use]
    pub fn case(&self) -> Option<CaseKey> {
        self.case
    }

    /// Units of this selection in the cart.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The free-text customisation note, if any.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    fn matches(&self, product: ProductKey, case: Option<CaseKey>) -> bool {
        self.product == product && self.case == case
    }
}

/// The cart: an ordered collection of [`CartLine`]s owned by one session.
///
/// Invariant: at most one line exists per distinct (product, case) pair —
/// re-adding an already-present pair increments its quantity instead of
/// appending a duplicate line.
#[derive(Debug, Default)]
pub struct Cart {
    lines: SmallVec<[CartLine; 8]>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of a (product, case) selection.
    ///
    /// Merges into the existing line for the pair if present, otherwise
    /// appends a new line with quantity 1. Always succeeds.
    pub fn add_line(&mut self, product: ProductKey, case: Option<CaseKey>) {
        if let Some(line) = self.line_mut(product, case) {
            line.quantity = line.quantity.saturating_add(1);
            return;
        }

        self.lines.push(CartLine {
            product,
            case,
            quantity: 1,
            note: None,
        });
    }

    /// Remove the line for a (product, case) selection.
    ///
    /// A silent no-op when no such line exists.
    pub fn remove_line(&mut self, product: ProductKey, case: Option<CaseKey>) {
        self.lines.retain(|line| !line.matches(product, case));
    }

    /// Overwrite the quantity of the line for a (product, case) selection.
    ///
    /// A quantity of zero or less behaves as [`Cart::remove_line`]. Setting a
    /// quantity on an absent line is a no-op. Quantity is not validated
    /// against any stock ceiling at this layer.
    pub fn set_quantity(&mut self, product: ProductKey, case: Option<CaseKey>, quantity: i64) {
        if quantity <= 0 {
            self.remove_line(product, case);
            return;
        }

        if let Some(line) = self.line_mut(product, case) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
    }

    /// Attach (or clear) the customisation note on a line.
    ///
    /// A no-op when no such line exists.
    pub fn set_note(&mut self, product: ProductKey, case: Option<CaseKey>, note: Option<String>) {
        if let Some(line) = self.line_mut(product, case) {
            line.note = note;
        }
    }

    /// Empty the cart. Called once, immediately after a successful checkout.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Drop lines whose selection no longer resolves in the catalog.
    pub fn prune(&mut self, catalog: &Catalog<'_>) {
        self.lines
            .retain(|line| catalog.unit_price(line.product, line.case).is_some());
    }

    /// Iterate over the lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// The cart subtotal: Σ unit price × quantity over resolvable lines.
    ///
    /// Lines whose selection does not resolve in the catalog are skipped.
    /// An empty cart totals zero.
    #[must_use]
    pub fn subtotal<'a>(&self, catalog: &Catalog<'a>) -> Money<'a, Currency> {
        let minor: i64 = self
            .lines
            .iter()
            .filter_map(|line| {
                catalog
                    .unit_price(line.product, line.case)
                    .map(|price| price.to_minor_units() * i64::from(line.quantity))
            })
            .sum();

        Money::from_minor(minor, catalog.currency())
    }

    /// Total keychain units in the cart.
    #[must_use]
    pub fn keychain_unit_count(&self, catalog: &Catalog<'_>) -> u64 {
        self.lines
            .iter()
            .filter(|line| {
                catalog
                    .product(line.product)
                    .is_some_and(|product| product.kind == ProductKind::Keychain)
            })
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    /// Whether the keychain bundle offer ("buy 2 keychains, get 5 stickers
    /// free") has unlocked.
    #[must_use]
    pub fn bundle_offer_eligible(&self, catalog: &Catalog<'_>) -> bool {
        self.keychain_unit_count(catalog) >= KEYCHAIN_BUNDLE_THRESHOLD
    }

    fn line_mut(&mut self, product: ProductKey, case: Option<CaseKey>) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.matches(product, case))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;

    use crate::products::{CaseOption, Product};

    use super::*;

    struct Fixture<'a> {
        catalog: Catalog<'a>,
        sticker: ProductKey,
        keychain: ProductKey,
        case: CaseKey,
    }

    fn fixture<'a>() -> Fixture<'a> {
        let mut catalog = Catalog::new(INR);

        let sticker = catalog.add_product(Product {
            name: "Holographic Cat".to_string(),
            kind: ProductKind::Sticker,
            category: "animals".to_string(),
            price: Money::from_minor(10000, INR),
            image: "stickers/holo-cat.png".to_string(),
            description: None,
            cases: Vec::new(),
        });

        let case = catalog.add_case(CaseOption {
            name: "Matte Black".to_string(),
            color: "#111111".to_string(),
            price_modifier: 1000,
        });

        let keychain = catalog.add_product(Product {
            name: "Galaxy Keychain".to_string(),
            kind: ProductKind::Keychain,
            category: "space".to_string(),
            price: Money::from_minor(11000, INR),
            image: "keychains/galaxy.png".to_string(),
            description: Some("Glow in the dark".to_string()),
            cases: vec![case],
        });

        Fixture {
            catalog,
            sticker,
            keychain,
            case,
        }
    }

    #[test]
    fn re_adding_the_same_pair_merges_into_one_line() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.add_line(f.sticker, None);
        cart.add_line(f.sticker, None);
        cart.add_line(f.sticker, None);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.unit_count(), 3);
    }

    #[test]
    fn distinct_case_selections_get_distinct_lines() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.add_line(f.keychain, None);
        cart.add_line(f.keychain, Some(f.case));

        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn subtotal_is_zero_for_empty_cart() {
        let f = fixture();
        let cart = Cart::new();

        assert_eq!(cart.subtotal(&f.catalog), Money::from_minor(0, INR));
    }

    #[test]
    fn subtotal_sums_unit_price_times_quantity() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.add_line(f.sticker, None);
        cart.add_line(f.sticker, None);
        cart.add_line(f.keychain, Some(f.case));
        cart.add_line(f.keychain, Some(f.case));

        // 2 × 10000 + 2 × (11000 + 1000)
        assert_eq!(cart.subtotal(&f.catalog), Money::from_minor(44000, INR));
    }

    #[test]
    fn subtotal_grows_with_quantity_and_shrinks_on_removal() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.add_line(f.sticker, None);
        let one = cart.subtotal(&f.catalog).to_minor_units();

        cart.add_line(f.sticker, None);
        let two = cart.subtotal(&f.catalog).to_minor_units();

        assert!(two > one, "subtotal must grow as quantity grows");

        cart.remove_line(f.sticker, None);

        assert_eq!(cart.subtotal(&f.catalog).to_minor_units(), 0);
    }

    #[test]
    fn set_quantity_overwrites() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.add_line(f.sticker, None);
        cart.set_quantity(f.sticker, None, 5);

        assert_eq!(cart.unit_count(), 5);
    }

    #[test]
    fn set_quantity_zero_or_negative_removes_the_line() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.add_line(f.sticker, None);
        cart.set_quantity(f.sticker, None, 0);

        assert!(cart.is_empty());

        cart.add_line(f.sticker, None);
        cart.set_quantity(f.sticker, None, -3);

        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_on_absent_line_is_a_no_op() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.set_quantity(f.sticker, None, 4);

        assert!(cart.is_empty());
    }

    #[test]
    fn remove_line_on_absent_line_is_a_no_op() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.add_line(f.sticker, None);
        cart.remove_line(f.keychain, None);

        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn set_note_attaches_and_clears() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.add_line(f.keychain, Some(f.case));
        cart.set_note(f.keychain, Some(f.case), Some("engrave: MJ".to_string()));

        assert_eq!(
            cart.iter().next().and_then(CartLine::note),
            Some("engrave: MJ")
        );

        cart.set_note(f.keychain, Some(f.case), None);

        assert_eq!(cart.iter().next().and_then(CartLine::note), None);
    }

    #[test]
    fn bundle_eligibility_unlocks_at_two_keychain_units() {
        let f = fixture();
        let mut cart = Cart::new();

        assert!(!cart.bundle_offer_eligible(&f.catalog));

        cart.add_line(f.keychain, None);
        assert_eq!(cart.keychain_unit_count(&f.catalog), 1);
        assert!(!cart.bundle_offer_eligible(&f.catalog));

        cart.add_line(f.keychain, Some(f.case));
        assert_eq!(cart.keychain_unit_count(&f.catalog), 2);
        assert!(cart.bundle_offer_eligible(&f.catalog));
    }

    #[test]
    fn stickers_never_count_towards_bundle_eligibility() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.add_line(f.sticker, None);
        cart.set_quantity(f.sticker, None, 10);

        assert_eq!(cart.keychain_unit_count(&f.catalog), 0);
        assert!(!cart.bundle_offer_eligible(&f.catalog));
    }

    #[test]
    fn unresolvable_lines_are_skipped_in_derived_queries() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.add_line(f.sticker, None);
        cart.add_line(ProductKey::default(), None);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal(&f.catalog), Money::from_minor(10000, INR));
    }

    #[test]
    fn prune_drops_unresolvable_lines() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.add_line(f.sticker, None);
        cart.add_line(ProductKey::default(), None);

        cart.prune(&f.catalog);

        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn clear_empties_all_lines() {
        let f = fixture();
        let mut cart = Cart::new();

        cart.add_line(f.sticker, None);
        cart.add_line(f.keychain, None);
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(&f.catalog), Money::from_minor(0, INR));
    }
}
