//! Integration test driving the full pricing pipeline over the demo catalog:
//! cart aggregation → tier resolution → quote → receipt.
//!
//! The walkthrough mirrors the storefront's canonical example: two ₹49
//! stickers and two cased Galaxy Keychains, priced for a Silver shopper with
//! no promotional offer. The keychain units unlock the bundle offer, the
//! discounted amount lands just under the free-delivery threshold, and the
//! receipt renders every row that moved the total.

use rusty_money::{Money, iso::INR};
use smallvec::SmallVec;
use testresult::TestResult;

use trinket::{
    cart::Cart,
    checkout::{CheckoutInputs, quote},
    delivery::DeliveryRule,
    fixtures::{DEMO_CATALOG, load_catalog},
    loyalty::tier_for_points,
    receipt::{Receipt, ReceiptLine},
};

#[test]
fn silver_shopper_checkout_over_the_demo_catalog() -> TestResult {
    let bundle = load_catalog(DEMO_CATALOG)?;

    let sticker = bundle.product("holo-cat").ok_or("missing sticker")?;
    let keychain = bundle.product("galaxy-keychain").ok_or("missing keychain")?;
    let case = bundle.case("matte-black").ok_or("missing case")?;

    let mut cart = Cart::new();
    cart.add_line(sticker, None);
    cart.add_line(sticker, None);
    cart.add_line(keychain, Some(case));
    cart.add_line(keychain, Some(case));

    // 2 × ₹49 + 2 × (₹199 + ₹10)
    let subtotal = cart.subtotal(&bundle.catalog);
    assert_eq!(subtotal, Money::from_minor(51600, INR));
    assert!(cart.bundle_offer_eligible(&bundle.catalog), "two keychain units");

    let tier = tier_for_points(600);
    assert_eq!(tier.discount_percent, 5, "600 points resolves to Silver");

    let inputs = CheckoutInputs {
        subtotal,
        gift_wrap_fee: None,
        offer_percent: None,
        loyalty_percent: tier.discount(),
        pincode: "110001",
        bundle_offer_eligible: cart.bundle_offer_eligible(&bundle.catalog),
    };

    let rule = DeliveryRule::default();
    let quote = quote(&inputs, &rule, rule.base_fee)?;

    // 5% of ₹516 is ₹25.80; ₹490.20 sits below the ₹499 threshold, so the
    // base delivery fee applies.
    assert_eq!(quote.loyalty_discount, Money::from_minor(2580, INR));
    assert_eq!(quote.amount_after_discounts, Money::from_minor(49020, INR));
    assert_eq!(quote.delivery_fee, Money::from_minor(4900, INR));
    assert_eq!(quote.final_total, Money::from_minor(53920, INR));
    assert_eq!(quote.points_earned, 53);

    let lines: SmallVec<[ReceiptLine<'_>; 10]> = cart
        .iter()
        .filter_map(|line| {
            let product = bundle.catalog.product(line.product())?;
            let unit = bundle.catalog.unit_price(line.product(), line.case())?;

            Some(ReceiptLine {
                description: product.name.clone(),
                quantity: line.quantity(),
                line_total: Money::from_minor(
                    unit.to_minor_units() * i64::from(line.quantity()),
                    INR,
                ),
            })
        })
        .collect();

    let receipt = Receipt::new(lines, quote);
    let rendered = receipt.render();

    assert!(rendered.contains("Holographic Cat"), "sticker line rendered");
    assert!(rendered.contains("Galaxy Keychain"), "keychain line rendered");
    assert!(rendered.contains("Loyalty discount"), "rebate row rendered");
    assert!(
        rendered.contains("Bundle offer unlocked"),
        "bundle note rendered"
    );

    Ok(())
}

#[test]
fn clearing_the_cart_after_checkout_zeroes_every_derived_value() -> TestResult {
    let bundle = load_catalog(DEMO_CATALOG)?;
    let keychain = bundle.product("boba-buddy-keychain").ok_or("missing product")?;

    let mut cart = Cart::new();
    cart.add_line(keychain, None);
    cart.add_line(keychain, None);

    assert!(cart.bundle_offer_eligible(&bundle.catalog), "eligible before clear");

    cart.clear();

    assert!(cart.is_empty());
    assert_eq!(cart.subtotal(&bundle.catalog), Money::from_minor(0, INR));
    assert!(!cart.bundle_offer_eligible(&bundle.catalog));

    Ok(())
}
