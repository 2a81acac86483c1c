//! Trinket storefront walkthrough.
//!
//! Seeds the demo catalog, fills a cart, spins the wheel for a one-time
//! offer, submits a checkout, and prints the receipt — one end-to-end pass
//! over the whole engine.

use std::{error::Error, sync::Arc};

use clap::Parser;
use jiff::Timestamp;
use rand::{SeedableRng, rngs::StdRng};
use rusty_money::Money;
use smallvec::SmallVec;
use trinket::{
    fixtures::{DEMO_CATALOG, load_catalog},
    receipt::{Receipt, ReceiptLine},
};
use trinket_app::{
    config::CheckoutConfig,
    domain::{
        carts::{CartsService, LocalCartsService, models::LineSelection},
        offers::{
            LocalOffersService, OffersService,
            sources::{OfferSource, spin_wheel},
        },
        orders::{
            LocalOrdersService, OrdersService,
            models::{CheckoutRequest, ShippingDetails},
            notifier::NoopNotifier,
        },
        shoppers::{LocalShoppersService, ShoppersService},
    },
    store::{DocumentStore, MemoryStore},
};

#[derive(Debug, Parser)]
#[command(name = "trinket-demo", about = "Walk one checkout through the Trinket engine", long_about = None)]
struct Cli {
    /// Destination pincode
    #[arg(long, default_value = "110001")]
    pincode: String,

    /// Add the gift-wrap add-on
    #[arg(long)]
    gift_wrap: bool,

    /// Seed for the spin-wheel draw
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let now = Timestamp::now();

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let bundle = Arc::new(load_catalog(DEMO_CATALOG)?);

    let carts = Arc::new(LocalCartsService::new(
        Arc::clone(&store),
        Arc::clone(&bundle),
    ));
    let shoppers = Arc::new(LocalShoppersService::new(Arc::clone(&store), Vec::new()));
    let offers = Arc::new(LocalOffersService::new(Arc::clone(&store)));

    let orders = LocalOrdersService::new(
        Arc::clone(&store),
        Arc::clone(&bundle),
        CheckoutConfig::default(),
        Arc::clone(&carts) as Arc<dyn CartsService>,
        Arc::clone(&shoppers) as Arc<dyn ShoppersService>,
        Arc::clone(&offers) as Arc<dyn OffersService>,
        Arc::new(NoopNotifier),
    );

    for _ in 0..2 {
        carts.add_item(&LineSelection::product("holo-cat")).await?;
        carts
            .add_item(&LineSelection::with_case("galaxy-keychain", "matte-black"))
            .await?;
    }
    carts.add_item(&LineSelection::product("chai-time")).await?;

    // Spin until the wheel pays out (or give up gracefully).
    let wheel = spin_wheel();
    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut won = None;

    for _ in 0..20 {
        if let Some(offer) = wheel.draw(&mut rng, now)? {
            won = Some(offer);
            break;
        }
    }

    match &won {
        Some(offer) => {
            offers.grant(offer.clone()).await?;
            println!("Spin wheel: won \"{}\"", offer.label);
        }
        None => println!("Spin wheel: no luck today"),
    }

    let request = CheckoutRequest {
        shipping: ShippingDetails {
            name: "Meera Joshi".to_string(),
            address: "14 Lakeview Road, Pune".to_string(),
            pincode: cli.pincode.clone(),
            phone: "9876543210".to_string(),
        },
        gift_wrap: cli.gift_wrap,
        offer: won.as_ref().map(|offer| offer.uuid),
        redemption: None,
    };

    let outcome = orders.submit_checkout(request, now).await?;
    let currency = bundle.catalog.currency();

    let lines: SmallVec<[ReceiptLine<'_>; 10]> = outcome
        .order
        .lines
        .iter()
        .map(|line| ReceiptLine {
            description: line.description.clone(),
            quantity: line.quantity,
            line_total: Money::from_minor(line.line_total, currency),
        })
        .collect();

    let receipt = Receipt::new(lines, outcome.order.quote.to_quote(currency));

    println!("{}", receipt.render());

    for notice in &outcome.notices {
        println!("note: {notice}");
    }

    println!(
        "Order {} placed — {} loyalty points earned.",
        outcome.order.uuid, outcome.order.quote.points_earned
    );

    Ok(())
}
