//! Receipt
//!
//! Renders a priced checkout as a terminal table: one row per order line,
//! then the breakdown rows from the [`Quote`]. Zero-valued adjustment rows
//! are omitted so the receipt only shows what actually moved the total.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::checkout::Quote;

/// One rendered order line.
#[derive(Debug, Clone)]
pub struct ReceiptLine<'a> {
    /// Display description, e.g. "Galaxy Keychain (Matte Black)".
    pub description: String,

    /// Units purchased.
    pub quantity: u32,

    /// Unit price × quantity.
    pub line_total: Money<'a, Currency>,
}

/// Final receipt for a priced checkout.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: SmallVec<[ReceiptLine<'a>; 10]>,
    quote: Quote<'a>,
}

impl<'a> Receipt<'a> {
    /// Create a receipt from resolved lines and their quote.
    #[must_use]
    pub fn new(lines: impl Into<SmallVec<[ReceiptLine<'a>; 10]>>, quote: Quote<'a>) -> Self {
        Self {
            lines: lines.into(),
            quote,
        }
    }

    /// The order lines.
    #[must_use]
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// The quote the receipt was built from.
    #[must_use]
    pub fn quote(&self) -> &Quote<'a> {
        &self.quote
    }

    /// Render the receipt as a table.
    #[must_use]
    pub fn render(&self) -> String {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Amount"]);

        for line in &self.lines {
            builder.push_record([
                line.description.clone(),
                line.quantity.to_string(),
                line.line_total.to_string(),
            ]);
        }

        builder.push_record([
            "Subtotal".to_string(),
            String::new(),
            self.quote.subtotal.to_string(),
        ]);

        if self.quote.gift_wrap_fee.to_minor_units() != 0 {
            builder.push_record([
                "Gift wrap".to_string(),
                String::new(),
                self.quote.gift_wrap_fee.to_string(),
            ]);
        }

        if self.quote.offer_discount.to_minor_units() != 0 {
            builder.push_record([
                "Offer discount".to_string(),
                String::new(),
                format!("-{}", self.quote.offer_discount),
            ]);
        }

        if self.quote.loyalty_discount.to_minor_units() != 0 {
            builder.push_record([
                "Loyalty discount".to_string(),
                String::new(),
                format!("-{}", self.quote.loyalty_discount),
            ]);
        }

        let delivery = if self.quote.delivery_fee.to_minor_units() == 0 {
            "Free".to_string()
        } else {
            self.quote.delivery_fee.to_string()
        };

        builder.push_record(["Delivery".to_string(), String::new(), delivery]);

        builder.push_record([
            "Total".to_string(),
            String::new(),
            self.quote.final_total.to_string(),
        ]);

        let mut table = builder.build();
        table.with(Style::rounded());
        table.modify(Columns::last(), Alignment::right());

        let mut rendered = table.to_string();

        if self.quote.bundle_offer_eligible {
            rendered.push_str("\nBundle offer unlocked: 5 free stickers ship with this order.");
        }

        rendered
    }
}
