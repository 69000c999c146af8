//! Receipt

use std::io;

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    basket::{Basket, BasketError},
    delivery::DeliveryMessage,
    pricing::{PricingError, line_price},
    products::Product,
};

/// Title printed above every receipt unless overridden.
pub const DEFAULT_TITLE: &str = "Acme Widget Co - Sales Receipt";

/// Closing line of every receipt.
pub const THANK_YOU: &str = "Thank you for your purchase!";

/// Delivery label used when the tier carries no message.
pub const STANDARD_DELIVERY: &str = "Standard delivery";

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Basket totals could not be computed.
    #[error(transparent)]
    Basket(#[from] BasketError),

    /// A line total could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One printed line of the receipt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Product on the line
    pub product: &'a Product<'a>,

    /// Units bought
    pub quantity: u32,

    /// `price × quantity` before offers
    pub line_total: Money<'a, Currency>,

    /// Offer savings on the line, when an offer saved anything
    pub discount: Option<Money<'a, Currency>>,

    /// Text of the offer that applied
    pub offer_text: Option<&'a str>,
}

/// Final receipt for a basket.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    title: String,
    lines: SmallVec<[ReceiptLine<'a>; 8]>,
    subtotal: Money<'a, Currency>,
    savings: Money<'a, Currency>,
    delivery_cost: Money<'a, Currency>,
    delivery_message: Option<DeliveryMessage>,
    total: Money<'a, Currency>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a basket, computing its totals if needed.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the basket totals cannot be computed.
    pub fn from_basket(basket: &Basket<'a>) -> Result<Self, ReceiptError> {
        let aggregates = basket.aggregates()?;

        let lines = basket
            .items()
            .iter()
            .map(|line| {
                let product = line.product();

                let discount = aggregates
                    .product_discounts
                    .iter()
                    .find(|discount| discount.product.code == product.code)
                    .filter(|discount| discount.savings.is_positive());

                Ok(ReceiptLine {
                    product,
                    quantity: line.quantity(),
                    line_total: line_price(&product.price, line.quantity())?,
                    discount: discount.map(|discount| discount.savings),
                    offer_text: discount.map(|discount| discount.offer_text),
                })
            })
            .collect::<Result<SmallVec<_>, ReceiptError>>()?;

        Ok(Receipt {
            title: DEFAULT_TITLE.to_string(),
            lines,
            subtotal: aggregates.subtotal,
            savings: aggregates.discounts,
            delivery_cost: aggregates.delivery_cost,
            delivery_message: aggregates.delivery_rule.and_then(|rule| rule.message),
            total: aggregates.total,
        })
    }

    /// Replace the title line.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Title line
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Printed lines, in basket order
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Total before offers
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Total saved by offers
    pub fn savings(&self) -> Money<'a, Currency> {
        self.savings
    }

    /// Delivery charge
    pub fn delivery_cost(&self) -> Money<'a, Currency> {
        self.delivery_cost
    }

    /// Label shown next to the delivery charge.
    pub fn delivery_label(&self) -> &'static str {
        self.delivery_message
            .map_or(STANDARD_DELIVERY, DeliveryMessage::as_str)
    }

    /// Amount due
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Write the receipt as a table followed by its totals.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        writeln!(out, "{}", self.title).map_err(|_err| ReceiptError::IO)?;

        let mut builder = Builder::default();

        builder.push_record([
            "Code",
            "Item",
            "Qty",
            "Unit Price",
            "Line Total",
            "Discount",
            "Offer",
        ]);

        for line in &self.lines {
            builder.push_record([
                line.product.code.clone(),
                line.product.name.clone(),
                line.quantity.to_string(),
                line.product.price.to_string(),
                line.line_total.to_string(),
                line.discount
                    .map(|discount| format!("-{discount}"))
                    .unwrap_or_default(),
                line.offer_text.unwrap_or_default().to_string(),
            ]);
        }

        write_receipt_table(&mut out, builder)?;
        write_receipt_summary(&mut out, self)?;

        writeln!(out, "\n{THANK_YOU}").map_err(|_err| ReceiptError::IO)
    }
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..6), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
) -> Result<(), ReceiptError> {
    let delivery_label = format!("Delivery ({}):", receipt.delivery_label());

    let mut rows: SmallVec<[(String, String); 4]> = SmallVec::new();

    rows.push(("Subtotal:".to_string(), receipt.subtotal().to_string()));

    if receipt.savings().is_positive() {
        rows.push(("Offer Savings:".to_string(), format!("-{}", receipt.savings())));
    }

    rows.push((delivery_label, receipt.delivery_cost().to_string()));
    rows.push(("Total:".to_string(), receipt.total().to_string()));

    let label_width = rows
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or_default();

    let value_width = rows
        .iter()
        .map(|(_, value)| value.chars().count())
        .max()
        .unwrap_or_default();

    for (label, value) in &rows {
        writeln!(out, " {label:>label_width$}  {value:>value_width$}")
            .map_err(|_err| ReceiptError::IO)?;
    }

    Ok(())
}
