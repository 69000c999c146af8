//! Basket Aggregates
//!
//! Pure pricing of a set of basket lines. Nothing here reads or writes basket state, so
//! the same lines, offers and delivery rules always produce the same aggregates.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    basket::BasketLine,
    delivery::{AppliedDeliveryRule, DeliveryRules},
    offers::{Offer, find_offer},
    pricing::{PricingError, line_price, sum},
    products::Product,
};

/// Savings made on one basket line by an offer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductDiscount<'a> {
    /// Discounted product
    pub product: &'a Product<'a>,

    /// `price × quantity` before the offer
    pub original: Money<'a, Currency>,

    /// Line total charged with the offer
    pub discounted: Money<'a, Currency>,

    /// `original - discounted`
    pub savings: Money<'a, Currency>,

    /// Display text of the offer that applied
    pub offer_text: &'a str,
}

/// Price of a single basket line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePricing<'a> {
    /// `price × quantity`
    pub original: Money<'a, Currency>,

    /// What the customer pays for the line
    pub charged: Money<'a, Currency>,

    /// Present when an offer applied to the line
    pub discount: Option<ProductDiscount<'a>>,
}

/// Everything a basket reports, computed in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates<'a> {
    /// Sum of `price × quantity` over all lines, before offers
    pub subtotal: Money<'a, Currency>,

    /// Total saved by offers
    pub discounts: Money<'a, Currency>,

    /// `subtotal - discounts`; selects the delivery tier
    pub discounted_subtotal: Money<'a, Currency>,

    /// Delivery charge for the discounted subtotal
    pub delivery_cost: Money<'a, Currency>,

    /// Delivery tier the discounted subtotal resolved to
    pub delivery_rule: Option<AppliedDeliveryRule<'a>>,

    /// `discounted_subtotal + delivery_cost`
    pub total: Money<'a, Currency>,

    /// Per-line savings, in basket order, for lines an offer applied to
    pub product_discounts: SmallVec<[ProductDiscount<'a>; 4]>,
}

/// Price one line, applying the first offer that targets its product.
///
/// # Errors
///
/// Returns a [`PricingError`] if a line total overflows or mixes currencies.
pub fn price_line<'a>(
    line: &BasketLine<'a>,
    offers: &'a [Box<dyn Offer>],
) -> Result<LinePricing<'a>, PricingError> {
    let product = line.product();
    let original = line_price(&product.price, line.quantity())?;

    let Some(offer) = find_offer(offers, &product.code) else {
        return Ok(LinePricing {
            original,
            charged: original,
            discount: None,
        });
    };

    let discounted = offer.apply(product, line.quantity())?;
    let savings = original.sub(discounted)?;

    Ok(LinePricing {
        original,
        charged: discounted,
        discount: Some(ProductDiscount {
            product,
            original,
            discounted,
            savings,
            offer_text: offer.display_text(),
        }),
    })
}

/// Per-line savings for every line an offer applies to, in basket order.
///
/// # Errors
///
/// Returns a [`PricingError`] if any line cannot be priced.
pub fn product_discounts<'a>(
    lines: &[BasketLine<'a>],
    offers: &'a [Box<dyn Offer>],
) -> Result<SmallVec<[ProductDiscount<'a>; 4]>, PricingError> {
    let mut discounts = SmallVec::new();

    for line in lines {
        if let Some(discount) = price_line(line, offers)?.discount {
            discounts.push(discount);
        }
    }

    Ok(discounts)
}

/// Compute every basket aggregate from its lines.
///
/// # Errors
///
/// Returns a [`PricingError`] if any amount overflows or mixes currencies.
pub fn compute<'a>(
    lines: &[BasketLine<'a>],
    offers: &'a [Box<dyn Offer>],
    delivery_rules: &DeliveryRules<'a>,
) -> Result<Aggregates<'a>, PricingError> {
    let currency = delivery_rules.currency();

    let priced = lines
        .iter()
        .map(|line| price_line(line, offers))
        .collect::<Result<SmallVec<[LinePricing<'a>; 8]>, _>>()?;

    let product_discounts: SmallVec<[ProductDiscount<'a>; 4]> =
        priced.iter().filter_map(|pricing| pricing.discount).collect();

    let subtotal = sum(currency, priced.iter().map(|pricing| pricing.original))?;
    let discounts = sum(
        currency,
        product_discounts.iter().map(|discount| discount.savings),
    )?;

    let discounted_subtotal = subtotal.sub(discounts)?;
    let delivery_cost = delivery_rules.cost(&discounted_subtotal);
    let delivery_rule = delivery_rules.applied_rule(&discounted_subtotal);
    let total = discounted_subtotal.add(delivery_cost)?;

    debug!(
        lines = lines.len(),
        %subtotal,
        %discounts,
        %delivery_cost,
        %total,
        "computed basket aggregates"
    );

    Ok(Aggregates {
        subtotal,
        discounts,
        discounted_subtotal,
        delivery_cost,
        delivery_rule,
        total,
        product_discounts,
    })
}
