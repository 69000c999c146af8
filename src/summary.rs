//! Basket Summary
//!
//! Serializable snapshot of a basket's totals, shaped for JSON consumers. Amounts are
//! emitted as plain numbers in major units (`32.95`, not `"$32.95"`).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Serialize;

use crate::{
    basket::{Basket, BasketError},
    delivery::AppliedDeliveryRule,
    offers::find_offer,
    pricing::line_price,
};

/// Totals, delivery and per-line detail for a basket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketSummary {
    /// Sum of line totals before offers
    #[serde(serialize_with = "amount::serialize")]
    pub subtotal: Decimal,

    /// Total saved by offers
    #[serde(serialize_with = "amount::serialize")]
    pub discounts: Decimal,

    /// Delivery charge
    #[serde(serialize_with = "amount::serialize")]
    pub delivery_cost: Decimal,

    /// Delivery tier the basket resolved to
    pub delivery_rule: Option<DeliveryRuleSummary>,

    /// Amount due
    #[serde(serialize_with = "amount::serialize")]
    pub total: Decimal,

    /// Offer state keyed by product code, for basket lines an offer targets
    pub applied_offers: BTreeMap<String, AppliedOfferSummary>,

    /// Basket lines in the order they were first added
    pub items: Vec<LineSummary>,
}

/// A resolved delivery tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRuleSummary {
    /// Exclusive upper bound, `null` for the unbounded tier
    #[serde(serialize_with = "amount::serialize_option")]
    pub limit: Option<Decimal>,

    /// Charge for the tier
    #[serde(serialize_with = "amount::serialize")]
    pub cost: Decimal,

    /// Customer-facing message, `null` for standard delivery
    pub message: Option<String>,
}

/// Offer state for one basket line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedOfferSummary {
    /// Whether the offer saved anything on this line
    pub has_offer: bool,

    /// Amount saved on the line
    #[serde(serialize_with = "amount::serialize")]
    pub discount: Decimal,

    /// Promotional text of the offer
    pub display_text: String,
}

/// One basket line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSummary {
    /// Product code
    pub code: String,

    /// Product name
    pub name: String,

    /// Units in the basket
    pub quantity: u32,

    /// Catalog price of one unit
    #[serde(serialize_with = "amount::serialize")]
    pub unit_price: Decimal,

    /// `unit_price × quantity`, before offers
    #[serde(serialize_with = "amount::serialize")]
    pub line_total: Decimal,
}

impl From<&AppliedDeliveryRule<'_>> for DeliveryRuleSummary {
    fn from(rule: &AppliedDeliveryRule<'_>) -> Self {
        DeliveryRuleSummary {
            limit: rule.limit.amount().map(|limit| to_decimal(&limit)),
            cost: to_decimal(&rule.cost),
            message: rule.message.map(|message| message.as_str().to_string()),
        }
    }
}

impl BasketSummary {
    /// Summarise a basket, computing its totals if needed.
    ///
    /// # Errors
    ///
    /// Returns a [`BasketError`] if the basket totals cannot be computed.
    pub fn from_basket(basket: &Basket<'_>) -> Result<Self, BasketError> {
        let aggregates = basket.aggregates()?;

        let mut applied_offers = BTreeMap::new();

        for line in basket.items() {
            let product = line.product();

            if let Some(offer) = find_offer(basket.offers(), &product.code) {
                let savings = aggregates
                    .product_discounts
                    .iter()
                    .find(|discount| discount.product.code == product.code)
                    .map_or(0, |discount| discount.savings.to_minor_units());

                applied_offers.insert(
                    product.code.clone(),
                    AppliedOfferSummary {
                        has_offer: savings > 0,
                        discount: minor_to_decimal(savings, basket.currency()),
                        display_text: offer.display_text().to_string(),
                    },
                );
            }
        }

        let items = basket
            .items()
            .iter()
            .map(|line| {
                let product = line.product();
                let line_total = line_price(&product.price, line.quantity())?;

                Ok(LineSummary {
                    code: product.code.clone(),
                    name: product.name.clone(),
                    quantity: line.quantity(),
                    unit_price: to_decimal(&product.price),
                    line_total: to_decimal(&line_total),
                })
            })
            .collect::<Result<Vec<_>, BasketError>>()?;

        Ok(BasketSummary {
            subtotal: to_decimal(&aggregates.subtotal),
            discounts: to_decimal(&aggregates.discounts),
            delivery_cost: to_decimal(&aggregates.delivery_cost),
            delivery_rule: aggregates.delivery_rule.as_ref().map(Into::into),
            total: to_decimal(&aggregates.total),
            applied_offers,
            items,
        })
    }
}

/// JSON number encoding for money amounts.
mod amount {
    use rust_decimal::{Decimal, prelude::ToPrimitive};
    use serde::Serializer;

    pub(super) fn serialize<S: Serializer>(
        value: &Decimal,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(to_f64(*value))
    }

    #[expect(clippy::ref_option, reason = "serde passes a reference to the field")]
    pub(super) fn serialize_option<S: Serializer>(
        value: &Option<Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_some(&to_f64(*value)),
            None => serializer.serialize_none(),
        }
    }

    // A single division rounds once, so 32.95 encodes as the nearest double to 32.95.
    fn to_f64(value: Decimal) -> f64 {
        let mantissa = value.mantissa().to_f64().unwrap_or_default();
        let scale = i32::try_from(value.scale()).unwrap_or_default();

        mantissa / 10_f64.powi(scale)
    }
}

fn to_decimal(money: &Money<'_, Currency>) -> Decimal {
    minor_to_decimal(money.to_minor_units(), money.currency())
}

fn minor_to_decimal(minor: i64, currency: &Currency) -> Decimal {
    Decimal::new(minor, currency.exponent)
}
