//! Buy One Get One Half Price
//!
//! Every second unit of the target product is sold at half price. The half price is
//! rounded down to the minor unit, in the customer's favour.

use rusty_money::{Money, iso::Currency};

use crate::{
    offers::Offer,
    pricing::{PricingError, half_price_floor, line_price},
    products::Product,
};

/// Pairwise half-price offer for a single product code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyOneGetOneHalfPrice {
    product_code: String,
    display_text: String,
}

impl BuyOneGetOneHalfPrice {
    /// Create a new offer for a product code.
    pub fn new(product_code: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            product_code: product_code.into(),
            display_text: display_text.into(),
        }
    }

    /// The product code this offer targets.
    pub fn product_code(&self) -> &str {
        &self.product_code
    }
}

impl Offer for BuyOneGetOneHalfPrice {
    fn applies_to(&self, code: &str) -> bool {
        code == self.product_code
    }

    fn apply<'a>(
        &self,
        product: &Product<'a>,
        quantity: u32,
    ) -> Result<Money<'a, Currency>, PricingError> {
        let pair_price = product.price.add(half_price_floor(&product.price))?;

        let paired = line_price(&pair_price, quantity / 2)?;
        let unpaired = line_price(&product.price, quantity % 2)?;

        Ok(paired.add(unpaired)?)
    }

    fn display_text(&self) -> &str {
        &self.display_text
    }
}
