//! Offers
//!
//! An [`Offer`] prices a whole basket line for the product codes it targets. Offers are
//! checked in list order and the first one that applies to a product wins; offers never
//! stack on the same line.

use std::fmt;

use rusty_money::{Money, iso::Currency};

use crate::{pricing::PricingError, products::Product};

pub mod half_price;
pub mod registry;

pub use half_price::BuyOneGetOneHalfPrice;
pub use registry::{OfferDefinition, OfferError, OfferRegistry};

/// Display text used when an offer definition does not supply one.
pub const DEFAULT_DISPLAY_TEXT: &str = "Special offer";

/// Discount strategy for a basket line.
///
/// Implementations must be pure: the same product and quantity always price the same.
pub trait Offer: fmt::Debug + Send + Sync {
    /// Whether this offer targets the given product code.
    fn applies_to(&self, code: &str) -> bool;

    /// Price `quantity` units of `product` with the offer applied.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the line total cannot be represented.
    fn apply<'a>(
        &self,
        product: &Product<'a>,
        quantity: u32,
    ) -> Result<Money<'a, Currency>, PricingError>;

    /// Promotional text shown next to qualifying products.
    fn display_text(&self) -> &str;
}

/// Find the first offer that targets a product code.
pub fn find_offer<'o>(offers: &'o [Box<dyn Offer>], code: &str) -> Option<&'o dyn Offer> {
    offers
        .iter()
        .find(|offer| offer.applies_to(code))
        .map(|offer| &**offer)
}
