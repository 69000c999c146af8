//! Basket
//!
//! A [`Basket`] collects product codes against a catalog, a delivery table and an offer
//! list it borrows for its whole life. Totals are computed lazily and cached until the
//! next successful [`Basket::add`].

use std::cell::OnceCell;

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    delivery::{AppliedDeliveryRule, DeliveryRules},
    offers::Offer,
    pricing::PricingError,
    products::{Catalog, Product, ProductKey},
};

pub mod aggregates;

pub use aggregates::{Aggregates, LinePricing, ProductDiscount};

/// Errors related to basket construction, mutation or totals.
#[derive(Debug, Error, PartialEq)]
pub enum BasketError {
    /// The catalog has no products, so the basket has no currency.
    #[error("catalog has no products")]
    EmptyCatalog,

    /// Catalog and delivery rules disagree on currency (catalog, delivery rules).
    #[error("catalog has currency {0}, but delivery rules have currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// A product code is not in the catalog.
    #[error("Product not valid: {0}")]
    InvalidProduct(String),

    /// A line quantity no longer fits.
    #[error("quantity of {0} is too large")]
    QuantityOverflow(String),

    /// A total could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl BasketError {
    /// Whether the error stems from how the basket was wired up rather than from use.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            BasketError::EmptyCatalog | BasketError::CurrencyMismatch(..)
        )
    }
}

/// A product and how many units of it are in the basket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasketLine<'a> {
    key: ProductKey,
    product: &'a Product<'a>,
    quantity: u32,
}

impl<'a> BasketLine<'a> {
    /// Create a new line.
    pub fn new(key: ProductKey, product: &'a Product<'a>, quantity: u32) -> Self {
        Self {
            key,
            product,
            quantity,
        }
    }

    /// Catalog key of the product.
    pub fn key(&self) -> ProductKey {
        self.key
    }

    /// The product on this line.
    pub fn product(&self) -> &'a Product<'a> {
        self.product
    }

    /// Units of the product in the basket.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Shopping basket
#[derive(Debug)]
pub struct Basket<'a> {
    catalog: &'a Catalog<'a>,
    delivery_rules: &'a DeliveryRules<'a>,
    offers: &'a [Box<dyn Offer>],
    currency: &'a Currency,
    lines: Vec<BasketLine<'a>>,
    line_index: FxHashMap<ProductKey, usize>,
    aggregates: OnceCell<Aggregates<'a>>,
}

impl<'a> Basket<'a> {
    /// Create an empty basket.
    ///
    /// # Errors
    ///
    /// Returns a [`BasketError`] if the catalog is empty or its currency differs from the
    /// delivery rules' currency.
    pub fn new(
        catalog: &'a Catalog<'a>,
        delivery_rules: &'a DeliveryRules<'a>,
        offers: &'a [Box<dyn Offer>],
    ) -> Result<Self, BasketError> {
        let currency = catalog.currency().ok_or(BasketError::EmptyCatalog)?;

        if currency != delivery_rules.currency() {
            return Err(BasketError::CurrencyMismatch(
                currency.iso_alpha_code,
                delivery_rules.currency().iso_alpha_code,
            ));
        }

        Ok(Basket {
            catalog,
            delivery_rules,
            offers,
            currency,
            lines: Vec::new(),
            line_index: FxHashMap::default(),
            aggregates: OnceCell::new(),
        })
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns [`BasketError::InvalidProduct`] if the code is not in the catalog; the
    /// basket is left unchanged.
    pub fn add(&mut self, code: &str) -> Result<(), BasketError> {
        self.add_many(code, 1)
    }

    /// Add several units of a product at once.
    ///
    /// Adding zero units validates the code and changes nothing else.
    ///
    /// # Errors
    ///
    /// Returns a [`BasketError`] if the code is not in the catalog or the line quantity
    /// would overflow; the basket is left unchanged.
    pub fn add_many(&mut self, code: &str, quantity: u32) -> Result<(), BasketError> {
        let catalog = self.catalog;

        let Some((key, product)) = catalog
            .key(code)
            .and_then(|key| Some((key, catalog.by_key(key)?)))
        else {
            debug!(code, "rejected unknown product");

            return Err(BasketError::InvalidProduct(code.to_string()));
        };

        if quantity == 0 {
            return Ok(());
        }

        if let Some(line) = self
            .line_index
            .get(&key)
            .and_then(|&idx| self.lines.get_mut(idx))
        {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| BasketError::QuantityOverflow(code.to_string()))?;
        } else {
            self.line_index.insert(key, self.lines.len());
            self.lines.push(BasketLine::new(key, product, quantity));
        }

        self.aggregates.take();

        debug!(code, quantity, "added to basket");

        Ok(())
    }

    /// Sum of `price × quantity` over all lines, before offers.
    ///
    /// # Errors
    ///
    /// Returns a [`BasketError`] if the totals cannot be computed.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, BasketError> {
        Ok(self.aggregates()?.subtotal)
    }

    /// Total saved by offers.
    ///
    /// # Errors
    ///
    /// Returns a [`BasketError`] if the totals cannot be computed.
    pub fn discounts(&self) -> Result<Money<'a, Currency>, BasketError> {
        Ok(self.aggregates()?.discounts)
    }

    /// Subtotal after offers.
    ///
    /// # Errors
    ///
    /// Returns a [`BasketError`] if the totals cannot be computed.
    pub fn discounted_subtotal(&self) -> Result<Money<'a, Currency>, BasketError> {
        Ok(self.aggregates()?.discounted_subtotal)
    }

    /// Delivery charge for the discounted subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`BasketError`] if the totals cannot be computed.
    pub fn delivery_cost(&self) -> Result<Money<'a, Currency>, BasketError> {
        Ok(self.aggregates()?.delivery_cost)
    }

    /// Delivery tier the discounted subtotal resolved to.
    ///
    /// # Errors
    ///
    /// Returns a [`BasketError`] if the totals cannot be computed.
    pub fn applied_delivery_rule(&self) -> Result<Option<AppliedDeliveryRule<'a>>, BasketError> {
        Ok(self.aggregates()?.delivery_rule)
    }

    /// Discounted subtotal plus delivery.
    ///
    /// # Errors
    ///
    /// Returns a [`BasketError`] if the totals cannot be computed.
    pub fn total(&self) -> Result<Money<'a, Currency>, BasketError> {
        Ok(self.aggregates()?.total)
    }

    /// Per-line savings for every line an offer applies to, in the order products were
    /// first added.
    ///
    /// Computed on demand without touching the cache.
    ///
    /// # Errors
    ///
    /// Returns a [`BasketError`] if a line cannot be priced.
    pub fn product_discounts(&self) -> Result<SmallVec<[ProductDiscount<'a>; 4]>, BasketError> {
        Ok(aggregates::product_discounts(&self.lines, self.offers)?)
    }

    /// Every aggregate at once, computing them if the cache is stale.
    ///
    /// # Errors
    ///
    /// Returns a [`BasketError`] if the totals cannot be computed.
    pub fn aggregates(&self) -> Result<&Aggregates<'a>, BasketError> {
        if let Some(aggregates) = self.aggregates.get() {
            return Ok(aggregates);
        }

        let computed = aggregates::compute(&self.lines, self.offers, self.delivery_rules)?;

        Ok(self.aggregates.get_or_init(|| computed))
    }

    /// Whether cached aggregates are current.
    pub fn is_clean(&self) -> bool {
        self.aggregates.get().is_some()
    }

    /// Lines in the order their products were first added.
    pub fn items(&self) -> &[BasketLine<'a>] {
        &self.lines
    }

    /// Units of a product in the basket, zero if absent or unknown.
    pub fn quantity(&self, code: &str) -> u32 {
        self.catalog
            .key(code)
            .and_then(|key| self.line_index.get(&key))
            .and_then(|&idx| self.lines.get(idx))
            .map_or(0, BasketLine::quantity)
    }

    /// Number of distinct products in the basket.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Currency of every amount the basket reports.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Catalog products are resolved against.
    pub fn catalog(&self) -> &'a Catalog<'a> {
        self.catalog
    }

    /// Delivery table used for the delivery charge.
    pub fn delivery_rules(&self) -> &'a DeliveryRules<'a> {
        self.delivery_rules
    }

    /// Offers applied to the basket, in priority order.
    pub fn offers(&self) -> &'a [Box<dyn Offer>] {
        self.offers
    }
}
