//! Offer Registry
//!
//! Maps the offer kinds named in configuration to constructors. Definitions are resolved
//! into offer instances once, when configuration is loaded, never per basket.

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    offers::{BuyOneGetOneHalfPrice, DEFAULT_DISPLAY_TEXT, Offer},
    products::Catalog,
};

/// Configuration kind for [`BuyOneGetOneHalfPrice`].
pub const BUY_ONE_GET_ONE_HALF_PRICE: &str = "buy_one_get_one_half_price";

/// Builds an offer for one product code with the given display text.
pub type OfferConstructor = fn(product_code: &str, display_text: &str) -> Box<dyn Offer>;

/// Errors raised while resolving offer definitions.
#[derive(Debug, Error, PartialEq)]
pub enum OfferError {
    /// No constructor is registered for the kind.
    #[error("unknown offer kind: {0}")]
    UnknownKind(String),

    /// A definition does not name any product codes.
    #[error("offer {0} does not target any products")]
    NoProducts(String),

    /// A definition targets a product code missing from the catalog (kind, code).
    #[error("offer {0} targets unknown product {1}")]
    UnknownProduct(String, String),
}

/// An offer as declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferDefinition {
    /// Registered offer kind
    pub kind: String,

    /// Product codes the offer applies to, one offer instance per code
    pub products: Vec<String>,

    /// Promotional text, defaults to [`DEFAULT_DISPLAY_TEXT`]
    pub display_text: Option<String>,
}

impl OfferDefinition {
    /// Create a definition with the default display text.
    pub fn new(
        kind: impl Into<String>,
        products: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            kind: kind.into(),
            products: products.into_iter().map(Into::into).collect(),
            display_text: None,
        }
    }

    /// Set the display text.
    #[must_use]
    pub fn with_display_text(mut self, display_text: impl Into<String>) -> Self {
        self.display_text = Some(display_text.into());
        self
    }

    /// Display text, falling back to the default.
    pub fn display_text(&self) -> &str {
        self.display_text.as_deref().unwrap_or(DEFAULT_DISPLAY_TEXT)
    }
}

/// Registry of offer constructors keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct OfferRegistry {
    constructors: FxHashMap<String, OfferConstructor>,
}

impl OfferRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every offer kind this crate ships.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.register(BUY_ONE_GET_ONE_HALF_PRICE, |code, text| {
            Box::new(BuyOneGetOneHalfPrice::new(code, text))
        });

        registry
    }

    /// Register (or replace) the constructor for a kind.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        constructor: OfferConstructor,
    ) -> &mut Self {
        self.constructors.insert(kind.into(), constructor);
        self
    }

    /// Check whether a kind is registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Resolve a definition into one offer per targeted product code.
    ///
    /// # Errors
    ///
    /// Returns an [`OfferError`] if the kind is unknown, no products are targeted, or a
    /// targeted product is missing from the catalog.
    pub fn build(
        &self,
        definition: &OfferDefinition,
        catalog: &Catalog<'_>,
    ) -> Result<Vec<Box<dyn Offer>>, OfferError> {
        let constructor = self
            .constructors
            .get(&definition.kind)
            .ok_or_else(|| OfferError::UnknownKind(definition.kind.clone()))?;

        if definition.products.is_empty() {
            return Err(OfferError::NoProducts(definition.kind.clone()));
        }

        definition
            .products
            .iter()
            .map(|code| {
                if !catalog.contains(code) {
                    return Err(OfferError::UnknownProduct(
                        definition.kind.clone(),
                        code.clone(),
                    ));
                }

                debug!(kind = %definition.kind, product = %code, "resolved offer");

                Ok(constructor(code, definition.display_text()))
            })
            .collect()
    }

    /// Resolve several definitions, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns the first [`OfferError`] raised by [`OfferRegistry::build`].
    pub fn build_all<'d>(
        &self,
        definitions: impl IntoIterator<Item = &'d OfferDefinition>,
        catalog: &Catalog<'_>,
    ) -> Result<Vec<Box<dyn Offer>>, OfferError> {
        let mut offers = Vec::new();

        for definition in definitions {
            offers.extend(self.build(definition, catalog)?);
        }

        Ok(offers)
    }
}
