//! Acme Basket prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    basket::{Aggregates, Basket, BasketError, BasketLine, ProductDiscount},
    delivery::{
        AppliedDeliveryRule, DeliveryMessage, DeliveryRules, DeliveryRulesError, DeliveryTier,
        TierLimit,
    },
    fixtures::{Fixture, FixtureError},
    offers::{
        BuyOneGetOneHalfPrice, DEFAULT_DISPLAY_TEXT, Offer, OfferDefinition, OfferError,
        OfferRegistry,
    },
    pricing::PricingError,
    products::{Catalog, CatalogError, Product, ProductKey},
    receipt::{Receipt, ReceiptError},
    summary::BasketSummary,
};
