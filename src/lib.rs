//! Acme Basket
//!
//! Basket pricing for Acme Widget Co: a product catalog, tiered delivery charges and
//! pluggable per-product offers, combined into a basket that reports its subtotal, offer
//! savings, delivery cost and total.
//!
//! ```
//! use acme_basket::prelude::*;
//! use rusty_money::{Money, iso::USD};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::from_products([
//!     Product::new("R01", "Red Widget", Money::from_minor(3295, USD)),
//!     Product::new("B01", "Blue Widget", Money::from_minor(795, USD)),
//! ])?;
//!
//! let delivery = DeliveryRules::new([
//!     DeliveryTier::below(Money::from_minor(5000, USD), Money::from_minor(495, USD)),
//!     DeliveryTier::unbounded(Money::from_minor(0, USD)),
//! ])?;
//!
//! let offers: Vec<Box<dyn Offer>> = vec![Box::new(BuyOneGetOneHalfPrice::new(
//!     "R01",
//!     "Second red widget half price",
//! ))];
//!
//! let mut basket = Basket::new(&catalog, &delivery, &offers)?;
//!
//! basket.add("R01")?;
//! basket.add("R01")?;
//!
//! assert_eq!(basket.total()?, Money::from_minor(5437, USD));
//! # Ok(())
//! # }
//! ```

pub mod basket;
pub mod delivery;
pub mod fixtures;
pub mod offers;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod summary;
