//! Delivery Fixtures

use serde::Deserialize;

use crate::{
    delivery::DeliveryTier,
    fixtures::{FixtureError, products::parse_money},
};

/// Wrapper for delivery tiers in YAML
#[derive(Debug, Deserialize)]
pub struct DeliveryFixture {
    /// Delivery tiers, any order
    pub tiers: Vec<DeliveryTierFixture>,
}

/// Delivery Tier Fixture
///
/// A tier without `below` is the unbounded catch-all.
#[derive(Debug, Deserialize)]
pub struct DeliveryTierFixture {
    /// Exclusive upper bound (e.g., "50.00 USD")
    #[serde(default)]
    pub below: Option<String>,

    /// Delivery charge (e.g., "4.95 USD")
    pub cost: String,
}

impl TryFrom<DeliveryTierFixture> for DeliveryTier<'static> {
    type Error = FixtureError;

    fn try_from(fixture: DeliveryTierFixture) -> Result<Self, Self::Error> {
        let cost = parse_money(&fixture.cost)?;

        Ok(match fixture.below {
            Some(limit) => DeliveryTier::below(parse_money(&limit)?, cost),
            None => DeliveryTier::unbounded(cost),
        })
    }
}
