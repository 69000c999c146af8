//! Basket Fixtures

use serde::Deserialize;

/// Wrapper for named baskets in YAML
#[derive(Debug, Deserialize)]
pub struct BasketsFixture {
    /// Named baskets
    #[serde(default)]
    pub baskets: Vec<BasketFixture>,
}

/// Basket Fixture
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BasketFixture {
    /// Basket name, unique within a set
    pub name: String,

    /// Product codes, added one at a time in order
    pub items: Vec<String>,

    /// Expected total (e.g., "37.85 USD"), used to check the set
    #[serde(default)]
    pub expected_total: Option<String>,
}
