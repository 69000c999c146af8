//! Offer Fixtures

use serde::Deserialize;

use crate::offers::OfferDefinition;

/// Wrapper for offers in YAML
#[derive(Debug, Deserialize)]
pub struct OffersFixture {
    /// Offers in priority order
    #[serde(default)]
    pub offers: Vec<OfferFixture>,
}

/// Offer Fixture
#[derive(Debug, Deserialize)]
pub struct OfferFixture {
    /// Registered offer kind (e.g., "`buy_one_get_one_half_price`")
    pub kind: String,

    /// Product codes the offer targets
    pub products: Vec<String>,

    /// Promotional text
    #[serde(default)]
    pub display_text: Option<String>,
}

impl From<OfferFixture> for OfferDefinition {
    fn from(fixture: OfferFixture) -> Self {
        OfferDefinition {
            kind: fixture.kind,
            products: fixture.products,
            display_text: fixture.display_text,
        }
    }
}
