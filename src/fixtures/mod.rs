//! Fixtures
//!
//! Loads a pricing setup from YAML. A set named `acme` lives in
//! `<base>/products/acme.yml`, `<base>/delivery/acme.yml`, `<base>/offers/acme.yml` and
//! `<base>/baskets/acme.yml`. Everything is validated while loading.

use std::{fs, path::PathBuf};

use rusty_money::{Money, MoneyError, iso::Currency};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use crate::{
    basket::{Basket, BasketError},
    delivery::{DeliveryRules, DeliveryRulesError, DeliveryTier},
    offers::{Offer, OfferDefinition, OfferError, OfferRegistry},
    products::{Catalog, CatalogError, Product},
};

pub mod baskets;
pub mod delivery;
pub mod offers;
pub mod products;

pub use baskets::BasketFixture;
pub use products::{parse_money, parse_price};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A product file lists no products
    #[error("Product fixture {0} has no products")]
    NoProducts(String),

    /// Offers or baskets were loaded before any products
    #[error("No products loaded yet")]
    NoCatalog,

    /// Delivery rules have not been loaded
    #[error("No delivery rules loaded yet")]
    NoDeliveryRules,

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Named basket not found
    #[error("Basket not found: {0}")]
    BasketNotFound(String),

    /// Two baskets share a name
    #[error("Duplicate basket name: {0}")]
    DuplicateBasket(String),

    /// A basket's expected total is not in the catalog currency
    #[error("Expected total of basket {basket}: {source}")]
    ExpectedTotal {
        /// Basket name
        basket: String,

        /// Wrapped currency mismatch
        source: MoneyError,
    },

    /// Invalid product data
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Invalid delivery tiers
    #[error(transparent)]
    DeliveryRules(#[from] DeliveryRulesError),

    /// Invalid offer definition
    #[error(transparent)]
    Offer(#[from] OfferError),

    /// Basket creation error
    #[error("Failed to create basket: {0}")]
    Basket(#[from] BasketError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Offer kinds available to offer fixtures
    registry: OfferRegistry,

    catalog: Catalog<'static>,
    delivery_rules: Option<DeliveryRules<'static>>,
    offer_definitions: Vec<OfferDefinition>,
    offers: Vec<Box<dyn Offer>>,
    baskets: Vec<BasketFixture>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            registry: OfferRegistry::builtin(),
            catalog: Catalog::new(),
            delivery_rules: None,
            offer_definitions: Vec::new(),
            offers: Vec::new(),
            baskets: Vec::new(),
        }
    }

    /// Replace the offer registry used to resolve offer fixtures
    #[must_use]
    pub fn with_registry(mut self, registry: OfferRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, lists no products, or contains
    /// an invalid price, duplicate code or currency mismatch. The catalog is left untouched
    /// unless every product is valid.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: products::ProductsFixture = self.read("products", name)?;

        if fixture.products.is_empty() {
            return Err(FixtureError::NoProducts(name.to_string()));
        }

        let mut catalog = self.catalog.clone();

        for product_fixture in fixture.products {
            let product: Product<'static> = product_fixture.try_into()?;

            catalog.insert(product)?;
        }

        info!(set = name, products = catalog.len(), "loaded product fixtures");

        self.catalog = catalog;

        Ok(self)
    }

    /// Load delivery tiers from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the tiers do not form a
    /// valid delivery table.
    pub fn load_delivery(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: delivery::DeliveryFixture = self.read("delivery", name)?;

        let tiers = fixture
            .tiers
            .into_iter()
            .map(DeliveryTier::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let rules = DeliveryRules::new(tiers)?;

        info!(set = name, tiers = rules.tiers().len(), "loaded delivery fixtures");

        self.delivery_rules = Some(rules);

        Ok(self)
    }

    /// Load offers from a YAML fixture file, resolving them against loaded products
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, no products are loaded, or an
    /// offer has an unknown kind or targets an unknown product.
    pub fn load_offers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        if self.catalog.is_empty() {
            return Err(FixtureError::NoCatalog);
        }

        let fixture: offers::OffersFixture = self.read("offers", name)?;
        let definitions: Vec<OfferDefinition> =
            fixture.offers.into_iter().map(Into::into).collect();

        let offers = self.registry.build_all(&definitions, &self.catalog)?;

        info!(set = name, offers = offers.len(), "loaded offer fixtures");

        self.offer_definitions.extend(definitions);
        self.offers.extend(offers);

        Ok(self)
    }

    /// Load named baskets from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, no products are loaded, a
    /// basket name repeats, or a basket references an unknown product or has a malformed
    /// total or one in another currency. Nothing is loaded unless every basket is valid.
    pub fn load_baskets(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        if self.catalog.is_empty() {
            return Err(FixtureError::NoCatalog);
        }

        let fixture: baskets::BasketsFixture = self.read("baskets", name)?;
        let zero = Money::from_minor(0, self.currency()?);
        let mut loaded: Vec<BasketFixture> = Vec::with_capacity(fixture.baskets.len());

        for basket in fixture.baskets {
            if self
                .baskets
                .iter()
                .chain(&loaded)
                .any(|known| known.name == basket.name)
            {
                return Err(FixtureError::DuplicateBasket(basket.name));
            }

            if let Some(code) = basket.items.iter().find(|code| !self.catalog.contains(code)) {
                return Err(FixtureError::ProductNotFound(code.clone()));
            }

            if let Some(total) = &basket.expected_total
                && let Err(source) = zero.compare(&parse_money(total)?)
            {
                return Err(FixtureError::ExpectedTotal {
                    basket: basket.name,
                    source,
                });
            }

            loaded.push(basket);
        }

        self.baskets.extend(loaded);

        info!(set = name, baskets = self.baskets.len(), "loaded basket fixtures");

        Ok(self)
    }

    /// Load products, delivery tiers, offers and baskets with the same name
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_products(name)?
            .load_delivery(name)?
            .load_offers(name)?
            .load_baskets(name)
    }

    /// Load a complete fixture set from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Get a product by its code
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, code: &str) -> Result<&Product<'static>, FixtureError> {
        self.catalog
            .get(code)
            .ok_or_else(|| FixtureError::ProductNotFound(code.to_string()))
    }

    /// Get the loaded catalog
    pub fn catalog(&self) -> &Catalog<'static> {
        &self.catalog
    }

    /// Get the loaded delivery rules
    ///
    /// # Errors
    ///
    /// Returns an error if no delivery rules have been loaded.
    pub fn delivery_rules(&self) -> Result<&DeliveryRules<'static>, FixtureError> {
        self.delivery_rules
            .as_ref()
            .ok_or(FixtureError::NoDeliveryRules)
    }

    /// Get the resolved offers, in priority order
    pub fn offers(&self) -> &[Box<dyn Offer>] {
        &self.offers
    }

    /// Get the offer definitions the offers were resolved from
    pub fn offer_definitions(&self) -> &[OfferDefinition] {
        &self.offer_definitions
    }

    /// Get all named baskets
    pub fn baskets(&self) -> &[BasketFixture] {
        &self.baskets
    }

    /// Get a named basket
    ///
    /// # Errors
    ///
    /// Returns an error if no basket has the name.
    pub fn basket_fixture(&self, name: &str) -> Result<&BasketFixture, FixtureError> {
        self.baskets
            .iter()
            .find(|basket| basket.name == name)
            .ok_or_else(|| FixtureError::BasketNotFound(name.to_string()))
    }

    /// Expected total of a named basket, if the fixture declares one
    ///
    /// # Errors
    ///
    /// Returns an error if no basket has the name or its total is malformed.
    pub fn expected_total(
        &self,
        name: &str,
    ) -> Result<Option<Money<'static, Currency>>, FixtureError> {
        self.basket_fixture(name)?
            .expected_total
            .as_deref()
            .map(parse_money)
            .transpose()
    }

    /// Create an empty basket over the loaded catalog, delivery rules and offers
    ///
    /// # Errors
    ///
    /// Returns an error if products or delivery rules are missing, or basket creation fails.
    pub fn empty_basket(&self) -> Result<Basket<'_>, FixtureError> {
        Ok(Basket::new(
            &self.catalog,
            self.delivery_rules()?,
            &self.offers,
        )?)
    }

    /// Create a basket holding the items of a named basket
    ///
    /// # Errors
    ///
    /// Returns an error if the basket is not found or cannot be created.
    pub fn basket(&self, name: &str) -> Result<Basket<'_>, FixtureError> {
        let fixture = self.basket_fixture(name)?;

        self.basket_with(&fixture.items)
    }

    /// Create a basket holding the given product codes
    ///
    /// # Errors
    ///
    /// Returns an error if the basket cannot be created or a code is not in the catalog.
    pub fn basket_with(
        &self,
        codes: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Basket<'_>, FixtureError> {
        let mut basket = self.empty_basket()?;

        for code in codes {
            basket.add(code.as_ref())?;
        }

        Ok(basket)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.catalog.currency().ok_or(FixtureError::NoCatalog)
    }

    fn read<T: DeserializeOwned>(&self, category: &str, name: &str) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::delivery::TierLimit;

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    fn write_products(base: &Path) -> TestResult {
        write_fixture(
            base,
            "products",
            "shop",
            r"products:
  - code: R01
    name: Red Widget
    price: 32.95 USD
  - code: B01
    name: Blue Widget
    price: 7.95 USD
",
        )
    }

    #[test]
    fn fixture_from_set_loads_acme() -> TestResult {
        let fixture = Fixture::from_set("acme")?;

        assert_eq!(fixture.catalog().len(), 3);
        assert_eq!(fixture.product("R01")?.name, "Red Widget");
        assert_eq!(fixture.delivery_rules()?.tiers().len(), 3);
        assert_eq!(fixture.offers().len(), 1);
        assert_eq!(fixture.currency()?, USD);
        assert!(!fixture.baskets().is_empty());

        Ok(())
    }

    #[test]
    fn acme_baskets_match_expected_totals() -> TestResult {
        let fixture = Fixture::from_set("acme")?;

        for basket_fixture in fixture.baskets() {
            let basket = fixture.basket(&basket_fixture.name)?;

            if let Some(expected) = fixture.expected_total(&basket_fixture.name)? {
                assert_eq!(basket.total()?, expected, "basket {}", basket_fixture.name);
            }
        }

        Ok(())
    }

    #[test]
    fn load_products_keeps_file_order() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_products(dir.path())?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("shop")?;

        let codes: Vec<&str> = fixture
            .catalog()
            .iter()
            .map(|product| product.code.as_str())
            .collect();

        assert_eq!(codes, vec!["R01", "B01"]);

        Ok(())
    }

    #[test]
    fn load_products_rejects_empty_list() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(dir.path(), "products", "empty", "products: []\n")?;

        let result = Fixture::with_base_path(dir.path()).load_products("empty").map(|_| ());

        assert!(matches!(result, Err(FixtureError::NoProducts(name)) if name == "empty"));

        Ok(())
    }

    #[test]
    fn load_products_rejects_duplicate_codes() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "products",
            "dupes",
            r"products:
  - code: R01
    name: Red
    price: 1.00 USD
  - code: R01
    name: Also Red
    price: 2.00 USD
",
        )?;

        let result = Fixture::with_base_path(dir.path()).load_products("dupes").map(|_| ());

        assert!(matches!(
            result,
            Err(FixtureError::Catalog(CatalogError::DuplicateCode(code))) if code == "R01"
        ));

        Ok(())
    }

    #[test]
    fn load_products_rejects_currency_mismatch() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "products",
            "mixed",
            r"products:
  - code: R01
    name: Red
    price: 1.00 USD
  - code: G01
    name: Green
    price: 2.00 GBP
",
        )?;

        let result = Fixture::with_base_path(dir.path()).load_products("mixed").map(|_| ());

        assert!(matches!(
            result,
            Err(FixtureError::Catalog(CatalogError::Money { .. }))
        ));

        Ok(())
    }

    #[test]
    fn load_products_reports_missing_fields() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "products",
            "nameless",
            "products:\n  - code: R01\n    price: 1.00 USD\n",
        )?;

        let result = Fixture::with_base_path(dir.path()).load_products("nameless").map(|_| ());

        assert!(matches!(result, Err(FixtureError::Yaml(_))));

        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = Fixture::with_base_path("/nonexistent/fixtures")
            .load_products("acme")
            .map(|_| ());

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }

    #[test]
    fn load_delivery_sorts_and_validates_tiers() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "delivery",
            "shop",
            "tiers:\n  - cost: 0.00 USD\n  - below: 50.00 USD\n    cost: 4.95 USD\n",
        )?;
        write_fixture(
            dir.path(),
            "delivery",
            "open",
            "tiers:\n  - below: 50.00 USD\n    cost: 4.95 USD\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_delivery("shop")?;

        let limits: Vec<TierLimit<'_>> = fixture
            .delivery_rules()?
            .tiers()
            .iter()
            .map(|tier| tier.limit)
            .collect();

        assert_eq!(
            limits,
            vec![
                TierLimit::Below(Money::from_minor(5000, USD)),
                TierLimit::Unbounded
            ]
        );

        let result = fixture.load_delivery("open").map(|_| ());

        assert!(matches!(
            result,
            Err(FixtureError::DeliveryRules(
                DeliveryRulesError::MissingUnboundedTier
            ))
        ));

        Ok(())
    }

    #[test]
    fn load_offers_requires_products() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "offers",
            "shop",
            "offers:\n  - kind: buy_one_get_one_half_price\n    products: [R01]\n",
        )?;

        let result = Fixture::with_base_path(dir.path()).load_offers("shop").map(|_| ());

        assert!(matches!(result, Err(FixtureError::NoCatalog)));

        Ok(())
    }

    #[test]
    fn load_offers_rejects_unknown_kind_and_product() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_products(dir.path())?;
        write_fixture(
            dir.path(),
            "offers",
            "unknown-kind",
            "offers:\n  - kind: three_for_two\n    products: [R01]\n",
        )?;
        write_fixture(
            dir.path(),
            "offers",
            "unknown-product",
            "offers:\n  - kind: buy_one_get_one_half_price\n    products: [G01]\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("shop")?;

        assert!(matches!(
            fixture.load_offers("unknown-kind").map(|_| ()),
            Err(FixtureError::Offer(OfferError::UnknownKind(_)))
        ));
        assert!(matches!(
            fixture.load_offers("unknown-product").map(|_| ()),
            Err(FixtureError::Offer(OfferError::UnknownProduct(_, code))) if code == "G01"
        ));
        assert!(fixture.offers().is_empty());

        Ok(())
    }

    #[test]
    fn load_baskets_rejects_unknown_products() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_products(dir.path())?;
        write_fixture(
            dir.path(),
            "baskets",
            "shop",
            "baskets:\n  - name: bad\n    items: [R01, ZZ99]\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("shop")?;

        let result = fixture.load_baskets("shop").map(|_| ());

        assert!(matches!(result, Err(FixtureError::ProductNotFound(code)) if code == "ZZ99"));

        Ok(())
    }

    #[test]
    fn failed_product_load_leaves_catalog_untouched() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_fixture(
            dir.path(),
            "products",
            "broken",
            r"products:
  - code: R01
    name: Red Widget
    price: 32.95 USD
  - code: G01
    name: Green Widget
    price: 24.95 ZZZ
",
        )?;
        write_fixture(
            dir.path(),
            "products",
            "fixed",
            r"products:
  - code: R01
    name: Red Widget
    price: 32.95 USD
",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        let result = fixture.load_products("broken").map(|_| ());

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ZZZ"));
        assert!(fixture.catalog().is_empty());

        fixture.load_products("fixed")?;

        assert_eq!(fixture.catalog().len(), 1);
        assert_eq!(fixture.product("R01")?.price, Money::from_minor(3295, USD));

        Ok(())
    }

    #[test]
    fn failed_basket_load_keeps_earlier_baskets_out() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_products(dir.path())?;
        write_fixture(
            dir.path(),
            "baskets",
            "broken",
            r"baskets:
  - name: reds
    items: [R01, R01]
  - name: bad
    items: [ZZ99]
",
        )?;
        write_fixture(
            dir.path(),
            "baskets",
            "fixed",
            r"baskets:
  - name: reds
    items: [R01, R01]
",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("shop")?;

        assert!(fixture.load_baskets("broken").is_err());
        assert!(fixture.baskets().is_empty());

        fixture.load_baskets("fixed")?;

        assert_eq!(fixture.basket_fixture("reds")?.items, ["R01", "R01"]);

        Ok(())
    }

    #[test]
    fn load_baskets_rejects_expected_total_in_another_currency() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_products(dir.path())?;
        write_fixture(
            dir.path(),
            "baskets",
            "shop",
            r"baskets:
  - name: reds
    items: [R01, R01]
    expected_total: 54.37 GBP
",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("shop")?;

        let result = fixture.load_baskets("shop").map(|_| ());

        assert!(matches!(
            result,
            Err(FixtureError::ExpectedTotal {
                basket,
                source: MoneyError::CurrencyMismatch {
                    expected: "USD",
                    actual: "GBP",
                },
            }) if basket == "reds"
        ));
        assert!(fixture.baskets().is_empty());

        Ok(())
    }

    #[test]
    fn basket_requires_delivery_rules() -> TestResult {
        let dir = tempfile::tempdir()?;

        write_products(dir.path())?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("shop")?;

        assert!(matches!(
            fixture.empty_basket(),
            Err(FixtureError::NoDeliveryRules)
        ));

        Ok(())
    }

    #[test]
    fn basket_with_surfaces_invalid_product() -> TestResult {
        let fixture = Fixture::from_set("acme")?;

        let result = fixture.basket_with(["R01", "ZZ99"]);

        assert!(matches!(
            result,
            Err(FixtureError::Basket(BasketError::InvalidProduct(code))) if code == "ZZ99"
        ));

        Ok(())
    }

    #[test]
    fn unknown_basket_name_is_reported() -> TestResult {
        let fixture = Fixture::from_set("acme")?;

        assert!(matches!(
            fixture.basket("nope"),
            Err(FixtureError::BasketNotFound(name)) if name == "nope"
        ));

        Ok(())
    }
}
