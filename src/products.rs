//! Products

use rustc_hash::FxHashMap;
use rusty_money::{Money, MoneyError, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Errors raised while building a product catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// The catalog contains no products.
    #[error("catalog has no products")]
    Empty,

    /// Two products share the same code.
    #[error("duplicate product code: {0}")]
    DuplicateCode(String),

    /// A product was given an empty code.
    #[error("product code must not be empty")]
    EmptyCode,

    /// A product has a negative price.
    #[error("product {0} has a negative price")]
    NegativePrice(String),

    /// A product's price cannot be combined with the rest of the catalog.
    #[error("product {code}: {source}")]
    Money {
        /// Offending product code
        code: String,

        /// Wrapped currency mismatch
        source: MoneyError,
    },
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product code, unique within a catalog
    pub code: String,

    /// Product name
    pub name: String,

    /// Product price
    pub price: Money<'a, Currency>,
}

impl<'a> Product<'a> {
    /// Create a new product.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        price: Money<'a, Currency>,
    ) -> Self {
        Product {
            code: code.into(),
            name: name.into(),
            price,
        }
    }
}

/// Product catalog, keyed by product code.
///
/// Products keep the order they were inserted in.
#[derive(Debug, Clone, Default)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    keys: FxHashMap<String, ProductKey>,
    order: Vec<ProductKey>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Catalog {
            products: SlotMap::with_key(),
            keys: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Build a catalog from a list of products.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the list is empty or any product is rejected by
    /// [`Catalog::insert`].
    pub fn from_products(
        products: impl IntoIterator<Item = Product<'a>>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::new();

        for product in products {
            catalog.insert(product)?;
        }

        if catalog.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(catalog)
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the code is empty or already taken, the price is
    /// negative, or the price currency differs from products already in the catalog.
    pub fn insert(&mut self, product: Product<'a>) -> Result<ProductKey, CatalogError> {
        if product.code.is_empty() {
            return Err(CatalogError::EmptyCode);
        }

        if self.keys.contains_key(&product.code) {
            return Err(CatalogError::DuplicateCode(product.code));
        }

        if product.price.is_negative() {
            return Err(CatalogError::NegativePrice(product.code));
        }

        if let Some(first) = self.iter().next()
            && let Err(source) = first.price.compare(&product.price)
        {
            return Err(CatalogError::Money {
                code: product.code,
                source,
            });
        }

        let code = product.code.clone();
        let key = self.products.insert(product);

        self.keys.insert(code, key);
        self.order.push(key);

        Ok(key)
    }

    /// Look up a product by its code.
    pub fn get(&self, code: &str) -> Option<&Product<'a>> {
        self.products.get(self.key(code)?)
    }

    /// Look up the key for a product code.
    pub fn key(&self, code: &str) -> Option<ProductKey> {
        self.keys.get(code).copied()
    }

    /// Look up a product by key.
    pub fn by_key(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Check whether the catalog contains a product code.
    pub fn contains(&self, code: &str) -> bool {
        self.keys.contains_key(code)
    }

    /// Iterate over products in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Product<'a>> {
        self.order.iter().filter_map(|key| self.products.get(*key))
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Currency shared by every product, `None` while the catalog is empty.
    pub fn currency(&self) -> Option<&'a Currency> {
        self.iter().next().map(|product| product.price.currency())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    fn widgets<'a>() -> [Product<'a>; 3] {
        [
            Product::new("R01", "Red Widget", Money::from_minor(3295, USD)),
            Product::new("G01", "Green Widget", Money::from_minor(2495, USD)),
            Product::new("B01", "Blue Widget", Money::from_minor(795, USD)),
        ]
    }

    #[test]
    fn product_fields_come_from_constructor() {
        let product = Product::new("R01", "Red Widget", Money::from_minor(3295, USD));

        assert_eq!(product.code, "R01");
        assert_eq!(product.name, "Red Widget");
        assert_eq!(product.price, Money::from_minor(3295, USD));
    }

    #[test]
    fn from_products_keeps_insertion_order() -> TestResult {
        let catalog = Catalog::from_products(widgets())?;

        let codes: Vec<&str> = catalog.iter().map(|p| p.code.as_str()).collect();

        assert_eq!(codes, vec!["R01", "G01", "B01"]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.currency(), Some(USD));

        Ok(())
    }

    #[test]
    fn lookup_by_code_and_key() -> TestResult {
        let catalog = Catalog::from_products(widgets())?;

        let key = catalog.key("G01").ok_or("missing key")?;

        assert_eq!(catalog.get("G01").map(|p| p.name.as_str()), Some("Green Widget"));
        assert_eq!(catalog.by_key(key), catalog.get("G01"));
        assert!(catalog.contains("B01"));
        assert!(catalog.get("ZZ99").is_none());

        Ok(())
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let result = Catalog::from_products([]);

        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let result = Catalog::from_products([
            Product::new("R01", "Red Widget", Money::from_minor(3295, USD)),
            Product::new("R01", "Another Red Widget", Money::from_minor(100, USD)),
        ]);

        assert!(matches!(result, Err(CatalogError::DuplicateCode(code)) if code == "R01"));
    }

    #[test]
    fn negative_prices_are_rejected() {
        let result = Catalog::from_products([Product::new(
            "R01",
            "Red Widget",
            Money::from_minor(-1, USD),
        )]);

        assert!(matches!(result, Err(CatalogError::NegativePrice(code)) if code == "R01"));
    }

    #[test]
    fn empty_codes_are_rejected() {
        let mut catalog = Catalog::new();

        let result = catalog.insert(Product::new("", "Nameless", Money::from_minor(1, USD)));

        assert_eq!(result, Err(CatalogError::EmptyCode));
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let result = Catalog::from_products([
            Product::new("R01", "Red Widget", Money::from_minor(3295, USD)),
            Product::new("G01", "Green Widget", Money::from_minor(2495, GBP)),
        ]);

        assert!(matches!(
            result,
            Err(CatalogError::Money {
                code,
                source: MoneyError::CurrencyMismatch {
                    expected: "USD",
                    actual: "GBP",
                },
            }) if code == "G01"
        ));
    }
}
