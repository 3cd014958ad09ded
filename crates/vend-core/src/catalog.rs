//! # Catalog
//!
//! The fixed list of purchasable items, supplied once at construction.
//! Order is preserved for display.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{ValidationError, VendingResult};
use crate::money::Money;
use crate::validation::validate_item_name;

/// A purchasable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogItem {
    pub name: String,
    pub price: Money,
}

impl CatalogItem {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        CatalogItem {
            name: name.into(),
            price,
        }
    }
}

/// Ordered, name-unique item list.
///
/// Prices are checked against the ledger's smallest denomination by the
/// machine that owns the catalog, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Creates a catalog, rejecting empty or duplicate names.
    pub fn new(items: impl IntoIterator<Item = CatalogItem>) -> VendingResult<Self> {
        let mut catalog = Catalog::default();

        for item in items {
            validate_item_name(&item.name)?;
            if catalog.get(&item.name).is_some() {
                return Err(ValidationError::DuplicateItem { name: item.name }.into());
            }
            catalog.items.push(item);
        }

        Ok(catalog)
    }

    /// Looks an item up by exact name.
    pub fn get(&self, name: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.name == name)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a CatalogItem;
    type IntoIter = std::slice::Iter<'a, CatalogItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VendingError;

    #[test]
    fn test_catalog_preserves_order_and_lookup() {
        let catalog = Catalog::new([
            CatalogItem::new("cola", Money::from_units(1100)),
            CatalogItem::new("water", Money::from_units(600)),
        ])
        .unwrap();

        let names: Vec<&str> = catalog.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["cola", "water"]);
        assert_eq!(catalog.get("water").map(|i| i.price), Some(Money::from_units(600)));
        assert!(catalog.get("Water").is_none());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_catalog_rejects_duplicates_and_blank_names() {
        let dup = Catalog::new([
            CatalogItem::new("cola", Money::from_units(1100)),
            CatalogItem::new("cola", Money::from_units(900)),
        ]);
        assert!(matches!(
            dup,
            Err(VendingError::Validation(ValidationError::DuplicateItem { .. }))
        ));

        assert!(Catalog::new([CatalogItem::new(" ", Money::from_units(100))]).is_err());
        assert!(Catalog::new(Vec::new()).unwrap().is_empty());
    }
}
