use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::ItemId;
use crate::model::item::{Category, Item, ItemError, Meridian};

/// Smallest catalog that can still fill every question with three distinct distractors.
pub const MIN_CATALOG_SIZE: usize = 4;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate item id: {0}")]
    DuplicateId(ItemId),

    #[error("catalog needs at least {min} items, got {actual}")]
    TooSmall { min: usize, actual: usize },

    #[error(transparent)]
    Item(#[from] ItemError),

    #[error("catalog json is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered, immutable collection of quiz items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// Builds a catalog, preserving the given order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two items share an id and
    /// `CatalogError::TooSmall` below `MIN_CATALOG_SIZE` items.
    pub fn new(items: Vec<Item>) -> Result<Self, CatalogError> {
        if items.len() < MIN_CATALOG_SIZE {
            return Err(CatalogError::TooSmall {
                min: MIN_CATALOG_SIZE,
                actual: items.len(),
            });
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id()) {
                return Err(CatalogError::DuplicateId(item.id().clone()));
            }
        }

        Ok(Self { items })
    }

    /// Parses a JSON array of items.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Json` for malformed input, otherwise the
    /// validation errors of `Catalog::new`.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let items: Vec<Item> = serde_json::from_str(raw)?;
        for item in &items {
            item.validate()?;
        }
        Self::new(items)
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |item| item.category() == category)
    }

    pub fn by_meridian(&self, meridian: Meridian) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .filter(move |item| item.meridian() == Some(meridian))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, category: Category) -> Item {
        Item::new(ItemId::new(id), name, "", "", "", category).unwrap()
    }

    fn four() -> Vec<Item> {
        vec![
            item("LI4", "合谷", Category::UpperLimb),
            item("ST36", "足三里", Category::LowerLimb),
            item("GV20", "百会", Category::Head),
            item("LI11", "曲池", Category::UpperLimb),
        ]
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut items = four();
        items.push(item("LI4", "合谷", Category::UpperLimb));
        let err = Catalog::new(items).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id.as_str() == "LI4"));
    }

    #[test]
    fn rejects_catalog_too_small_for_distractors() {
        let err = Catalog::new(four().into_iter().take(3).collect()).unwrap_err();
        assert!(matches!(err, CatalogError::TooSmall { min: 4, actual: 3 }));
    }

    #[test]
    fn filters_by_category_and_meridian() {
        let catalog = Catalog::new(four()).unwrap();
        assert_eq!(catalog.by_category(Category::UpperLimb).count(), 2);
        assert_eq!(catalog.by_meridian(Meridian::Li).count(), 2);
        assert_eq!(catalog.by_meridian(Meridian::Lr).count(), 0);
        assert_eq!(
            catalog.get(&ItemId::new("GV20")).map(Item::name),
            Some("百会")
        );
    }

    #[test]
    fn parses_json_array() {
        let raw = r#"[
            {"id":"LU1","name":"中府","reading":"ちゅうふ","location":"","effect":"","category":"trunk"},
            {"id":"LU5","name":"尺沢","reading":"しゃくたく","location":"","effect":"","category":"upper_limb"},
            {"id":"LU7","name":"列欠","reading":"れっけつ","location":"","effect":"","category":"upper_limb"},
            {"id":"LU9","name":"太淵","reading":"たいえん","location":"","effect":"","category":"upper_limb"}
        ]"#;
        let catalog = Catalog::from_json(raw).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.items()[0].reading(), "ちゅうふ");
    }

    #[test]
    fn json_with_blank_name_is_rejected() {
        let raw = r#"[
            {"id":"LU1","name":" ","reading":"","location":"","effect":"","category":"trunk"}
        ]"#;
        let err = Catalog::from_json(raw).unwrap_err();
        assert!(matches!(err, CatalogError::Item(ItemError::EmptyName)));
    }
}
