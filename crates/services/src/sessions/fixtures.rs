//! Catalog builders shared by the session tests.

use std::sync::Arc;

use tsubo_core::model::{Catalog, Category, Item, ItemId};

const PREFIXES: [&str; 5] = ["LU", "LI", "ST", "SP", "HT"];

/// `size` items with ids `LU1`, `LI2`, `ST3`, … and categories cycling through all five.
pub(crate) fn items(size: usize) -> Vec<Item> {
    (1..=size)
        .map(|i| {
            let prefix = PREFIXES[(i - 1) % PREFIXES.len()];
            let category = Category::ALL[(i - 1) % Category::ALL.len()];
            Item::new(
                ItemId::new(format!("{prefix}{i}")),
                format!("point-{i}"),
                format!("reading-{i}"),
                format!("location-{i}"),
                format!("effect-{i}"),
                category,
            )
            .unwrap()
        })
        .collect()
}

pub(crate) fn catalog(size: usize) -> Arc<Catalog> {
    Arc::new(Catalog::new(items(size)).unwrap())
}
