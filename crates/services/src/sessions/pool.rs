use std::collections::HashSet;

use tsubo_core::model::{
    Catalog, Category, Item, ItemId, LearningProgress, Meridian, PoolSelector, SessionConfig,
};

/// Derives the items eligible for a session.
///
/// The result is a snapshot in catalog order; it may be empty.
#[must_use]
pub fn derive_pool(
    catalog: &Catalog,
    config: &SessionConfig,
    progress: &LearningProgress,
) -> Vec<Item> {
    let mut pool = match config.pool {
        PoolSelector::All => resolve_all(catalog),
        PoolSelector::Review => resolve_review(catalog, progress),
        PoolSelector::Category(category) => resolve_category(catalog, category),
        PoolSelector::Meridian(meridian) => resolve_meridian(catalog, meridian),
    };

    if config.exclude_mastered {
        pool.retain(|item| !progress.is_mastered(item.id()));
    }
    pool
}

fn resolve_all(catalog: &Catalog) -> Vec<Item> {
    catalog.items().to_vec()
}

fn resolve_review(catalog: &Catalog, progress: &LearningProgress) -> Vec<Item> {
    let review: HashSet<ItemId> = progress.review_ids().into_iter().collect();
    catalog
        .iter()
        .filter(|item| review.contains(item.id()))
        .cloned()
        .collect()
}

fn resolve_category(catalog: &Catalog, category: Category) -> Vec<Item> {
    catalog.by_category(category).cloned().collect()
}

fn resolve_meridian(catalog: &Catalog, meridian: Meridian) -> Vec<Item> {
    catalog.by_meridian(meridian).cloned().collect()
}
