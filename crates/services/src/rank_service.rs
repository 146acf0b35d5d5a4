use std::sync::Arc;

use tracing::info;

use storage::{KeyValueStore, StorageError, keys, save_json};
use tsubo_core::model::{RankChange, RankProgress};

use crate::persistence::load_or_default;

#[derive(Clone)]
pub struct RankService {
    store: Arc<dyn KeyValueStore>,
}

impl RankService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `StorageError` when the store fails; unreadable progress starts over.
    pub async fn load(&self) -> Result<RankProgress, StorageError> {
        load_or_default(self.store.as_ref(), keys::RANK).await
    }

    /// Credit `count` correct answers and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the store fails.
    pub async fn add_correct(&self, count: u32) -> Result<RankChange, StorageError> {
        let mut progress = self.load().await?;
        let change = progress.add_correct(count);
        save_json(self.store.as_ref(), keys::RANK, &progress).await?;
        if let Some(rank) = change.new_rank {
            info!(rank = rank.id, total_correct = progress.total_correct, "rank up");
        }
        Ok(change)
    }

    /// # Errors
    ///
    /// Returns `StorageError` when the store fails.
    pub async fn reset(&self) -> Result<(), StorageError> {
        self.store.remove_item(keys::RANK).await
    }
}

#[cfg(test)]
mod tests {
    use storage::InMemoryStore;

    use super::*;

    #[tokio::test]
    async fn crossing_a_threshold_reports_rank_up() {
        let service = RankService::new(Arc::new(InMemoryStore::new()));

        let first = service.add_correct(9).await.unwrap();
        assert!(first.new_rank.is_none());
        let second = service.add_correct(1).await.unwrap();
        assert_eq!(second.previous.required_correct, 0);
        assert_eq!(second.new_rank.map(|r| r.required_correct), Some(10));

        let progress = service.load().await.unwrap();
        assert_eq!(progress.total_correct, 10);
        assert_eq!(progress.current_rank().required_correct, 10);

        service.reset().await.unwrap();
        assert_eq!(service.load().await.unwrap(), RankProgress::default());
    }
}
