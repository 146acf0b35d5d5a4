use std::sync::Arc;

use tracing::debug;

use storage::{KeyValueStore, StorageError, keys, save_json};
use tsubo_core::Clock;
use tsubo_core::model::{
    AnswerType, GameResult, Item, ItemId, LearningHistory, LearningProgress, LearningRecord,
};

use crate::persistence::load_or_default;

/// Mastery buckets and the learning log, one store key per bucket.
#[derive(Clone)]
pub struct LearningProgressService {
    store: Arc<dyn KeyValueStore>,
    clock: Clock,
}

impl LearningProgressService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Clock::default(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// # Errors
    ///
    /// Returns `StorageError` when the store fails; unreadable buckets load empty.
    pub async fn load(&self) -> Result<LearningProgress, StorageError> {
        let store = self.store.as_ref();
        let mastered: Vec<ItemId> = load_or_default(store, keys::MASTERED).await?;
        let unsure: Vec<ItemId> = load_or_default(store, keys::UNSURE).await?;
        let wrong: Vec<ItemId> = load_or_default(store, keys::WRONG).await?;
        Ok(LearningProgress::from_buckets(mastered, unsure, wrong))
    }

    /// # Errors
    ///
    /// Returns `StorageError` when the store fails.
    pub async fn load_history(&self) -> Result<LearningHistory, StorageError> {
        load_or_default(self.store.as_ref(), keys::LEARNING_HISTORY).await
    }

    /// Move one item to the bucket for `answer_type` and log it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the store fails.
    pub async fn record_answer(
        &self,
        item: &Item,
        answer_type: AnswerType,
    ) -> Result<LearningProgress, StorageError> {
        let mut progress = self.load().await?;
        let mut history = self.load_history().await?;
        progress.record(item.id(), answer_type);
        history.push(LearningRecord::new(item, answer_type, self.clock.now()));
        self.save(&progress, &history).await?;
        Ok(progress)
    }

    /// Fold every answer of a game, timeouts included, in order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the store fails.
    pub async fn record_result(&self, result: &GameResult) -> Result<LearningProgress, StorageError> {
        let mut progress = self.load().await?;
        let mut history = self.load_history().await?;
        for answer in &result.answers {
            let item = answer.question.item();
            progress.record(item.id(), answer.answer_type);
            history.push(LearningRecord::new(item, answer.answer_type, result.timestamp));
        }
        self.save(&progress, &history).await?;
        debug!(
            session_id = %result.session_id,
            answers = result.answers.len(),
            mastered = progress.mastered_ids().len(),
            "learning progress updated"
        );
        Ok(progress)
    }

    /// # Errors
    ///
    /// Returns `StorageError` when the store fails.
    pub async fn reset_progress(&self) -> Result<(), StorageError> {
        for key in [keys::MASTERED, keys::UNSURE, keys::WRONG] {
            self.store.remove_item(key).await?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StorageError` when the store fails.
    pub async fn clear_history(&self) -> Result<(), StorageError> {
        self.store.remove_item(keys::LEARNING_HISTORY).await
    }

    async fn save(&self, progress: &LearningProgress, history: &LearningHistory) -> Result<(), StorageError> {
        let store = self.store.as_ref();
        save_json(store, keys::MASTERED, &progress.mastered_ids()).await?;
        save_json(store, keys::UNSURE, &progress.unsure_ids()).await?;
        save_json(store, keys::WRONG, &progress.wrong_ids()).await?;
        save_json(store, keys::LEARNING_HISTORY, history).await
    }
}

#[cfg(test)]
mod tests {
    use storage::InMemoryStore;
    use tsubo_core::model::Category;
    use tsubo_core::time::fixed_clock;

    use super::*;

    fn item(id: &str) -> Item {
        Item::new(ItemId::new(id), format!("name-{id}"), "", "", "", Category::Trunk).unwrap()
    }

    fn service() -> (LearningProgressService, InMemoryStore) {
        let store = InMemoryStore::new();
        let service = LearningProgressService::new(Arc::new(store.clone())).with_clock(fixed_clock());
        (service, store)
    }

    #[tokio::test]
    async fn answers_move_items_between_buckets() {
        let (service, store) = service();
        let lu1 = item("LU1");

        service.record_answer(&lu1, AnswerType::Wrong).await.unwrap();
        let progress = service.record_answer(&lu1, AnswerType::Correct).await.unwrap();

        assert!(progress.is_mastered(lu1.id()));
        assert!(progress.wrong_ids().is_empty());
        assert_eq!(store.get_item(keys::MASTERED).await.unwrap().as_deref(), Some(r#"["LU1"]"#));
        assert_eq!(store.get_item(keys::WRONG).await.unwrap().as_deref(), Some("[]"));
        assert_eq!(service.load_history().await.unwrap().records().len(), 2);
    }

    #[tokio::test]
    async fn malformed_bucket_loads_empty() {
        let (service, store) = service();
        store.set_item(keys::UNSURE, "not json").await.unwrap();
        store.set_item(keys::WRONG, r#"["ST36"]"#).await.unwrap();

        let progress = service.load().await.unwrap();

        assert!(progress.unsure_ids().is_empty());
        assert_eq!(progress.wrong_ids(), [ItemId::new("ST36")].as_slice());
    }

    #[tokio::test]
    async fn reset_and_clear_remove_keys() {
        let (service, store) = service();
        service.record_answer(&item("LI4"), AnswerType::Unsure).await.unwrap();

        service.reset_progress().await.unwrap();
        assert_eq!(store.len().unwrap(), 1);
        service.clear_history().await.unwrap();
        assert_eq!(store.len().unwrap(), 0);
        assert_eq!(service.load().await.unwrap(), LearningProgress::default());
    }
}
