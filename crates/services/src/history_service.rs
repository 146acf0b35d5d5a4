use std::sync::Arc;

use storage::{KeyValueStore, StorageError, keys, save_json};
use tsubo_core::model::{GameHistory, GameResult};

use crate::persistence::load_or_default;

#[derive(Clone)]
pub struct GameHistoryService {
    store: Arc<dyn KeyValueStore>,
}

impl GameHistoryService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// # Errors
    ///
    /// Returns `StorageError` when the store fails; an unreadable history loads empty.
    pub async fn load(&self) -> Result<GameHistory, StorageError> {
        load_or_default(self.store.as_ref(), keys::GAME_HISTORY).await
    }

    /// Append a finished game and persist the updated aggregates.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the store fails.
    pub async fn save_result(&self, result: GameResult) -> Result<GameHistory, StorageError> {
        let mut history = self.load().await?;
        history.record(result);
        save_json(self.store.as_ref(), keys::GAME_HISTORY, &history).await?;
        Ok(history)
    }

    /// # Errors
    ///
    /// Returns `StorageError` when the store fails.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.remove_item(keys::GAME_HISTORY).await
    }
}

#[cfg(test)]
mod tests {
    use storage::InMemoryStore;
    use tsubo_core::model::{SessionConfig, SessionId};
    use tsubo_core::time::fixed_now;

    use super::*;

    fn empty_result(total: usize) -> GameResult {
        GameResult::from_answers(
            SessionId::new_v4(),
            total,
            Vec::new(),
            fixed_now(),
            &SessionConfig::default(),
            0,
        )
    }

    #[tokio::test]
    async fn results_accumulate_and_clear() {
        let service = GameHistoryService::new(Arc::new(InMemoryStore::new()));

        service.save_result(empty_result(10)).await.unwrap();
        let history = service.save_result(empty_result(5)).await.unwrap();
        assert_eq!(history.total_games, 2);
        assert_eq!(history.total_questions, 15);
        assert_eq!(service.load().await.unwrap(), history);

        service.clear().await.unwrap();
        assert_eq!(service.load().await.unwrap(), GameHistory::default());
    }
}
