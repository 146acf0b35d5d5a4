use std::sync::Arc;

use async_trait::async_trait;

use services::{Advance, Clock, QuizLoopService, SessionError, SessionPhase};
use storage::{InMemoryStore, KeyValueStore, StorageError, keys};
use tsubo_core::model::{
    AnswerType, Catalog, Category, GameMode, Item, ItemId, PoolSelector, SessionConfig,
};
use tsubo_core::time::fixed_now;

fn catalog() -> Arc<Catalog> {
    let items = ["LU1", "LU5", "LI4", "LI11", "ST36", "SP6", "HT7", "PC6"]
        .iter()
        .enumerate()
        .map(|(i, id)| {
            Item::new(
                ItemId::new(*id),
                format!("point {id}"),
                "",
                "",
                "",
                Category::ALL[i % Category::ALL.len()],
            )
            .unwrap()
        })
        .collect();
    Arc::new(Catalog::new(items).unwrap())
}

fn service(store: &InMemoryStore) -> QuizLoopService {
    QuizLoopService::new(Clock::fixed(fixed_now()), catalog(), Arc::new(store.clone())).with_seed(11)
}

#[tokio::test]
async fn normal_session_persists_progress_history_and_rank() {
    let store = InMemoryStore::new();
    let loop_svc = service(&store);

    let config = SessionConfig::default().with_question_count(4);
    let mut started = loop_svc.start_session(config).await.unwrap();
    assert!(started.countdown.is_none());
    let session = &mut started.session;

    while session.phase() != SessionPhase::Finished {
        let index = session.current_question().unwrap().correct_index();
        session.answer_question(index, false).unwrap();
        if session.next_question() == Advance::Finished {
            break;
        }
    }

    let finished = loop_svc.finish_session(session).await.unwrap();
    assert_eq!(finished.result.correct_answers, 4);
    assert!(finished.rank_up.is_none());
    assert!(!finished.new_survival_record);

    let progress = loop_svc.progress().load().await.unwrap();
    assert_eq!(progress.mastered_ids().len(), 4);
    let history = loop_svc.history().load().await.unwrap();
    assert_eq!(history.total_games, 1);
    assert_eq!(loop_svc.ranks().load().await.unwrap().total_correct, 4);

    let settings = loop_svc.settings().load().await.unwrap();
    let last = settings.last_played_mode().unwrap();
    assert_eq!(last.mode, GameMode::Normal);
    assert_eq!(last.question_count, Some(4));

    // Mastered items are left out of the next default session.
    let next = loop_svc
        .start_session(SessionConfig::default())
        .await
        .unwrap();
    assert_eq!(next.session.snapshot().total_questions, 4);
}

#[tokio::test]
async fn survival_run_updates_best_record_once() {
    let store = InMemoryStore::new();
    let loop_svc = service(&store);

    let mut started = loop_svc
        .start_session(SessionConfig::default().survival())
        .await
        .unwrap();
    let session = &mut started.session;
    for _ in 0..3 {
        let index = session.current_question().unwrap().correct_index();
        session.answer_question(index, false).unwrap();
        session.next_question();
    }
    let wrong = (session.current_question().unwrap().correct_index() + 1) % 4;
    assert!(session.answer_question(wrong, false).unwrap().finished);

    let finished = loop_svc.finish_session(session).await.unwrap();
    assert_eq!(finished.result.survival_count, 3);
    assert!(finished.new_survival_record);
    assert_eq!(loop_svc.settings().load().await.unwrap().survival_best_record(), 3);

    let progress = loop_svc.progress().load().await.unwrap();
    assert_eq!(progress.wrong_ids().len(), 1);

    let mut again = loop_svc
        .start_session(SessionConfig::default().survival())
        .await
        .unwrap();
    let session = &mut again.session;
    let wrong = (session.current_question().unwrap().correct_index() + 1) % 4;
    session.answer_question(wrong, false).unwrap();
    let finished = loop_svc.finish_session(session).await.unwrap();
    assert!(!finished.new_survival_record);
}

#[tokio::test]
async fn empty_review_session_persists_nothing() {
    let store = InMemoryStore::new();
    let loop_svc = service(&store);

    let started = loop_svc
        .start_session(SessionConfig::for_pool(PoolSelector::Review))
        .await
        .unwrap();
    assert!(started.session.is_finished());

    let finished = loop_svc.finish_session(&started.session).await.unwrap();
    assert!(finished.result.is_empty());
    assert!(store.get_item(keys::GAME_HISTORY).await.unwrap().is_none());
    assert!(store.get_item(keys::RANK).await.unwrap().is_none());
}

#[tokio::test]
async fn unfinished_session_is_rejected() {
    let store = InMemoryStore::new();
    let loop_svc = service(&store);
    let started = loop_svc.start_session(SessionConfig::default()).await.unwrap();

    let err = loop_svc.finish_session(&started.session).await.unwrap_err();
    assert!(matches!(err, SessionError::NotFinished));
}

#[tokio::test]
async fn timeout_counts_as_wrong_in_progress() {
    let store = InMemoryStore::new();
    let loop_svc = service(&store);
    let config = SessionConfig::default().with_question_count(1).time_attack(Some(1));

    let mut started = loop_svc.start_session(config).await.unwrap();
    let handle = started.countdown.unwrap();
    let session = &mut started.session;
    assert!(matches!(session.tick(handle), services::Tick::Expired(_)));
    assert_eq!(session.next_question(), Advance::Finished);

    let finished = loop_svc.finish_session(session).await.unwrap();
    assert_eq!(finished.result.answers[0].answer_type, AnswerType::Wrong);
    assert!(finished.result.answers[0].is_timeout());
    assert_eq!(loop_svc.progress().load().await.unwrap().wrong_ids().len(), 1);
}

struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

#[tokio::test]
async fn store_failures_propagate() {
    let loop_svc = QuizLoopService::new(Clock::default(), catalog(), Arc::new(FailingStore));

    let err = loop_svc.start_session(SessionConfig::default()).await.unwrap_err();

    assert!(matches!(err, SessionError::Settings(_)));
}
