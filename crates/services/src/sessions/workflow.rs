use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;

use storage::KeyValueStore;
use tsubo_core::Clock;
use tsubo_core::model::{
    Catalog, GameMode, GameResult, LastPlayedMode, Rank, SessionConfig,
};

use super::countdown::CountdownHandle;
use super::engine::{EngineSettings, GameSession};
use crate::app_settings_service::AppSettingsService;
use crate::error::SessionError;
use crate::history_service::GameHistoryService;
use crate::progress_service::LearningProgressService;
use crate::rank_service::RankService;

/// A session started from persisted settings and progress.
#[derive(Debug)]
pub struct StartedSession {
    pub session: GameSession,
    /// Present when time attack is on; hand it to `run_countdown`.
    pub countdown: Option<CountdownHandle>,
}

/// What finishing a session persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedGame {
    pub result: GameResult,
    pub rank_up: Option<&'static Rank>,
    pub new_survival_record: bool,
}

/// Orchestrates session start and the persistence that follows a finished game.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    catalog: Arc<Catalog>,
    progress: LearningProgressService,
    history: GameHistoryService,
    ranks: RankService,
    settings: AppSettingsService,
    seed: Option<u64>,
    rounds: Arc<AtomicU64>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, catalog: Arc<Catalog>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            clock,
            catalog,
            progress: LearningProgressService::new(Arc::clone(&store)).with_clock(clock),
            history: GameHistoryService::new(Arc::clone(&store)),
            ranks: RankService::new(Arc::clone(&store)),
            settings: AppSettingsService::new(store),
            seed: None,
            rounds: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Make runs reproducible: the n-th session started is seeded with `seed + n`,
    /// so each round deals differently but a rerun repeats the same rounds.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.rounds.store(0, Ordering::Relaxed);
        self
    }

    #[must_use]
    pub fn progress(&self) -> &LearningProgressService {
        &self.progress
    }

    #[must_use]
    pub fn history(&self) -> &GameHistoryService {
        &self.history
    }

    #[must_use]
    pub fn ranks(&self) -> &RankService {
        &self.ranks
    }

    #[must_use]
    pub fn settings(&self) -> &AppSettingsService {
        &self.settings
    }

    /// Start a session with the stored settings and progress, and remember it as
    /// the last played mode.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for storage failures.
    pub async fn start_session(&self, config: SessionConfig) -> Result<StartedSession, SessionError> {
        let settings = self.settings.load().await?;
        let progress = self.progress.load().await?;

        let mut session = self.new_session(EngineSettings::from(&settings));
        let countdown = session.start_game(config.clone(), &progress);

        let last = LastPlayedMode {
            mode: config.mode(),
            pool: config.pool,
            question_count: (!config.is_survival_mode).then_some(config.question_count),
        };
        self.settings.save_last_played_mode(last).await?;

        Ok(StartedSession { session, countdown })
    }

    /// Persist a finished session: learning progress, game history, rank, and
    /// the survival best. A session that never had a question persists nothing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotStarted` for an idle session,
    /// `SessionError::NotFinished` while it is still running, or a storage error.
    pub async fn finish_session(&self, session: &GameSession) -> Result<FinishedGame, SessionError> {
        let result = session.game_result().ok_or(SessionError::NotStarted)?;
        if !session.is_finished() {
            return Err(SessionError::NotFinished);
        }
        if result.is_empty() {
            return Ok(FinishedGame {
                result,
                rank_up: None,
                new_survival_record: false,
            });
        }

        self.progress.record_result(&result).await?;
        self.history.save_result(result.clone()).await?;
        let credit = u32::try_from(result.correct_answers).unwrap_or(u32::MAX);
        let change = self.ranks.add_correct(credit).await?;

        let new_survival_record = match result.mode {
            GameMode::Survival => {
                let record = u32::try_from(result.survived_answers()).unwrap_or(u32::MAX);
                self.settings.update_survival_best(record).await?
            }
            GameMode::Normal => false,
        };

        info!(
            session_id = %result.session_id,
            score_percent = result.score_percent(),
            rank_up = change.new_rank.is_some(),
            new_survival_record,
            "session persisted"
        );

        Ok(FinishedGame {
            result,
            rank_up: change.new_rank,
            new_survival_record,
        })
    }

    fn new_session(&self, settings: EngineSettings) -> GameSession {
        let session = GameSession::new(Arc::clone(&self.catalog))
            .with_settings(settings)
            .with_clock(self.clock);
        match self.seed {
            Some(seed) => {
                let round = self.rounds.fetch_add(1, Ordering::Relaxed);
                session.with_seed(seed.wrapping_add(round))
            }
            None => session,
        }
    }
}
