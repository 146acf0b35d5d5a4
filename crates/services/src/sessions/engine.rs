use std::fmt;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use tsubo_core::Clock;
use tsubo_core::model::{
    AnswerRecord, AnswerType, AppSettings, Catalog, GameMode, GameResult, Item,
    LearningProgress, Question, SessionConfig, SessionId, TimeAttackSeconds,
};

use super::countdown::{Countdown, CountdownHandle, CountdownTick};
use super::pool::derive_pool;
use super::question::{draw_distinct, generate_question, sample_one};
use super::scoring::ComboTracker;
use super::view::{SessionPhase, SessionSnapshot};

//
// ─── SETTINGS & OUTCOMES ───────────────────────────────────────────────────────
//

/// Settings the engine reads at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub combo_enabled: bool,
    /// Countdown used when time attack is requested without an explicit limit.
    pub time_attack_default: TimeAttackSeconds,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&AppSettings::default())
    }
}

impl From<&AppSettings> for EngineSettings {
    fn from(settings: &AppSettings) -> Self {
        Self {
            combo_enabled: settings.combo_enabled(),
            time_attack_default: settings.time_attack_default(),
        }
    }
}

/// What recording an answer did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub answer_type: AnswerType,
    pub correct_index: usize,
    pub combo_count: u32,
    pub bonus_awarded: u32,
    /// The answer ended the session (a wrong answer in survival mode).
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Nothing to advance: idle, finished, or the current question is unanswered.
    Ignored,
    /// A new question is live, with its countdown handle when time attack is on.
    Next(Option<CountdownHandle>),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Stale handle, or no unanswered question to count down.
    Ignored,
    Running(u32),
    /// The countdown hit zero and the question was recorded as wrong.
    Expired(AnswerOutcome),
}

//
// ─── RUNNING GAME ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy)]
struct Resolution {
    selected: Option<usize>,
    answer_type: AnswerType,
}

#[derive(Debug)]
struct SurvivalRun {
    pool: Vec<Item>,
    count: usize,
}

#[derive(Debug)]
struct Game {
    id: SessionId,
    config: SessionConfig,
    questions: Vec<Question>,
    current: usize,
    answers: Vec<AnswerRecord>,
    resolution: Option<Resolution>,
    combo: ComboTracker,
    survival: Option<SurvivalRun>,
    countdown: Countdown,
    timed_out: bool,
    is_active: bool,
    is_finished: bool,
}

impl Game {
    fn new(id: SessionId, config: SessionConfig, combo: ComboTracker, countdown: Countdown) -> Self {
        Self {
            id,
            config,
            questions: Vec::new(),
            current: 0,
            answers: Vec::new(),
            resolution: None,
            combo,
            survival: None,
            countdown,
            timed_out: false,
            is_active: false,
            is_finished: false,
        }
    }

    fn phase(&self) -> SessionPhase {
        if self.is_finished {
            SessionPhase::Finished
        } else if self.resolution.is_some() {
            SessionPhase::Resolved
        } else {
            SessionPhase::Active
        }
    }

    fn survival_count(&self) -> usize {
        self.survival.as_ref().map_or(0, |run| run.count)
    }

    fn total_questions(&self) -> usize {
        match &self.survival {
            Some(run) => run.count + 1,
            None => self.questions.len(),
        }
    }

    fn count(&self, kind: AnswerType) -> usize {
        self.answers.iter().filter(|a| a.answer_type == kind).count()
    }

    fn score(&self) -> u32 {
        let correct = u32::try_from(self.count(AnswerType::Correct)).unwrap_or(u32::MAX);
        correct.saturating_add(self.combo.bonus_points())
    }

    /// Mode-specific termination, run after every recorded answer.
    fn after_answer(&mut self, answer_type: AnswerType) -> bool {
        match self.config.mode() {
            GameMode::Survival if answer_type == AnswerType::Wrong => {
                self.finish();
                true
            }
            GameMode::Survival | GameMode::Normal => false,
        }
    }

    fn finish(&mut self) {
        self.countdown.cancel();
        self.is_active = false;
        self.is_finished = true;
        info!(
            session_id = %self.id,
            total = self.total_questions(),
            correct = self.count(AnswerType::Correct),
            unsure = self.count(AnswerType::Unsure),
            wrong = self.count(AnswerType::Wrong),
            score = self.score(),
            "quiz session finished"
        );
    }
}

fn build_question(item: &Item, catalog: &Catalog, rng: &mut StdRng) -> Option<Question> {
    match generate_question(item, catalog, rng) {
        Ok(question) => Some(question),
        Err(err) => {
            warn!(item_id = %item.id(), error = %err, "could not build question");
            None
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Quiz session engine: one game at a time over a shared, read-only catalog.
///
/// Single-threaded by contract. Share it behind a lock when a countdown driver
/// runs alongside the caller.
pub struct GameSession {
    catalog: Arc<Catalog>,
    settings: EngineSettings,
    rng: StdRng,
    clock: Clock,
    game: Option<Game>,
}

impl GameSession {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            settings: EngineSettings::default(),
            rng: StdRng::from_os_rng(),
            clock: Clock::default(),
            game: None,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Seeds the RNG for reproducible question order.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Start a new session, discarding any previous one.
    ///
    /// `progress` is read once to derive the pool. An empty pool finishes the
    /// session immediately with zero questions. Returns the countdown handle
    /// when time attack is on.
    pub fn start_game(
        &mut self,
        config: SessionConfig,
        progress: &LearningProgress,
    ) -> Option<CountdownHandle> {
        self.reset_game();

        let id = SessionId::new_v4();
        let pool = derive_pool(&self.catalog, &config, progress);
        let limit = self.time_limit_for(&config);
        let combo = ComboTracker::new(self.settings.combo_enabled);
        let mut game = Game::new(id, config, combo, Countdown::new(id, limit));

        if game.config.is_survival_mode {
            let first = sample_one(&pool, &mut self.rng)
                .and_then(|item| build_question(item, &self.catalog, &mut self.rng));
            if let Some(question) = first {
                game.questions.push(question);
                game.survival = Some(SurvivalRun { pool, count: 0 });
            }
        } else {
            let count = game.config.question_count.min(pool.len());
            let drawn = draw_distinct(pool, count, &mut self.rng);
            game.questions = drawn
                .iter()
                .filter_map(|item| build_question(item, &self.catalog, &mut self.rng))
                .collect();
        }

        if game.questions.is_empty() {
            warn!(session_id = %id, pool = %game.config.pool, "no questions available");
            game.finish();
            self.game = Some(game);
            return None;
        }

        game.is_active = true;
        let handle = game.countdown.arm();
        info!(
            session_id = %id,
            pool = %game.config.pool,
            total = game.total_questions(),
            survival = game.config.is_survival_mode,
            countdown = game.countdown.is_enabled(),
            time_limit = ?limit,
            "quiz session started"
        );
        self.game = Some(game);
        handle
    }

    /// Record an answer for the current question.
    ///
    /// Returns `None` without changing anything when there is no live question
    /// or it is already answered.
    pub fn answer_question(&mut self, selected_index: usize, is_unsure: bool) -> Option<AnswerOutcome> {
        self.resolve(Some(selected_index), is_unsure)
    }

    /// Move past the answered question.
    ///
    /// Survival mode samples a fresh question from the start-time pool; normal
    /// mode steps through the fixed list and finishes after the last one.
    pub fn next_question(&mut self) -> Advance {
        let Some(game) = self.game.as_mut() else {
            return Advance::Ignored;
        };
        if game.is_finished || game.resolution.is_none() {
            return Advance::Ignored;
        }

        if let Some(run) = game.survival.as_ref() {
            let next = sample_one(&run.pool, &mut self.rng)
                .and_then(|item| build_question(item, &self.catalog, &mut self.rng));
            let Some(question) = next else {
                game.finish();
                return Advance::Finished;
            };
            game.questions = vec![question];
            game.current = 0;
            if let Some(run) = game.survival.as_mut() {
                run.count += 1;
            }
        } else if game.current + 1 < game.questions.len() {
            game.current += 1;
        } else {
            game.finish();
            return Advance::Finished;
        }

        game.resolution = None;
        game.timed_out = false;
        let handle = game.countdown.arm();
        debug!(
            session_id = %game.id,
            index = game.current,
            survival_count = game.survival_count(),
            "advanced to next question"
        );
        Advance::Next(handle)
    }

    /// One second of the current countdown; on zero the question is recorded as wrong.
    pub fn tick(&mut self, handle: CountdownHandle) -> Tick {
        let Some(game) = self.game.as_mut() else {
            return Tick::Ignored;
        };
        if !game.is_active || game.resolution.is_some() {
            return Tick::Ignored;
        }

        match game.countdown.tick(handle) {
            CountdownTick::Stale => Tick::Ignored,
            CountdownTick::Running(remaining) => Tick::Running(remaining),
            CountdownTick::Expired => {
                game.timed_out = true;
                debug!(session_id = %game.id, "countdown expired");
                self.resolve(None, false).map_or(Tick::Ignored, Tick::Expired)
            }
        }
    }

    /// Drop the session and invalidate its countdown handles.
    pub fn reset_game(&mut self) {
        if let Some(mut game) = self.game.take() {
            game.countdown.cancel();
            debug!(session_id = %game.id, "session reset");
        }
    }

    /// Summary of the session so far; `None` when idle.
    ///
    /// Meant for finished sessions, but callable earlier to get a partial summary.
    #[must_use]
    pub fn game_result(&self) -> Option<GameResult> {
        let game = self.game.as_ref()?;
        Some(GameResult::from_answers(
            game.id,
            game.total_questions(),
            game.answers.clone(),
            self.clock.now(),
            &game.config,
            game.survival_count(),
        ))
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        let Some(game) = self.game.as_ref() else {
            return SessionSnapshot::idle();
        };
        SessionSnapshot {
            phase: game.phase(),
            session_id: Some(game.id),
            config: Some(&game.config),
            question: game.questions.get(game.current),
            question_index: game.current,
            total_questions: game.total_questions(),
            score: game.score(),
            correct_count: game.count(AnswerType::Correct),
            unsure_count: game.count(AnswerType::Unsure),
            wrong_count: game.count(AnswerType::Wrong),
            selected_answer: game.resolution.map(|r| r.selected),
            current_answer_type: game.resolution.map(|r| r.answer_type),
            show_result: game.resolution.is_some(),
            time_remaining: game.countdown.remaining(),
            is_time_out: game.timed_out,
            combo_count: game.combo.count(),
            bonus_points: game.combo.bonus_points(),
            survival_count: game.survival_count(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.game.as_ref().map_or(SessionPhase::Idle, Game::phase)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.game.as_ref().is_some_and(|g| g.is_finished)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        let game = self.game.as_ref()?;
        game.questions.get(game.current)
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        self.game.as_ref().map_or(&[], |g| g.answers.as_slice())
    }

    /// Handle of the live countdown, if one is armed.
    #[must_use]
    pub fn countdown_handle(&self) -> Option<CountdownHandle> {
        self.game.as_ref().and_then(|g| g.countdown.handle())
    }

    fn time_limit_for(&self, config: &SessionConfig) -> Option<u32> {
        config.is_time_attack_mode.then(|| {
            config
                .time_limit_secs
                .unwrap_or_else(|| self.settings.time_attack_default.secs())
        })
    }

    fn resolve(&mut self, selected: Option<usize>, is_unsure: bool) -> Option<AnswerOutcome> {
        let game = self.game.as_mut()?;
        if !game.is_active || game.resolution.is_some() {
            return None;
        }
        let question = game.questions.get(game.current)?.clone();
        let correct_index = question.correct_index();
        let answer_type = AnswerType::classify(selected, correct_index, is_unsure);

        game.countdown.cancel();
        game.resolution = Some(Resolution {
            selected,
            answer_type,
        });
        game.answers.push(AnswerRecord {
            question,
            selected_index: selected,
            answer_type,
        });
        let bonus_awarded = game.combo.record(answer_type);
        let finished = game.after_answer(answer_type);

        debug!(
            session_id = %game.id,
            index = game.current,
            ?answer_type,
            combo = game.combo.count(),
            bonus_awarded,
            "answer recorded"
        );

        Some(AnswerOutcome {
            answer_type,
            correct_index,
            combo_count: game.combo.count(),
            bonus_awarded,
            finished,
        })
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("catalog_len", &self.catalog.len())
            .field("settings", &self.settings)
            .field("phase", &self.phase())
            .field("answers_len", &self.answers().len())
            .finish_non_exhaustive()
    }
}
