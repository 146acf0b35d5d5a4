use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::SessionId;
use crate::model::item::{Category, Meridian};
use crate::model::question::{AnswerRecord, AnswerType};

//
// ─── POOL SELECTOR ─────────────────────────────────────────────────────────────
//

/// Which part of the catalog a session draws its questions from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PoolSelector {
    #[default]
    All,
    /// Items currently in the unsure or wrong bucket.
    Review,
    Category(Category),
    Meridian(Meridian),
}

impl PoolSelector {
    /// Review sessions draw from failures only, so mastered items never need excluding.
    #[must_use]
    pub fn excludes_mastered_by_default(self) -> bool {
        !matches!(self, PoolSelector::Review)
    }
}

impl fmt::Display for PoolSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolSelector::All => f.write_str("all"),
            PoolSelector::Review => f.write_str("review"),
            PoolSelector::Category(category) => write!(f, "category:{category}"),
            PoolSelector::Meridian(meridian) => write!(f, "meridian:{meridian}"),
        }
    }
}

//
// ─── SESSION CONFIG ────────────────────────────────────────────────────────────
//

/// Normal sessions have a fixed question list; survival runs until the first wrong answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Normal,
    Survival,
}

/// Parameters of one session, fixed for its lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub pool: PoolSelector,
    pub exclude_mastered: bool,
    pub question_count: usize,
    pub is_survival_mode: bool,
    pub is_time_attack_mode: bool,
    /// Falls back to the settings default when time attack is on and this is `None`.
    pub time_limit_secs: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pool: PoolSelector::All,
            exclude_mastered: true,
            question_count: 10,
            is_survival_mode: false,
            is_time_attack_mode: false,
            time_limit_secs: None,
        }
    }
}

impl SessionConfig {
    /// Default config for the given selector, with mastered items excluded where that applies.
    #[must_use]
    pub fn for_pool(pool: PoolSelector) -> Self {
        Self {
            pool,
            exclude_mastered: pool.excludes_mastered_by_default(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_question_count(mut self, count: usize) -> Self {
        self.question_count = count;
        self
    }

    #[must_use]
    pub fn with_exclude_mastered(mut self, exclude: bool) -> Self {
        self.exclude_mastered = exclude;
        self
    }

    #[must_use]
    pub fn survival(mut self) -> Self {
        self.is_survival_mode = true;
        self
    }

    #[must_use]
    pub fn time_attack(mut self, limit_secs: Option<u32>) -> Self {
        self.is_time_attack_mode = true;
        self.time_limit_secs = limit_secs;
        self
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        if self.is_survival_mode {
            GameMode::Survival
        } else {
            GameMode::Normal
        }
    }
}

//
// ─── GAME RESULT ───────────────────────────────────────────────────────────────
//

/// Summary of a session, handed to the caller for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub session_id: SessionId,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub unsure_answers: usize,
    pub wrong_answers: usize,
    pub answers: Vec<AnswerRecord>,
    pub timestamp: DateTime<Utc>,
    pub pool: PoolSelector,
    pub mode: GameMode,
    /// Questions successfully passed in survival mode; always 0 for normal sessions.
    #[serde(default)]
    pub survival_count: usize,
}

impl GameResult {
    /// Assembles counts from the answer log.
    #[must_use]
    pub fn from_answers(
        session_id: SessionId,
        total_questions: usize,
        answers: Vec<AnswerRecord>,
        timestamp: DateTime<Utc>,
        config: &SessionConfig,
        survival_count: usize,
    ) -> Self {
        let count = |kind: AnswerType| answers.iter().filter(|a| a.answer_type == kind).count();
        Self {
            session_id,
            total_questions,
            correct_answers: count(AnswerType::Correct),
            unsure_answers: count(AnswerType::Unsure),
            wrong_answers: count(AnswerType::Wrong),
            answers,
            timestamp,
            pool: config.pool,
            mode: config.mode(),
            survival_count,
        }
    }

    /// True for the "nothing to play" outcome of an empty pool.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_questions == 0
    }

    /// Correct answers as a rounded percentage of the questions; 0 for an empty session.
    #[must_use]
    pub fn score_percent(&self) -> u32 {
        percent(self.correct_answers, self.total_questions)
    }

    /// Answers that did not end a survival run.
    #[must_use]
    pub fn survived_answers(&self) -> usize {
        self.correct_answers + self.unsure_answers
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Item, ItemId, Question};
    use crate::time::fixed_now;

    fn record(answer_type: AnswerType) -> AnswerRecord {
        let item = Item::new(ItemId::new("HT7"), "神門", "", "", "", Category::UpperLimb).unwrap();
        let options = ["神門", "内関", "外関", "列欠"].map(String::from).to_vec();
        AnswerRecord {
            question: Question::new(item, options, 0).unwrap(),
            selected_index: Some(0),
            answer_type,
        }
    }

    #[test]
    fn review_selector_keeps_mastered_by_default() {
        assert!(!SessionConfig::for_pool(PoolSelector::Review).exclude_mastered);
        assert!(SessionConfig::for_pool(PoolSelector::Category(Category::Face)).exclude_mastered);
    }

    #[test]
    fn pool_selector_serializes_with_tag() {
        let json = serde_json::to_string(&PoolSelector::Meridian(Meridian::Gb)).unwrap();
        assert_eq!(json, r#"{"kind":"meridian","value":"GB"}"#);
        let all: PoolSelector = serde_json::from_str(r#"{"kind":"all"}"#).unwrap();
        assert_eq!(all, PoolSelector::All);
    }

    #[test]
    fn result_counts_answer_types() {
        let answers = vec![
            record(AnswerType::Correct),
            record(AnswerType::Correct),
            record(AnswerType::Unsure),
            record(AnswerType::Wrong),
        ];
        let result = GameResult::from_answers(
            SessionId::new_v4(),
            4,
            answers,
            fixed_now(),
            &SessionConfig::default(),
            0,
        );
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.unsure_answers, 1);
        assert_eq!(result.wrong_answers, 1);
        assert_eq!(result.score_percent(), 50);
        assert_eq!(result.survived_answers(), 3);
    }

    #[test]
    fn empty_result_scores_zero() {
        let result = GameResult::from_answers(
            SessionId::new_v4(),
            0,
            Vec::new(),
            fixed_now(),
            &SessionConfig::for_pool(PoolSelector::Review),
            0,
        );
        assert!(result.is_empty());
        assert_eq!(result.score_percent(), 0);
        assert_eq!(result.pool, PoolSelector::Review);
    }
}
