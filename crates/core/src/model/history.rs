use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::ItemId;
use crate::model::session::{GameResult, percent};

/// Game results kept before the oldest are dropped.
pub const GAME_HISTORY_CAP: usize = 50;

/// Number of weak items surfaced to the caller.
pub const WEAK_ITEM_LIMIT: usize = 5;

/// Append-only record of finished games plus lifetime aggregates.
///
/// Aggregates cover every game ever saved, not only the retained `results`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameHistory {
    pub results: Vec<GameResult>,
    pub total_games: usize,
    pub total_correct: usize,
    pub total_unsure: usize,
    pub total_wrong: usize,
    pub total_questions: usize,
    /// Failures (wrong or unsure) per item.
    pub weak_item_counts: BTreeMap<ItemId, u32>,
}

impl GameHistory {
    /// Folds a finished game into the aggregates and the capped result list.
    pub fn record(&mut self, result: GameResult) {
        for answer in &result.answers {
            if answer.answer_type.is_failure() {
                *self
                    .weak_item_counts
                    .entry(answer.question.item().id().clone())
                    .or_insert(0) += 1;
            }
        }

        self.total_games += 1;
        self.total_correct += result.correct_answers;
        self.total_unsure += result.unsure_answers;
        self.total_wrong += result.wrong_answers;
        self.total_questions += result.total_questions;

        self.results.push(result);
        if self.results.len() > GAME_HISTORY_CAP {
            let overflow = self.results.len() - GAME_HISTORY_CAP;
            self.results.drain(..overflow);
        }
    }

    /// Lifetime correct rate in percent.
    #[must_use]
    pub fn average_score(&self) -> u32 {
        percent(self.total_correct, self.total_questions)
    }

    /// Best per-game correct rate among retained results with at least one question.
    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.results
            .iter()
            .filter(|r| !r.is_empty())
            .map(GameResult::score_percent)
            .max()
            .unwrap_or(0)
    }

    /// Items failed most often, worst first; ties resolve by id.
    #[must_use]
    pub fn weak_item_ids(&self) -> Vec<ItemId> {
        let mut counts: Vec<(&ItemId, u32)> =
            self.weak_item_counts.iter().map(|(id, n)| (id, *n)).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        counts
            .into_iter()
            .take(WEAK_ITEM_LIMIT)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AnswerRecord, AnswerType, Category, Item, Question, SessionConfig, SessionId,
    };
    use crate::time::fixed_now;

    fn answer(id: &str, answer_type: AnswerType) -> AnswerRecord {
        let item = Item::new(ItemId::new(id), id, "", "", "", Category::Trunk).unwrap();
        let options = vec![id.to_owned(), "x".into(), "y".into(), "z".into()];
        AnswerRecord {
            question: Question::new(item, options, 0).unwrap(),
            selected_index: Some(0),
            answer_type,
        }
    }

    fn result(answers: Vec<AnswerRecord>) -> GameResult {
        let total = answers.len();
        GameResult::from_answers(
            SessionId::new_v4(),
            total,
            answers,
            fixed_now(),
            &SessionConfig::default(),
            0,
        )
    }

    #[test]
    fn record_updates_aggregates_and_weak_counts() {
        let mut history = GameHistory::default();
        history.record(result(vec![
            answer("A", AnswerType::Correct),
            answer("B", AnswerType::Wrong),
            answer("C", AnswerType::Unsure),
        ]));
        history.record(result(vec![answer("B", AnswerType::Unsure)]));

        assert_eq!(history.total_games, 2);
        assert_eq!(history.total_correct, 1);
        assert_eq!(history.total_unsure, 2);
        assert_eq!(history.total_wrong, 1);
        assert_eq!(history.total_questions, 4);
        assert_eq!(history.weak_item_counts[&ItemId::new("B")], 2);
        assert_eq!(history.weak_item_ids()[0], ItemId::new("B"));
        assert!(!history.weak_item_counts.contains_key(&ItemId::new("A")));
    }

    #[test]
    fn scores_skip_empty_games() {
        let mut history = GameHistory::default();
        assert_eq!(history.average_score(), 0);
        assert_eq!(history.best_score(), 0);

        history.record(result(Vec::new()));
        history.record(result(vec![
            answer("A", AnswerType::Correct),
            answer("B", AnswerType::Wrong),
        ]));
        history.record(result(vec![
            answer("A", AnswerType::Correct),
            answer("B", AnswerType::Correct),
            answer("C", AnswerType::Wrong),
        ]));

        assert_eq!(history.best_score(), 67);
        assert_eq!(history.average_score(), 60);
    }

    #[test]
    fn results_are_capped_but_totals_are_not() {
        let mut history = GameHistory::default();
        for _ in 0..(GAME_HISTORY_CAP + 3) {
            history.record(result(vec![answer("A", AnswerType::Correct)]));
        }
        assert_eq!(history.results.len(), GAME_HISTORY_CAP);
        assert_eq!(history.total_games, GAME_HISTORY_CAP + 3);
    }

    #[test]
    fn weak_items_are_limited() {
        let mut history = GameHistory::default();
        let answers = ["A", "B", "C", "D", "E", "F", "G"]
            .into_iter()
            .map(|id| answer(id, AnswerType::Wrong))
            .collect();
        history.record(result(answers));
        assert_eq!(history.weak_item_ids().len(), WEAK_ITEM_LIMIT);
    }
}
