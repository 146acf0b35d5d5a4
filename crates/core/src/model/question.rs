use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::item::Item;

/// Every question shows the target name plus three distractors.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question needs exactly {expected} options, got {actual}")]
    OptionCount { expected: usize, actual: usize },

    #[error("correct index {0} is out of range")]
    CorrectIndexOutOfRange(usize),

    #[error("option at the correct index does not match the item name")]
    CorrectOptionMismatch,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question about one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionDraft")]
pub struct Question {
    item: Item,
    options: Vec<String>,
    correct_index: usize,
}

impl Question {
    /// # Errors
    ///
    /// Returns `QuestionError` unless there are exactly `OPTION_COUNT` options and the
    /// option at `correct_index` equals the item's name.
    pub fn new(item: Item, options: Vec<String>, correct_index: usize) -> Result<Self, QuestionError> {
        if options.len() != OPTION_COUNT {
            return Err(QuestionError::OptionCount {
                expected: OPTION_COUNT,
                actual: options.len(),
            });
        }
        let Some(correct) = options.get(correct_index) else {
            return Err(QuestionError::CorrectIndexOutOfRange(correct_index));
        };
        if correct != item.name() {
            return Err(QuestionError::CorrectOptionMismatch);
        }

        Ok(Self {
            item,
            options,
            correct_index,
        })
    }

    #[must_use]
    pub fn item(&self) -> &Item {
        &self.item
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }
}

/// Stored shape of a question, checked by `Question::new` on the way in.
#[derive(Deserialize)]
struct QuestionDraft {
    item: Item,
    options: Vec<String>,
    correct_index: usize,
}

impl TryFrom<QuestionDraft> for Question {
    type Error = QuestionError;

    fn try_from(draft: QuestionDraft) -> Result<Self, Self::Error> {
        Question::new(draft.item, draft.options, draft.correct_index)
    }
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// Classification of a single answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    Correct,
    Unsure,
    Wrong,
}

impl AnswerType {
    /// `unsure` wins over the selection; otherwise the selection decides.
    ///
    /// A missing selection (timeout) is always wrong unless flagged unsure.
    #[must_use]
    pub fn classify(selected: Option<usize>, correct_index: usize, is_unsure: bool) -> Self {
        if is_unsure {
            AnswerType::Unsure
        } else if selected == Some(correct_index) {
            AnswerType::Correct
        } else {
            AnswerType::Wrong
        }
    }

    /// Wrong and unsure answers both count as a failure for weak-item tracking.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, AnswerType::Unsure | AnswerType::Wrong)
    }
}

/// One entry of the session answer log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: Question,
    /// `None` when the countdown expired before an option was picked.
    pub selected_index: Option<usize>,
    pub answer_type: AnswerType,
}

impl AnswerRecord {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.selected_index.is_none()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, ItemId};

    fn hegu() -> Item {
        Item::new(ItemId::new("LI4"), "合谷", "ごうこく", "", "", Category::UpperLimb).unwrap()
    }

    fn options() -> Vec<String> {
        ["曲池", "合谷", "百会", "神門"].map(String::from).to_vec()
    }

    #[test]
    fn question_validates_correct_slot() {
        let q = Question::new(hegu(), options(), 1).unwrap();
        assert_eq!(q.correct_option(), "合谷");

        let err = Question::new(hegu(), options(), 0).unwrap_err();
        assert_eq!(err, QuestionError::CorrectOptionMismatch);

        let err = Question::new(hegu(), options(), 4).unwrap_err();
        assert_eq!(err, QuestionError::CorrectIndexOutOfRange(4));
    }

    #[test]
    fn question_requires_four_options() {
        let err = Question::new(hegu(), options()[..3].to_vec(), 1).unwrap_err();
        assert_eq!(
            err,
            QuestionError::OptionCount {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn stored_question_is_checked_on_load() {
        let q = Question::new(hegu(), options(), 1).unwrap();
        let json = serde_json::to_string(&q).unwrap();
        assert_eq!(serde_json::from_str::<Question>(&json).unwrap(), q);

        let out_of_range = json.replace("\"correct_index\":1", "\"correct_index\":9");
        assert!(serde_json::from_str::<Question>(&out_of_range).is_err());
        let mismatched = json.replace("\"correct_index\":1", "\"correct_index\":0");
        assert!(serde_json::from_str::<Question>(&mismatched).is_err());
    }

    #[test]
    fn classification_rules() {
        assert_eq!(AnswerType::classify(Some(2), 2, false), AnswerType::Correct);
        assert_eq!(AnswerType::classify(Some(2), 2, true), AnswerType::Unsure);
        assert_eq!(AnswerType::classify(Some(1), 2, true), AnswerType::Unsure);
        assert_eq!(AnswerType::classify(Some(1), 2, false), AnswerType::Wrong);
        assert_eq!(AnswerType::classify(None, 0, false), AnswerType::Wrong);
    }
}
