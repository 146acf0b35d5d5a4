use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::ItemId;
use crate::model::item::{Category, Item};
use crate::model::question::AnswerType;

/// Learning records kept before the oldest are dropped.
pub const LEARNING_HISTORY_CAP: usize = 500;

//
// ─── PROGRESS BUCKETS ──────────────────────────────────────────────────────────
//

/// Mutually exclusive mastered / unsure / wrong buckets.
///
/// An item lives in at most one bucket; recording a new answer moves it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningProgress {
    #[serde(default)]
    mastered_ids: Vec<ItemId>,
    #[serde(default)]
    unsure_ids: Vec<ItemId>,
    #[serde(default)]
    wrong_ids: Vec<ItemId>,
}

impl LearningProgress {
    /// Builds progress from raw bucket lists, keeping the latest bucket for an id listed twice.
    #[must_use]
    pub fn from_buckets(mastered: Vec<ItemId>, unsure: Vec<ItemId>, wrong: Vec<ItemId>) -> Self {
        let mut progress = Self::default();
        for id in mastered {
            progress.record(&id, AnswerType::Correct);
        }
        for id in unsure {
            progress.record(&id, AnswerType::Unsure);
        }
        for id in wrong {
            progress.record(&id, AnswerType::Wrong);
        }
        progress
    }

    #[must_use]
    pub fn mastered_ids(&self) -> &[ItemId] {
        &self.mastered_ids
    }

    #[must_use]
    pub fn unsure_ids(&self) -> &[ItemId] {
        &self.unsure_ids
    }

    #[must_use]
    pub fn wrong_ids(&self) -> &[ItemId] {
        &self.wrong_ids
    }

    #[must_use]
    pub fn is_mastered(&self, id: &ItemId) -> bool {
        self.mastered_ids.contains(id)
    }

    /// Moves `id` into the bucket matching `answer_type`.
    pub fn record(&mut self, id: &ItemId, answer_type: AnswerType) {
        self.mastered_ids.retain(|x| x != id);
        self.unsure_ids.retain(|x| x != id);
        self.wrong_ids.retain(|x| x != id);

        let bucket = match answer_type {
            AnswerType::Correct => &mut self.mastered_ids,
            AnswerType::Unsure => &mut self.unsure_ids,
            AnswerType::Wrong => &mut self.wrong_ids,
        };
        bucket.push(id.clone());
    }

    /// Unsure followed by wrong ids, duplicates collapsed.
    #[must_use]
    pub fn review_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = Vec::with_capacity(self.unsure_ids.len() + self.wrong_ids.len());
        for id in self.unsure_ids.iter().chain(&self.wrong_ids) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }

    pub fn unmastered_ids<'a>(&'a self, all: &'a [ItemId]) -> impl Iterator<Item = &'a ItemId> {
        all.iter().filter(|id| !self.is_mastered(id))
    }
}

//
// ─── LEARNING HISTORY ──────────────────────────────────────────────────────────
//

/// One answered question, as kept in the learning log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningRecord {
    pub item_id: ItemId,
    pub item_name: String,
    pub answer_type: AnswerType,
    pub timestamp: DateTime<Utc>,
    pub category: Category,
}

impl LearningRecord {
    #[must_use]
    pub fn new(item: &Item, answer_type: AnswerType, timestamp: DateTime<Utc>) -> Self {
        Self {
            item_id: item.id().clone(),
            item_name: item.name().to_owned(),
            answer_type,
            timestamp,
            category: item.category(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningHistory {
    #[serde(default)]
    records: Vec<LearningRecord>,
}

impl LearningHistory {
    #[must_use]
    pub fn records(&self) -> &[LearningRecord] {
        &self.records
    }

    /// Appends a record, dropping the oldest beyond `LEARNING_HISTORY_CAP`.
    pub fn push(&mut self, record: LearningRecord) {
        self.records.push(record);
        if self.records.len() > LEARNING_HISTORY_CAP {
            let overflow = self.records.len() - LEARNING_HISTORY_CAP;
            self.records.drain(..overflow);
        }
    }

    pub fn on_day(&self, day: NaiveDate) -> impl Iterator<Item = &LearningRecord> {
        self.records
            .iter()
            .filter(move |record| record.timestamp.date_naive() == day)
    }

    /// Latest `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &LearningRecord> {
        self.records.iter().rev().take(limit)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
