mod app_settings;
mod catalog;
mod history;
mod ids;
mod item;
mod progress;
mod question;
mod rank;
mod session;

pub use ids::{ItemId, ParseIdError, SessionId};

pub use app_settings::{
    AppSettings, AppSettingsDraft, LastPlayedMode, SettingsError, TimeAttackSeconds,
};
pub use catalog::{Catalog, CatalogError, MIN_CATALOG_SIZE};
pub use history::{GAME_HISTORY_CAP, GameHistory, WEAK_ITEM_LIMIT};
pub use item::{Category, Item, ItemError, Meridian};
pub use progress::{LEARNING_HISTORY_CAP, LearningHistory, LearningProgress, LearningRecord};
pub use question::{AnswerRecord, AnswerType, OPTION_COUNT, Question, QuestionError};
pub use rank::{RANKS, Rank, RankChange, RankProgress, rank_for};
pub use session::{GameMode, GameResult, PoolSelector, SessionConfig};
