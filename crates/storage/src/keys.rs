//! Well-known keys of the persisted snapshots.

pub const MASTERED: &str = "tsubo_mastered";
pub const UNSURE: &str = "tsubo_unsure";
pub const WRONG: &str = "tsubo_wrong";
pub const LEARNING_HISTORY: &str = "tsubo_learning_history";
pub const GAME_HISTORY: &str = "tsubo_game_history";
pub const APP_SETTINGS: &str = "@tsubomi_app_settings";
pub const RANK: &str = "@tsubomi_rank_system";
