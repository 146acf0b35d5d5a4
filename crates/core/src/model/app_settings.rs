use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::session::{GameMode, PoolSelector};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("time attack limit must be one of 3, 5, 8 or 10 seconds, got {0}")]
    InvalidTimeAttackSeconds(u32),
}

//
// ─── TIME ATTACK ───────────────────────────────────────────────────────────────
//

/// Per-question countdown lengths offered to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum TimeAttackSeconds {
    Three,
    Five,
    #[default]
    Eight,
    Ten,
}

impl TimeAttackSeconds {
    pub const ALL: [TimeAttackSeconds; 4] = [
        TimeAttackSeconds::Three,
        TimeAttackSeconds::Five,
        TimeAttackSeconds::Eight,
        TimeAttackSeconds::Ten,
    ];

    #[must_use]
    pub fn secs(self) -> u32 {
        match self {
            TimeAttackSeconds::Three => 3,
            TimeAttackSeconds::Five => 5,
            TimeAttackSeconds::Eight => 8,
            TimeAttackSeconds::Ten => 10,
        }
    }
}

impl From<TimeAttackSeconds> for u32 {
    fn from(value: TimeAttackSeconds) -> Self {
        value.secs()
    }
}

impl TryFrom<u32> for TimeAttackSeconds {
    type Error = SettingsError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        TimeAttackSeconds::ALL
            .into_iter()
            .find(|s| s.secs() == value)
            .ok_or(SettingsError::InvalidTimeAttackSeconds(value))
    }
}

//
// ─── LAST PLAYED ───────────────────────────────────────────────────────────────
//

/// What the player started most recently, offered as a quick restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastPlayedMode {
    pub mode: GameMode,
    pub pool: PoolSelector,
    #[serde(default)]
    pub question_count: Option<usize>,
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AppSettingsDraft")]
pub struct AppSettings {
    combo_enabled: bool,
    time_attack_default: TimeAttackSeconds,
    survival_best_record: u32,
    last_played_mode: Option<LastPlayedMode>,
}

/// Partially specified settings; absent fields take the defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppSettingsDraft {
    pub combo_enabled: Option<bool>,
    pub time_attack_default: Option<u32>,
    pub survival_best_record: Option<u32>,
    pub last_played_mode: Option<LastPlayedMode>,
}

impl AppSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the draft over the defaults.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidTimeAttackSeconds` for a countdown length outside the offered set.
    pub fn validate(self) -> Result<AppSettings, SettingsError> {
        let defaults = AppSettings::default();
        let time_attack_default = match self.time_attack_default {
            Some(secs) => TimeAttackSeconds::try_from(secs)?,
            None => defaults.time_attack_default,
        };

        Ok(AppSettings {
            combo_enabled: self.combo_enabled.unwrap_or(defaults.combo_enabled),
            time_attack_default,
            survival_best_record: self
                .survival_best_record
                .unwrap_or(defaults.survival_best_record),
            last_played_mode: self.last_played_mode,
        })
    }
}

impl TryFrom<AppSettingsDraft> for AppSettings {
    type Error = SettingsError;

    fn try_from(draft: AppSettingsDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl AppSettings {
    #[must_use]
    pub fn combo_enabled(&self) -> bool {
        self.combo_enabled
    }

    #[must_use]
    pub fn time_attack_default(&self) -> TimeAttackSeconds {
        self.time_attack_default
    }

    #[must_use]
    pub fn survival_best_record(&self) -> u32 {
        self.survival_best_record
    }

    #[must_use]
    pub fn last_played_mode(&self) -> Option<&LastPlayedMode> {
        self.last_played_mode.as_ref()
    }

    pub fn toggle_combo(&mut self) {
        self.combo_enabled = !self.combo_enabled;
    }

    pub fn set_combo_enabled(&mut self, enabled: bool) {
        self.combo_enabled = enabled;
    }

    pub fn set_time_attack_default(&mut self, secs: TimeAttackSeconds) {
        self.time_attack_default = secs;
    }

    /// Stores `record` if it beats the current best; returns whether it did.
    pub fn update_survival_best(&mut self, record: u32) -> bool {
        if record > self.survival_best_record {
            self.survival_best_record = record;
            true
        } else {
            false
        }
    }

    pub fn set_last_played_mode(&mut self, mode: Option<LastPlayedMode>) {
        self.last_played_mode = mode;
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            combo_enabled: true,
            time_attack_default: TimeAttackSeconds::Eight,
            survival_best_record: 0,
            last_played_mode: None,
        }
    }
}
