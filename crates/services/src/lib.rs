#![forbid(unsafe_code)]

pub mod app_settings_service;
pub mod error;
pub mod history_service;
mod persistence;
pub mod progress_service;
pub mod rank_service;
pub mod sessions;

pub use tsubo_core::Clock;
pub use sessions as session;

pub use app_settings_service::AppSettingsService;
pub use error::{AppSettingsServiceError, SessionError};
pub use history_service::GameHistoryService;
pub use progress_service::LearningProgressService;
pub use rank_service::RankService;

pub use sessions::{
    Advance, AnswerOutcome, CountdownEnd, CountdownHandle, EngineSettings, FinishedGame,
    GameSession, QuizLoopService, SessionPhase, SessionSnapshot, SharedSession, StartedSession,
    Tick, run_countdown,
};
