//! Shared error types for the services crate.

use thiserror::Error;

use storage::StorageError;
use tsubo_core::model::SettingsError;

/// Errors emitted by `AppSettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppSettingsServiceError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the quiz loop.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no session has been started")]
    NotStarted,
    #[error("session is still in progress")]
    NotFinished,
    #[error(transparent)]
    Settings(#[from] AppSettingsServiceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
