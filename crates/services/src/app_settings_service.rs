use std::sync::Arc;

use tracing::info;

use storage::{KeyValueStore, keys, save_json};
use tsubo_core::model::{AppSettings, AppSettingsDraft, LastPlayedMode, TimeAttackSeconds};

use crate::error::AppSettingsServiceError;
use crate::persistence::load_or_default;

#[derive(Clone)]
pub struct AppSettingsService {
    store: Arc<dyn KeyValueStore>,
}

impl AppSettingsService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load persisted settings (or defaults if missing or unreadable).
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<AppSettings, AppSettingsServiceError> {
        Ok(load_or_default(self.store.as_ref(), keys::APP_SETTINGS).await?)
    }

    /// Validate and persist new settings.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsServiceError` if validation fails or persistence fails.
    pub async fn save(&self, draft: AppSettingsDraft) -> Result<AppSettings, AppSettingsServiceError> {
        let settings = draft.validate()?;
        self.persist(&settings).await?;
        Ok(settings)
    }

    /// # Errors
    ///
    /// Returns `AppSettingsServiceError` on storage failures.
    pub async fn toggle_combo(&self) -> Result<AppSettings, AppSettingsServiceError> {
        self.update(AppSettings::toggle_combo).await
    }

    /// # Errors
    ///
    /// Returns `AppSettingsServiceError::Settings` for a length other than 3, 5, 8 or 10.
    pub async fn set_time_attack_default(&self, secs: u32) -> Result<AppSettings, AppSettingsServiceError> {
        let secs = TimeAttackSeconds::try_from(secs)?;
        self.update(|settings| settings.set_time_attack_default(secs)).await
    }

    /// Raise the survival best if `record` beats it. Returns whether it did.
    ///
    /// # Errors
    ///
    /// Returns `AppSettingsServiceError` on storage failures.
    pub async fn update_survival_best(&self, record: u32) -> Result<bool, AppSettingsServiceError> {
        let mut settings = self.load().await?;
        if !settings.update_survival_best(record) {
            return Ok(false);
        }
        self.persist(&settings).await?;
        info!(record, "new survival best");
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns `AppSettingsServiceError` on storage failures.
    pub async fn save_last_played_mode(&self, mode: LastPlayedMode) -> Result<(), AppSettingsServiceError> {
        self.update(|settings| settings.set_last_played_mode(Some(mode)))
            .await
            .map(|_| ())
    }

    async fn update(
        &self,
        change: impl FnOnce(&mut AppSettings),
    ) -> Result<AppSettings, AppSettingsServiceError> {
        let mut settings = self.load().await?;
        change(&mut settings);
        self.persist(&settings).await?;
        Ok(settings)
    }

    async fn persist(&self, settings: &AppSettings) -> Result<(), AppSettingsServiceError> {
        save_json(self.store.as_ref(), keys::APP_SETTINGS, settings).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use storage::InMemoryStore;
    use tsubo_core::model::{GameMode, PoolSelector};

    use super::*;

    fn service() -> (AppSettingsService, InMemoryStore) {
        let store = InMemoryStore::new();
        (AppSettingsService::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn missing_settings_load_as_defaults() {
        let (service, _) = service();
        let settings = service.load().await.unwrap();
        assert!(settings.combo_enabled());
        assert_eq!(settings.time_attack_default(), TimeAttackSeconds::Eight);
        assert_eq!(settings.survival_best_record(), 0);
    }

    #[tokio::test]
    async fn malformed_settings_fall_back_to_defaults() {
        let (service, store) = service();
        store.set_item(keys::APP_SETTINGS, "{\"timeAttack\":").await.unwrap();
        assert_eq!(service.load().await.unwrap(), AppSettings::default());
    }

    #[tokio::test]
    async fn partial_settings_merge_over_defaults() {
        let (service, store) = service();
        store
            .set_item(keys::APP_SETTINGS, r#"{"combo_enabled":false}"#)
            .await
            .unwrap();
        let settings = service.load().await.unwrap();
        assert!(!settings.combo_enabled());
        assert_eq!(settings.time_attack_default(), TimeAttackSeconds::Eight);
    }

    #[tokio::test]
    async fn toggle_and_time_attack_persist() {
        let (service, _) = service();
        service.toggle_combo().await.unwrap();
        service.set_time_attack_default(5).await.unwrap();

        let settings = service.load().await.unwrap();
        assert!(!settings.combo_enabled());
        assert_eq!(settings.time_attack_default(), TimeAttackSeconds::Five);
    }

    #[tokio::test]
    async fn invalid_time_attack_is_rejected() {
        let (service, _) = service();
        let err = service.set_time_attack_default(7).await.unwrap_err();
        assert!(matches!(err, AppSettingsServiceError::Settings(_)));
        assert_eq!(service.load().await.unwrap(), AppSettings::default());
    }

    #[tokio::test]
    async fn survival_best_only_moves_up() {
        let (service, _) = service();
        assert!(service.update_survival_best(4).await.unwrap());
        assert!(!service.update_survival_best(3).await.unwrap());
        assert!(!service.update_survival_best(4).await.unwrap());
        assert_eq!(service.load().await.unwrap().survival_best_record(), 4);
    }

    #[tokio::test]
    async fn last_played_mode_round_trips() {
        let (service, _) = service();
        let mode = LastPlayedMode {
            mode: GameMode::Survival,
            pool: PoolSelector::Review,
            question_count: None,
        };
        service.save_last_played_mode(mode.clone()).await.unwrap();
        assert_eq!(service.load().await.unwrap().last_played_mode(), Some(&mode));
    }
}
