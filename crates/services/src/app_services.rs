use std::sync::Arc;

use roadmap_core::StorageKeys;
use roadmap_core::model::Catalog;
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::preferences_service::PreferencesService;
use crate::progress_service::ProgressService;

/// Assembles app-facing services over one storage backend.
pub struct AppServices {
    progress: ProgressService,
    preferences: Arc<PreferencesService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(db_url: &str, keys: &StorageKeys) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, keys).await)
    }

    /// Build services that keep everything in memory.
    pub async fn in_memory(keys: &StorageKeys) -> Self {
        Self::from_storage(Storage::in_memory(), keys).await
    }

    /// Build services over an existing backend with the built-in catalog.
    pub async fn from_storage(storage: Storage, keys: &StorageKeys) -> Self {
        let progress =
            ProgressService::initialize(Catalog::cyber_roadmap(), Arc::clone(&storage.kv), keys)
                .await;
        let preferences = Arc::new(PreferencesService::new(Arc::clone(&storage.kv), keys));
        Self {
            progress,
            preferences,
        }
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressService {
        &mut self.progress
    }

    #[must_use]
    pub fn preferences(&self) -> Arc<PreferencesService> {
        Arc::clone(&self.preferences)
    }
}
