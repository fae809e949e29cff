use std::sync::Arc;

use roadmap_core::StorageKeys;
use roadmap_core::model::Theme;
use storage::repository::KeyValueStore;
use tracing::warn;

/// Reads and writes the theme preference, independently of progress.
#[derive(Clone)]
pub struct PreferencesService {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl PreferencesService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, keys: &StorageKeys) -> Self {
        Self {
            store,
            key: keys.theme.clone(),
        }
    }

    /// Load the stored theme, or the default if missing, unknown or unreadable.
    pub async fn theme(&self) -> Theme {
        match self.store.get(&self.key).await {
            Ok(raw) => Theme::from_stored(raw.as_deref()),
            Err(err) => {
                warn!(key = %self.key, %err, "failed to read theme preference");
                Theme::default()
            }
        }
    }

    /// Persist `theme`. Write failures are logged; the theme still applies.
    pub async fn set_theme(&self, theme: Theme) -> Theme {
        if let Err(err) = self.store.set(&self.key, theme.as_str()).await {
            warn!(key = %self.key, %err, "failed to save theme preference");
        }
        theme
    }

    /// Switch between dark and light, returning the new theme.
    pub async fn toggle_theme(&self) -> Theme {
        let next = self.theme().await.toggled();
        self.set_theme(next).await
    }
}
