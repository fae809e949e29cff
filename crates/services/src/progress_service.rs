use std::sync::Arc;

use roadmap_core::StorageKeys;
use roadmap_core::model::{Catalog, ItemId, ProgressMap, ProgressStats};
use storage::repository::KeyValueStore;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::ProgressError;

/// What caused the latest store change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeCause {
    Hydrated,
    Toggled(ItemId),
    Reset,
    Imported,
}

/// Broadcast to subscribers after every mutation so views can re-render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub cause: ChangeCause,
    pub stats: ProgressStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persistence {
    Available,
    // A read or write failed; progress lives in memory until the process exits.
    Unavailable,
}

/// Owns the catalog and the current progress map, and keeps storage in sync.
///
/// All mutations take `&mut self`: there is one logical owner per session and
/// callers serialize access through it.
pub struct ProgressService {
    catalog: Catalog,
    progress: ProgressMap,
    store: Arc<dyn KeyValueStore>,
    key: String,
    persistence: Persistence,
    changes: watch::Sender<StoreChange>,
}

impl ProgressService {
    /// Hydrate progress from storage.
    ///
    /// A missing entry starts a fresh, all-incomplete map. A malformed entry is
    /// logged and treated the same way. If storage cannot be read at all the
    /// service keeps working in memory for the rest of the session.
    pub async fn initialize(
        catalog: Catalog,
        store: Arc<dyn KeyValueStore>,
        keys: &StorageKeys,
    ) -> Self {
        let key = keys.progress.clone();
        let mut persistence = Persistence::Available;

        let progress = match store.get(&key).await {
            Ok(None) => {
                info!(%key, "no stored progress, starting fresh");
                ProgressMap::empty_for(&catalog)
            }
            Ok(Some(raw)) => match ProgressMap::from_stored(&raw) {
                Ok(map) => {
                    let unknown = map.unknown_keys(&catalog).len();
                    if unknown > 0 {
                        debug!(unknown, "stored progress carries keys outside the catalog");
                    }
                    map
                }
                Err(err) => {
                    warn!(%key, %err, "stored progress is malformed, starting fresh");
                    ProgressMap::empty_for(&catalog)
                }
            },
            Err(err) => {
                warn!(%key, %err, "progress storage unavailable, keeping progress in memory");
                persistence = Persistence::Unavailable;
                ProgressMap::empty_for(&catalog)
            }
        };

        let stats = ProgressStats::compute(&catalog, &progress);
        info!(
            completed = stats.overall.completed,
            total = stats.overall.total,
            "progress hydrated"
        );
        let (changes, _) = watch::channel(StoreChange {
            cause: ChangeCause::Hydrated,
            stats,
        });

        Self {
            catalog,
            progress,
            store,
            key,
            persistence,
            changes,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn map(&self) -> &ProgressMap {
        &self.progress
    }

    /// False once a storage failure has switched the session to memory only.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.persistence == Persistence::Available
    }

    #[must_use]
    pub fn is_completed(&self, item: &str) -> bool {
        self.progress.is_completed(item)
    }

    /// Current overall and per-phase statistics.
    #[must_use]
    pub fn stats(&self) -> ProgressStats {
        ProgressStats::compute(&self.catalog, &self.progress)
    }

    /// Receive a `StoreChange` after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    /// Mark a single catalog item as completed or not.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownItem` if `item` is not in the catalog;
    /// the map is left untouched.
    pub async fn toggle(
        &mut self,
        item: &str,
        completed: bool,
    ) -> Result<ProgressStats, ProgressError> {
        let id = self
            .catalog
            .item(item)
            .map(|entry| entry.id().clone())
            .ok_or_else(|| ProgressError::UnknownItem(item.to_owned()))?;

        self.progress.set(&id, completed);
        debug!(item = %id, completed, "progress toggled");
        self.persist().await;
        Ok(self.publish(ChangeCause::Toggled(id)))
    }

    /// Clear every item. Resetting an empty map changes nothing observable.
    pub async fn reset(&mut self) -> ProgressStats {
        self.progress = ProgressMap::empty_for(&self.catalog);
        debug!("progress reset");
        self.persist().await;
        self.publish(ChangeCause::Reset)
    }

    /// Serialize the current map as a flat JSON object.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Encode` if serialization fails.
    pub fn export(&self) -> Result<String, ProgressError> {
        Ok(self.progress.to_json()?)
    }

    /// Serialize the current map inside a `{"version":1,"items":{...}}` envelope.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Encode` if serialization fails.
    pub fn export_versioned(&self) -> Result<String, ProgressError> {
        Ok(self.progress.to_versioned_json()?)
    }

    /// Replace the whole map with an exported snapshot.
    ///
    /// The snapshot is parsed before anything changes, so a rejected import
    /// leaves both memory and storage as they were. Keys outside the catalog
    /// are kept for later export.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::MalformedInput` if `raw` is not a JSON object of
    /// item flags.
    pub async fn import(&mut self, raw: &str) -> Result<ProgressStats, ProgressError> {
        let incoming = ProgressMap::from_json(raw).map_err(ProgressError::MalformedInput)?;

        let unknown = incoming.unknown_keys(&self.catalog).len();
        if unknown > 0 {
            debug!(unknown, "imported snapshot carries keys outside the catalog");
        }

        self.progress = incoming;
        self.persist().await;
        Ok(self.publish(ChangeCause::Imported))
    }

    async fn persist(&mut self) {
        if self.persistence == Persistence::Unavailable {
            return;
        }

        let raw = match self.progress.to_json() {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%err, "failed to encode progress, skipping write");
                return;
            }
        };

        if let Err(err) = self.store.set(&self.key, &raw).await {
            warn!(key = %self.key, %err, "failed to persist progress, keeping progress in memory");
            self.persistence = Persistence::Unavailable;
        }
    }

    fn publish(&self, cause: ChangeCause) -> ProgressStats {
        let stats = self.stats();
        self.changes.send_replace(StoreChange {
            cause,
            stats: stats.clone(),
        });
        stats
    }
}
