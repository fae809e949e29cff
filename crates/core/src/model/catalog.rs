use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{ItemId, PhaseId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("phase {0} is declared more than once")]
    DuplicatePhase(PhaseId),

    #[error("item {item} appears in both {first} and {second}")]
    DuplicateItem {
        item: ItemId,
        first: PhaseId,
        second: PhaseId,
    },

    #[error("phase title cannot be empty")]
    EmptyPhaseTitle,

    #[error("item title cannot be empty")]
    EmptyItemTitle,
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// A single trackable item of the roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    id: ItemId,
    title: String,
}

impl CatalogItem {
    /// Creates an item with a display title.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyItemTitle` if the title is blank.
    pub fn new(id: ItemId, title: impl Into<String>) -> Result<Self, CatalogError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(CatalogError::EmptyItemTitle);
        }
        Ok(Self { id, title })
    }

    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// A named group of catalog items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phase {
    id: PhaseId,
    title: String,
    items: Vec<CatalogItem>,
}

impl Phase {
    /// Creates a phase.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyPhaseTitle` if the title is blank.
    pub fn new(
        id: PhaseId,
        title: impl Into<String>,
        items: Vec<CatalogItem>,
    ) -> Result<Self, CatalogError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(CatalogError::EmptyPhaseTitle);
        }
        Ok(Self { id, title, items })
    }

    #[must_use]
    pub fn id(&self) -> &PhaseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fixed set of trackable items, partitioned into non-overlapping phases.
///
/// The catalog is the only source of truth for which identifiers count towards
/// completion statistics. Progress entries for identifiers outside of it are
/// tolerated elsewhere but never counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    phases: Vec<Phase>,
    // item id -> index into `phases`
    index: HashMap<ItemId, usize>,
}

impl Catalog {
    /// Builds a catalog, checking that phases and items are unique.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicatePhase` or `CatalogError::DuplicateItem`
    /// when the partition is not clean.
    pub fn new(phases: Vec<Phase>) -> Result<Self, CatalogError> {
        let mut seen_phases = HashSet::with_capacity(phases.len());
        let mut index = HashMap::new();

        for (pos, phase) in phases.iter().enumerate() {
            if !seen_phases.insert(phase.id.clone()) {
                return Err(CatalogError::DuplicatePhase(phase.id.clone()));
            }
            for item in &phase.items {
                if let Some(prev) = index.insert(item.id.clone(), pos) {
                    return Err(CatalogError::DuplicateItem {
                        item: item.id.clone(),
                        first: phases[prev].id.clone(),
                        second: phase.id.clone(),
                    });
                }
            }
        }

        Ok(Self { phases, index })
    }

    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    #[must_use]
    pub fn phase(&self, id: &str) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.id.as_str() == id)
    }

    /// Returns the phase owning the given item.
    #[must_use]
    pub fn phase_of(&self, item: &str) -> Option<&Phase> {
        self.lookup(item).map(|pos| &self.phases[pos])
    }

    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.lookup(item).is_some()
    }

    #[must_use]
    pub fn item(&self, item: &str) -> Option<&CatalogItem> {
        self.phase_of(item)?
            .items
            .iter()
            .find(|candidate| candidate.id.as_str() == item)
    }

    /// All item identifiers in catalog order.
    pub fn item_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.phases
            .iter()
            .flat_map(|phase| phase.items.iter().map(CatalogItem::id))
    }

    /// Total number of items across all phases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn lookup(&self, item: &str) -> Option<usize> {
        // Keys that are not valid identifiers can never be catalog members.
        let id = ItemId::new(item).ok()?;
        self.index.get(&id).copied()
    }
}
