//! Case-insensitive filtering of the catalog for a search box.

use crate::model::{Catalog, ItemId, Phase, PhaseId};

/// Visibility of one phase for a search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseMatch {
    pub phase: PhaseId,
    pub visible: bool,
    pub matching_items: Vec<ItemId>,
}

/// Filters the catalog by `term`.
///
/// A blank term shows every phase with all of its items. Otherwise a phase is
/// visible when its title or any of its items (title or id) contains the term.
/// A phase whose own title matches keeps all of its items.
#[must_use]
pub fn filter_catalog(catalog: &Catalog, term: &str) -> Vec<PhaseMatch> {
    let needle = term.trim().to_lowercase();
    catalog
        .phases()
        .iter()
        .map(|phase| match_phase(phase, &needle))
        .collect()
}

fn match_phase(phase: &Phase, needle: &str) -> PhaseMatch {
    let all_items = || phase.items().iter().map(|item| item.id().clone()).collect();

    if needle.is_empty() || phase.title().to_lowercase().contains(needle) {
        return PhaseMatch {
            phase: phase.id().clone(),
            visible: true,
            matching_items: all_items(),
        };
    }

    let matching_items: Vec<ItemId> = phase
        .items()
        .iter()
        .filter(|item| {
            item.title().to_lowercase().contains(needle) || item.id().as_str().contains(needle)
        })
        .map(|item| item.id().clone())
        .collect();

    PhaseMatch {
        phase: phase.id().clone(),
        visible: !matching_items.is_empty(),
        matching_items,
    }
}
