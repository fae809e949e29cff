use serde::Serialize;

use crate::model::catalog::{Catalog, Phase};
use crate::model::ids::PhaseId;
use crate::model::progress::ProgressMap;

/// Completed/total counts with a rounded percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub completed: usize,
    pub total: usize,
    pub percentage: u32,
}

impl Completion {
    /// Builds a completion, rounding `100 * completed / total` half-up.
    ///
    /// An empty group reports 0%.
    #[must_use]
    pub fn new(completed: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            let (c, t) = (completed as u64, total as u64);
            // round(100c/t) == floor((200c + t) / 2t) for non-negative inputs
            u32::try_from((200 * c + t) / (2 * t)).unwrap_or(u32::MAX)
        };
        Self {
            completed,
            total,
            percentage,
        }
    }

    /// True once every item of a non-empty group is done.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseStats {
    pub phase: PhaseId,
    pub title: String,
    #[serde(flatten)]
    pub completion: Completion,
}

/// Overall and per-phase completion, derived from a catalog and a progress map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressStats {
    pub overall: Completion,
    pub phases: Vec<PhaseStats>,
}

impl ProgressStats {
    /// Computes statistics; keys outside the catalog never count.
    #[must_use]
    pub fn compute(catalog: &Catalog, progress: &ProgressMap) -> Self {
        let phases: Vec<PhaseStats> = catalog
            .phases()
            .iter()
            .map(|phase| PhaseStats {
                phase: phase.id().clone(),
                title: phase.title().to_owned(),
                completion: Completion::new(count_completed(phase, progress), phase.len()),
            })
            .collect();

        let completed = phases.iter().map(|p| p.completion.completed).sum();
        Self {
            overall: Completion::new(completed, catalog.len()),
            phases,
        }
    }

    #[must_use]
    pub fn phase(&self, id: &str) -> Option<&Completion> {
        self.phases
            .iter()
            .find(|stats| stats.phase.as_str() == id)
            .map(|stats| &stats.completion)
    }
}

fn count_completed(phase: &Phase, progress: &ProgressMap) -> usize {
    phase
        .items()
        .iter()
        .filter(|item| progress.is_completed(item.id().as_str()))
        .count()
}
