use std::fmt::Write as _;

use roadmap_core::model::{Catalog, Completion, ProgressMap, ProgressStats};
use roadmap_core::search::PhaseMatch;

const BAR_WIDTH: usize = 20;

fn bar(completion: &Completion) -> String {
    let filled = (completion.percentage as usize * BAR_WIDTH).div_ceil(100).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn percentage_label(completion: &Completion) -> String {
    if completion.is_complete() {
        "100% - HACKER MODE UNLOCKED".to_owned()
    } else {
        format!("{}%", completion.percentage)
    }
}

pub fn status(stats: &ProgressStats) -> String {
    let mut out = String::new();
    let overall = &stats.overall;
    let _ = writeln!(
        out,
        "Overall  {} {} ({}/{})",
        bar(overall),
        percentage_label(overall),
        overall.completed,
        overall.total
    );
    for phase in &stats.phases {
        let c = &phase.completion;
        let _ = writeln!(
            out,
            "  {:<6} {:<18} {:>3}% ({}/{})",
            phase.phase.as_str(),
            phase.title,
            c.percentage,
            c.completed,
            c.total
        );
    }
    out
}

pub fn catalog(catalog: &Catalog, progress: &ProgressMap) -> String {
    let mut out = String::new();
    for phase in catalog.phases() {
        let _ = writeln!(out, "{} ({})", phase.title(), phase.id());
        for item in phase.items() {
            let mark = if progress.is_completed(item.id().as_str()) {
                'x'
            } else {
                ' '
            };
            let _ = writeln!(out, "  [{mark}] {:<18} {}", item.id(), item.title());
        }
    }
    out
}

pub fn search(catalog: &Catalog, matches: &[PhaseMatch]) -> String {
    let mut out = String::new();
    for found in matches.iter().filter(|m| m.visible) {
        let Some(phase) = catalog.phase(found.phase.as_str()) else {
            continue;
        };
        let _ = writeln!(out, "{} ({})", phase.title(), phase.id());
        for id in &found.matching_items {
            if let Some(item) = catalog.item(id.as_str()) {
                let _ = writeln!(out, "  {:<18} {}", item.id(), item.title());
            }
        }
    }
    if out.is_empty() {
        out.push_str("no matches\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadmap_core::model::ItemId;
    use roadmap_core::search::filter_catalog;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar(&Completion::new(0, 4)), format!("[{}]", "-".repeat(20)));
        assert_eq!(bar(&Completion::new(2, 4)), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(bar(&Completion::new(4, 4)), format!("[{}]", "#".repeat(20)));
    }

    #[test]
    fn status_shows_banner_when_everything_is_done() {
        let catalog = Catalog::cyber_roadmap();
        let mut map = ProgressMap::default();
        for id in catalog.item_ids() {
            map.set(id, true);
        }
        let text = status(&ProgressStats::compute(&catalog, &map));
        assert!(text.contains("HACKER MODE UNLOCKED"));
        assert!(text.contains("(39/39)"));
    }

    #[test]
    fn status_lists_every_phase() {
        let catalog = Catalog::cyber_roadmap();
        let text = status(&ProgressStats::compute(&catalog, &ProgressMap::empty_for(&catalog)));
        assert!(text.starts_with("Overall"));
        assert!(!text.contains("UNLOCKED"));
        for phase in ["soc", "hack", "red", "ai"] {
            assert!(text.contains(phase));
        }
    }

    #[test]
    fn catalog_marks_completed_items() {
        let catalog = Catalog::cyber_roadmap();
        let mut map = ProgressMap::empty_for(&catalog);
        map.set(&ItemId::new("soc-linux").unwrap(), true);
        let text = super::catalog(&catalog, &map);
        assert!(text.contains("[x] soc-linux"));
        assert!(text.contains("[ ] soc-windows"));
    }

    #[test]
    fn search_reports_no_matches() {
        let catalog = Catalog::cyber_roadmap();
        let matches = filter_catalog(&catalog, "zzz");
        assert_eq!(search(&catalog, &matches), "no matches\n");
    }
}
