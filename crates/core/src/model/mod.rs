mod catalog;
mod ids;
mod progress;
mod roadmap;
mod stats;
mod theme;

pub use ids::{ItemId, MAX_ID_LEN, ParseIdError, PhaseId};

pub use catalog::{Catalog, CatalogError, CatalogItem, Phase};
pub use progress::{ProgressDecodeError, ProgressMap, SNAPSHOT_VERSION};
pub use stats::{Completion, PhaseStats, ProgressStats};
pub use theme::{Theme, ThemeParseError};
