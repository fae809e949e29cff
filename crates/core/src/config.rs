/// Storage key holding the serialized progress map.
pub const PROGRESS_KEY: &str = "cyberpath-progress";

/// Storage key holding the theme preference.
pub const THEME_KEY: &str = "cyberpath-theme";

/// Keys under which progress and preferences are persisted.
///
/// The two entries are read and written independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub progress: String,
    pub theme: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            progress: PROGRESS_KEY.to_owned(),
            theme: THEME_KEY.to_owned(),
        }
    }
}
