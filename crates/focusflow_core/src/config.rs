//! Store configuration defaults.

use std::time::Duration;

/// Fixed key of the single persisted blob.
pub const STORAGE_KEY: &str = "focus_flow_data";
/// Quiet period before a pending change is written.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Tunables for [`crate::store::Store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Key of the key-value slot holding the serialized state.
    pub storage_key: String,
    /// Debounce window for write-through saves.
    pub save_debounce: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            save_debounce: SAVE_DEBOUNCE,
        }
    }
}

impl StoreConfig {
    pub fn save_debounce_ms(&self) -> i64 {
        i64::try_from(self.save_debounce.as_millis()).unwrap_or(i64::MAX)
    }
}
