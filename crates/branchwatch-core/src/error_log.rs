use std::sync::{Mutex, PoisonError};

use log::warn;

/// Stable keys under which failures are recorded.
pub mod keys {
    pub const COMMIT_NOT_FOUND: &str = "Commit not found";
    pub const COMPARE: &str = "compare";
    pub const STARTUP_CHECK: &str = "startup check";
    pub const VERSION_RECORD: &str = "version record";
    pub const TRUSTED_CERTIFICATE: &str = "trusted certificate";
    pub const BUILTIN_REMOTE: &str = "builtin remote";
    pub const LAST_CHECK_DATETIME: &str = "last_update_check_datetime";
    pub const CHECK_PERIOD: &str = "update_check_period";
}

/// Latest failure detail per category, in first-seen order.
///
/// Setting an existing key replaces its detail without moving it.
#[derive(Debug, Default)]
pub struct ErrorLog {
    entries: Mutex<Vec<(String, String)>>,
}

impl ErrorLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, detail: impl Into<String>) {
        let key = key.into();
        let detail = detail.into();
        warn!("{key}: {detail}");

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.iter_mut().find(|(existing, _)| *existing == key) {
            entry.1 = detail;
        } else {
            entries.push((key, detail));
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, detail)| detail.clone())
    }

    #[must_use]
    pub fn all(&self) -> Vec<(String, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}
