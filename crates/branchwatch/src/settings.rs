use std::path::Path;

use branchwatch_core::UpdateCheckSettings;
use log::warn;
use serde::{Deserialize, Serialize};

/// Settings file of the command-line host.
///
/// The update checker's own settings live under `update_checker`; the rest
/// configures the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSettings {
    #[serde(default)]
    pub update_checker: UpdateCheckSettings,

    #[serde(default)]
    pub debug_logging: bool,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    #[serde(default = "default_max_log_size_bytes")]
    pub max_log_size_bytes: u64,
}

fn default_http_timeout() -> u64 {
    10
}

fn default_max_log_size_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            update_checker: UpdateCheckSettings::default(),
            debug_logging: false,
            http_timeout_secs: default_http_timeout(),
            max_log_size_bytes: default_max_log_size_bytes(),
        }
    }
}

impl HostSettings {
    /// Read settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|error| {
                warn!("Ignoring malformed settings {}: {error}", path.display());
                Self::default()
            }),
            Err(error) => {
                warn!("Cannot read settings {}: {error}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
