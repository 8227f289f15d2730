use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the version metadata file shipped next to the installed binary.
pub const VERSION_FILE_NAME: &str = "version.json";

/// Name of the extra root certificate shipped next to the installed binary.
pub const CA_FILE_NAME: &str = "DigiCertGlobalRootCA.crt.pem";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppPathsError {
    #[error("Could not determine home directory")]
    HomeDirUnavailable,
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,
    #[error("Could not determine data directory")]
    DataDirUnavailable,
}

pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Build application paths for the current platform.
    ///
    /// # Errors
    /// Returns an error when a required base directory (for example the user
    /// home/config/data directory) cannot be determined.
    pub fn new() -> Result<Self, AppPathsError> {
        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().ok_or(AppPathsError::HomeDirUnavailable)?;
            Ok(Self {
                config_dir: home.join("Library/Application Support/branchwatch"),
                data_dir: home.join("Library/Application Support/branchwatch"),
            })
        }

        #[cfg(not(target_os = "macos"))]
        {
            Ok(Self {
                config_dir: dirs::config_dir()
                    .ok_or(AppPathsError::ConfigDirUnavailable)?
                    .join("branchwatch"),
                data_dir: dirs::data_dir()
                    .ok_or(AppPathsError::DataDirUnavailable)?
                    .join("branchwatch"),
            })
        }
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("debug.log")
    }

    /// Ensure all application directories exist on disk.
    ///
    /// # Errors
    /// Returns an error if any directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    /// Directory holding the running executable, used as the install root.
    #[must_use]
    pub fn install_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
    }

    #[must_use]
    pub fn version_file(install_dir: &Path) -> PathBuf {
        install_dir.join(VERSION_FILE_NAME)
    }

    /// The bundled certificate, if the install directory ships one.
    #[must_use]
    pub fn bundled_ca_file(install_dir: &Path) -> Option<PathBuf> {
        let path = install_dir.join(CA_FILE_NAME);
        path.is_file().then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{AppPaths, CA_FILE_NAME};

    fn test_paths(root: &Path) -> AppPaths {
        AppPaths {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    #[test]
    fn file_paths_use_expected_filenames() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let paths = test_paths(temp.path());

        assert!(
            paths
                .settings_file()
                .ends_with(Path::new("config").join("settings.json"))
        );
        assert!(
            paths
                .log_file()
                .ends_with(Path::new("data").join("debug.log"))
        );
        assert!(AppPaths::version_file(temp.path()).ends_with("version.json"));
    }

    #[test]
    fn ensure_dirs_creates_all_directories() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let paths = test_paths(temp.path());

        paths
            .ensure_dirs()
            .expect("ensure_dirs should create application directories");

        assert!(paths.config_dir.is_dir());
        assert!(paths.data_dir.is_dir());
    }

    #[test]
    fn bundled_ca_file_only_resolves_existing_file() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        assert!(AppPaths::bundled_ca_file(temp.path()).is_none());

        std::fs::write(temp.path().join(CA_FILE_NAME), "pem").expect("ca file should be written");
        assert_eq!(
            AppPaths::bundled_ca_file(temp.path()),
            Some(temp.path().join(CA_FILE_NAME))
        );
    }
}
