use std::path::PathBuf;

use branchwatch_core::{CheckError, ClientBuildError, RemoteParseError, VersionRecordError};
use branchwatch_platform::AppPathsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Paths(#[from] AppPathsError),

    #[error("failed to create application directories: {source}")]
    CreateDirs {
        #[source]
        source: std::io::Error,
    },

    #[error("cannot determine the install directory; pass --install-dir")]
    InstallDirUnknown,

    #[error("failed to save settings to {}: {source}", .path.display())]
    SaveSettings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Client(#[from] ClientBuildError),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error(transparent)]
    Remote(#[from] RemoteParseError),

    #[error(transparent)]
    Version(#[from] VersionRecordError),
}
