//! Installed version metadata.
//!
//! The metadata file is produced at packaging time (see [`VersionRecord::from_ci`])
//! and read once when the session starts.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::remote::RemoteIdentity;

const MIN_COMMIT_LEN: usize = 4;
const MAX_COMMIT_LEN: usize = 40;

#[derive(Debug, Error)]
pub enum VersionRecordError {
    #[error("failed to read version metadata {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed version metadata {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid commit identifier in version metadata: {commit:?}")]
    InvalidCommit { commit: String },
    #[error("repository must be given as <owner>/<repo>, got {repository:?}")]
    InvalidRepository { repository: String },
}

/// The remote and commit an installation was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub remote: RemoteIdentity,
    /// `None` when the installation tracks the branch tip and is never behind.
    pub commit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VersionFile {
    owner: String,
    repo: String,
    branch: String,
    commit: String,
}

impl VersionRecord {
    /// Load the version metadata file.
    ///
    /// Returns `Ok(None)` when the file does not exist, which disables update
    /// checks for the session.
    ///
    /// # Errors
    /// Returns an error when the file exists but cannot be read, is not the
    /// expected JSON object, or holds a commit that is not a hex identifier.
    pub fn load(path: &Path) -> Result<Option<Self>, VersionRecordError> {
        if !path.is_file() {
            debug!("No version metadata at {}", path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|source| VersionRecordError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: VersionFile =
            serde_json::from_str(&content).map_err(|source| VersionRecordError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let record = Self::from_parts(file.owner, file.repo, file.branch, &file.commit)?;
        info!(
            "Loaded version metadata: {} at {}",
            record.remote,
            record.commit.as_deref().unwrap_or("branch tip")
        );
        Ok(Some(record))
    }

    /// Build a record from the values a CI job knows about the build:
    /// the `owner/repo` slug, the ref name and the commit SHA.
    ///
    /// # Errors
    /// Returns an error when the slug is not exactly `owner/repo` or the SHA
    /// is not a hex identifier.
    pub fn from_ci(repository: &str, ref_name: &str, sha: &str) -> Result<Self, VersionRecordError> {
        let invalid = || VersionRecordError::InvalidRepository {
            repository: repository.to_string(),
        };
        let (owner, repo) = repository.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid());
        }

        Self::from_parts(owner.to_string(), repo.to_string(), ref_name.to_string(), sha)
    }

    fn from_parts(
        owner: String,
        repo: String,
        branch: String,
        commit: &str,
    ) -> Result<Self, VersionRecordError> {
        let commit = commit.trim();
        let commit = if commit.is_empty() || commit == branch {
            None
        } else if is_commit_id(commit) {
            Some(commit.to_ascii_lowercase())
        } else {
            return Err(VersionRecordError::InvalidCommit {
                commit: commit.to_string(),
            });
        };

        Ok(Self {
            remote: RemoteIdentity { owner, repo, branch },
            commit,
        })
    }

    /// Write the record in the format [`VersionRecord::load`] reads.
    ///
    /// # Errors
    /// Returns an error when the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), VersionRecordError> {
        let file = VersionFile {
            owner: self.remote.owner.clone(),
            repo: self.remote.repo.clone(),
            branch: self.remote.branch.clone(),
            commit: self
                .commit
                .clone()
                .unwrap_or_else(|| self.remote.branch.clone()),
        };
        let content = serde_json::to_string_pretty(&file).map_err(|source| {
            VersionRecordError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        std::fs::write(path, content).map_err(|source| VersionRecordError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn is_commit_id(value: &str) -> bool {
    (MIN_COMMIT_LEN..=MAX_COMMIT_LEN).contains(&value.len())
        && value.chars().all(|ch| ch.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::{VersionRecord, VersionRecordError};
    use crate::remote::RemoteIdentity;

    const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

    fn write_metadata(dir: &std::path::Path, json: &str) -> std::path::PathBuf {
        let path = dir.join("version.json");
        std::fs::write(&path, json).expect("metadata should be written");
        path
    }

    #[test]
    fn load_returns_none_when_file_missing() {
        let temp = tempfile::tempdir().expect("tempdir should be created");

        let record = VersionRecord::load(&temp.path().join("version.json"))
            .expect("missing file should not be an error");

        assert!(record.is_none());
    }

    #[test]
    fn load_reads_remote_and_commit() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = write_metadata(
            temp.path(),
            &format!(r#"{{"owner":"octo","repo":"widgets","branch":"main","commit":"{SHA}"}}"#),
        );

        let record = VersionRecord::load(&path)
            .expect("metadata should load")
            .expect("record should be present");

        assert_eq!(record.remote, RemoteIdentity::new("octo", "widgets", "main"));
        assert_eq!(record.commit.as_deref(), Some(SHA));
    }

    #[test]
    fn commit_equal_to_branch_tracks_tip() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = write_metadata(
            temp.path(),
            r#"{"owner":"octo","repo":"widgets","branch":"main","commit":"main"}"#,
        );

        let record = VersionRecord::load(&path)
            .expect("metadata should load")
            .expect("record should be present");

        assert!(record.commit.is_none());
    }

    #[test]
    fn load_rejects_malformed_json() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = write_metadata(temp.path(), r#"{"owner":"octo"}"#);

        let result = VersionRecord::load(&path);

        assert!(matches!(result, Err(VersionRecordError::Json { .. })));
    }

    #[test]
    fn load_rejects_non_hex_commit() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = write_metadata(
            temp.path(),
            r#"{"owner":"octo","repo":"widgets","branch":"main","commit":"not-a-sha"}"#,
        );

        let result = VersionRecord::load(&path);

        assert!(matches!(
            result,
            Err(VersionRecordError::InvalidCommit { ref commit }) if commit == "not-a-sha"
        ));
    }

    #[test]
    fn from_ci_splits_repository_slug() {
        let record = VersionRecord::from_ci("octo/widgets", "release", SHA)
            .expect("CI values should be accepted");

        assert_eq!(record.remote, RemoteIdentity::new("octo", "widgets", "release"));
        assert_eq!(record.commit.as_deref(), Some(SHA));
    }

    #[test]
    fn from_ci_rejects_bad_slugs() {
        for slug in ["widgets", "/widgets", "octo/", "octo/widgets/extra"] {
            assert!(
                matches!(
                    VersionRecord::from_ci(slug, "main", SHA),
                    Err(VersionRecordError::InvalidRepository { .. })
                ),
                "{slug:?} should be rejected"
            );
        }
    }

    #[test]
    fn written_record_loads_back() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("version.json");
        let record = VersionRecord::from_ci("octo/widgets", "main", &SHA.to_uppercase())
            .expect("CI values should be accepted");

        record.write(&path).expect("record should be written");
        let loaded = VersionRecord::load(&path)
            .expect("written file should load")
            .expect("record should be present");

        assert_eq!(loaded, record);
        assert_eq!(loaded.commit.as_deref(), Some(SHA));
    }
}
