use serde::{Deserialize, Serialize};
use thiserror::Error;

const TREE_URL_PREFIX: &str = "https://github.com/";

/// A branch on a hosted repository that an installation can be compared against.
///
/// The all-empty identity stands for "no remote configured".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RemoteIdentity {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a branch tree URL (expected https://github.com/<owner>/<repo>/tree/<branch>): {url}")]
pub struct RemoteParseError {
    pub url: String,
}

impl RemoteIdentity {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        !(self.owner.is_empty() && self.repo.is_empty() && self.branch.is_empty())
    }

    /// Browser URL of the branch, or an empty string for an unset remote.
    #[must_use]
    pub fn tree_url(&self) -> String {
        if self.is_set() {
            format!(
                "{TREE_URL_PREFIX}{}/{}/tree/{}",
                self.owner, self.repo, self.branch
            )
        } else {
            String::new()
        }
    }

    /// Parse a URL produced by [`RemoteIdentity::tree_url`].
    ///
    /// # Errors
    /// Returns an error unless the URL is exactly
    /// `https://github.com/<owner>/<repo>/tree/<branch>` with non-empty,
    /// slash-free components. Surrounding whitespace is ignored.
    pub fn parse_tree_url(url: &str) -> Result<Self, RemoteParseError> {
        let invalid = || RemoteParseError {
            url: url.to_string(),
        };

        let rest = url.trim().strip_prefix(TREE_URL_PREFIX).ok_or_else(invalid)?;
        let mut parts = rest.split('/');
        let (Some(owner), Some(repo), Some("tree"), Some(branch), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(invalid());
        };

        if [owner, repo, branch].iter().any(|part| part.is_empty()) {
            return Err(invalid());
        }

        Ok(Self::new(owner, repo, branch))
    }
}

impl std::fmt::Display for RemoteIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

#[cfg(test)]
mod tests {
    use super::RemoteIdentity;

    #[test]
    fn is_set_distinguishes_empty_identity() {
        assert!(RemoteIdentity::new("Dragorn421", "blender-addon-updater-github", "main").is_set());
        assert!(RemoteIdentity::new("", "", "main").is_set());
        assert!(!RemoteIdentity::default().is_set());
    }

    #[test]
    fn tree_url_round_trips_for_slash_free_components() {
        let cases = [
            ("octo", "widgets", "main"),
            ("a", "b", "c"),
            ("some-org", "repo.name", "release-1.2"),
            ("user_1", "x", "v0.0.1+build"),
        ];

        for (owner, repo, branch) in cases {
            let remote = RemoteIdentity::new(owner, repo, branch);
            let parsed = RemoteIdentity::parse_tree_url(&remote.tree_url())
                .expect("generated tree URL should parse");
            assert_eq!(parsed, remote);
        }
    }

    #[test]
    fn tree_url_is_empty_for_unset_remote() {
        assert_eq!(RemoteIdentity::default().tree_url(), "");
    }

    #[test]
    fn parse_tree_url_ignores_surrounding_whitespace() {
        let parsed = RemoteIdentity::parse_tree_url("  https://github.com/octo/widgets/tree/dev \n")
            .expect("padded URL should parse");
        assert_eq!(parsed, RemoteIdentity::new("octo", "widgets", "dev"));
    }

    #[test]
    fn parse_tree_url_rejects_other_shapes() {
        let rejected = [
            "",
            "https://github.com/octo/widgets",
            "https://github.com/octo/widgets/blob/main",
            "https://github.com/octo/widgets/tree/feature/nested",
            "https://github.com//widgets/tree/main",
            "https://gitlab.com/octo/widgets/tree/main",
            "http://github.com/octo/widgets/tree/main",
        ];

        for url in rejected {
            assert!(
                RemoteIdentity::parse_tree_url(url).is_err(),
                "{url:?} should be rejected"
            );
        }
    }

    #[test]
    fn display_uses_slug_and_branch() {
        let remote = RemoteIdentity::new("octo", "widgets", "main");
        assert_eq!(remote.to_string(), "octo/widgets@main");
    }
}
