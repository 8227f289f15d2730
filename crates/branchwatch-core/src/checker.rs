use std::path::Path;

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use thiserror::Error;

use crate::compare::{CompareClient, CompareError, CompareOutcome};
use crate::error_log::{ErrorLog, keys};
use crate::registry::UpdateRegistry;
use crate::remote::RemoteIdentity;
use crate::schedule::{CheckAction, SkipReason, maybe_check};
use crate::settings::UpdateCheckSettings;
use crate::version::VersionRecord;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("no version metadata is installed")]
    NoVersionRecord,
    #[error("no local baseline commit is known for {remote}")]
    NoBaseline { remote: RemoteIdentity },
    #[error(transparent)]
    Compare(#[from] CompareError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOutcome {
    /// The startup check already ran in this session.
    AlreadyRan,
    NoVersionRecord,
    AutoCheckDisabled,
    Skipped(SkipReason),
    Checked(CompareOutcome),
    /// The installed commit is unknown upstream; details are in the error log.
    CommitNotFound,
}

/// Update-check state for one session.
///
/// Created once at startup and handed to every entry point; nothing here is
/// process-global.
#[derive(Debug)]
pub struct UpdateChecker {
    version: Option<VersionRecord>,
    client: CompareClient,
    builtin_remotes: Vec<RemoteIdentity>,
    registry: UpdateRegistry,
    errors: ErrorLog,
    startup_ran: bool,
}

impl UpdateChecker {
    #[must_use]
    pub fn new(
        version: Option<VersionRecord>,
        client: CompareClient,
        builtin_remotes: Vec<RemoteIdentity>,
    ) -> Self {
        Self {
            version,
            client,
            builtin_remotes,
            registry: UpdateRegistry::new(),
            errors: ErrorLog::new(),
            startup_ran: false,
        }
    }

    /// Create the session context, loading version metadata from `version_file`.
    ///
    /// A metadata file that cannot be loaded is recorded in the error log and
    /// the session continues without a version record.
    #[must_use]
    pub fn load(
        version_file: &Path,
        client: CompareClient,
        builtin_remotes: Vec<RemoteIdentity>,
    ) -> Self {
        let mut checker = Self::new(None, client, builtin_remotes);
        match VersionRecord::load(version_file) {
            Ok(version) => checker.version = version,
            Err(load_error) => {
                error!("Update checks disabled: {load_error}");
                checker
                    .errors
                    .set(keys::VERSION_RECORD, load_error.to_string());
            }
        }
        checker
    }

    #[must_use]
    pub fn version(&self) -> Option<&VersionRecord> {
        self.version.as_ref()
    }

    #[must_use]
    pub fn registry(&self) -> &UpdateRegistry {
        &self.registry
    }

    #[must_use]
    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    #[must_use]
    pub fn startup_ran(&self) -> bool {
        self.startup_ran
    }

    /// Installed remote first, then built-in remotes, then configured custom
    /// remotes, without duplicates.
    #[must_use]
    pub fn tracked_remotes(&self, settings: &UpdateCheckSettings) -> Vec<RemoteIdentity> {
        let mut remotes: Vec<RemoteIdentity> = Vec::new();
        let candidates = self
            .version
            .iter()
            .map(|version| &version.remote)
            .chain(&self.builtin_remotes)
            .chain(&settings.custom_remotes);

        for remote in candidates {
            if remote.is_set() && !remotes.contains(remote) {
                remotes.push(remote.clone());
            }
        }
        remotes
    }

    /// The commit the local installation was built from, if `remote` is the
    /// installed one and the installation is pinned to a commit.
    #[must_use]
    pub fn baseline_for(&self, remote: &RemoteIdentity) -> Option<&str> {
        self.version
            .as_ref()
            .filter(|version| version.remote == *remote)
            .and_then(|version| version.commit.as_deref())
    }

    /// Scheduled check run once when the session starts.
    ///
    /// The run-once guard is set before anything else, so a failing check is
    /// never attempted twice in one session.
    ///
    /// # Errors
    /// Returns unexpected comparison failures after recording them in the
    /// error log. A commit unknown upstream is recorded but not returned.
    pub async fn run_startup_check(
        &mut self,
        settings: &mut UpdateCheckSettings,
        now: DateTime<Utc>,
    ) -> Result<StartupOutcome, CheckError> {
        if self.startup_ran {
            return Ok(StartupOutcome::AlreadyRan);
        }
        self.startup_ran = true;

        let result = self.startup_check(settings, now).await;
        if let Err(check_error) = &result {
            self.errors
                .set(keys::STARTUP_CHECK, check_error.to_string());
        }
        result
    }

    async fn startup_check(
        &self,
        settings: &mut UpdateCheckSettings,
        now: DateTime<Utc>,
    ) -> Result<StartupOutcome, CheckError> {
        let Some(version) = &self.version else {
            info!("No version metadata, skipping update check");
            return Ok(StartupOutcome::NoVersionRecord);
        };

        if !settings.auto_check_updates {
            info!("Automatic update checks are disabled");
            return Ok(StartupOutcome::AutoCheckDisabled);
        }

        let schedule = settings.schedule(&self.errors);
        match maybe_check(now, &schedule, &version.remote, version.commit.as_deref()) {
            CheckAction::Skip(reason) => {
                info!("Skipping update check: {reason:?}");
                Ok(StartupOutcome::Skipped(reason))
            }
            CheckAction::Check { remote, commit } => {
                match self.compare_and_record(&remote, &commit).await {
                    Ok(outcome) => {
                        settings.set_last_checked(now);
                        Ok(StartupOutcome::Checked(outcome))
                    }
                    Err(CompareError::NotFound { .. }) => Ok(StartupOutcome::CommitNotFound),
                    Err(compare_error) => Err(compare_error.into()),
                }
            }
        }
    }

    /// User-triggered check; ignores the schedule.
    ///
    /// # Errors
    /// Returns [`CheckError::NoBaseline`] without contacting the remote when
    /// `commit` is `None`, and comparison failures (which are also recorded
    /// in the error log).
    pub async fn check_updates(
        &self,
        remote: &RemoteIdentity,
        commit: Option<&str>,
    ) -> Result<CompareOutcome, CheckError> {
        let Some(commit) = commit else {
            info!("No local baseline for {remote}, on-demand check unavailable");
            return Err(CheckError::NoBaseline {
                remote: remote.clone(),
            });
        };

        Ok(self.compare_and_record(remote, commit).await?)
    }

    /// User-triggered check of any tracked remote, using the installed commit
    /// as baseline when `remote` is the installed remote.
    ///
    /// # Errors
    /// See [`UpdateChecker::check_updates`].
    pub async fn check_remote(&self, remote: &RemoteIdentity) -> Result<CompareOutcome, CheckError> {
        self.check_updates(remote, self.baseline_for(remote)).await
    }

    /// User-triggered check of the installed remote. A successful check also
    /// counts as the latest scheduled check.
    ///
    /// # Errors
    /// Returns [`CheckError::NoVersionRecord`] when nothing is installed,
    /// otherwise see [`UpdateChecker::check_updates`].
    pub async fn check_installed(
        &self,
        settings: &mut UpdateCheckSettings,
        now: DateTime<Utc>,
    ) -> Result<CompareOutcome, CheckError> {
        let version = self.version.as_ref().ok_or(CheckError::NoVersionRecord)?;

        let outcome = self
            .check_updates(&version.remote, version.commit.as_deref())
            .await?;
        settings.set_last_checked(now);
        Ok(outcome)
    }

    async fn compare_and_record(
        &self,
        remote: &RemoteIdentity,
        commit: &str,
    ) -> Result<CompareOutcome, CompareError> {
        let result = self.client.compare(remote, commit).await;

        match &result {
            Ok(outcome) => self.registry.record(remote.clone(), outcome.clone()),
            Err(CompareError::NotFound { commit: missing, body }) => {
                warn!("Commit {missing} not found on {remote}");
                self.errors
                    .set(keys::COMMIT_NOT_FOUND, format!("{missing}\n\n{body}"));
            }
            Err(CompareError::Unexpected { detail }) => {
                self.errors.set(keys::COMPARE, detail.clone());
            }
        }

        result
    }
}
