//! Update-checker settings that the host persists on the core's behalf.
//!
//! The host embeds [`UpdateCheckSettings`] in its own settings object and owns
//! where and how it is stored.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error_log::{ErrorLog, keys};
use crate::remote::{RemoteIdentity, RemoteParseError};
use crate::schedule::{CheckSchedule, MAX_PERIOD_COMPONENT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCheckSettings {
    #[serde(default = "default_true")]
    pub auto_check_updates: bool,

    #[serde(default = "default_period_days")]
    pub update_check_period_days: i64,

    #[serde(default = "default_period_hours")]
    pub update_check_period_hours: i64,

    #[serde(default)]
    pub last_update_check_datetime: Option<String>,

    #[serde(default)]
    pub custom_remotes: Vec<RemoteIdentity>,
}

fn default_true() -> bool {
    true
}

fn default_period_days() -> i64 {
    1
}

fn default_period_hours() -> i64 {
    12
}

impl Default for UpdateCheckSettings {
    fn default() -> Self {
        Self {
            auto_check_updates: true,
            update_check_period_days: default_period_days(),
            update_check_period_hours: default_period_hours(),
            last_update_check_datetime: None,
            custom_remotes: Vec::new(),
        }
    }
}

impl UpdateCheckSettings {
    /// Time of the last successful check.
    ///
    /// An unparseable stored value is reported to `errors` and treated as
    /// "never checked".
    pub fn last_checked(&self, errors: &ErrorLog) -> Option<DateTime<Utc>> {
        let raw = self.last_update_check_datetime.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }

        match raw.parse::<NaiveDateTime>() {
            Ok(naive) => Some(naive.and_utc()),
            Err(error) => {
                errors.set(
                    keys::LAST_CHECK_DATETIME,
                    format!("could not parse {raw:?} as an ISO-8601 timestamp: {error}"),
                );
                None
            }
        }
    }

    /// Interval between scheduled checks.
    ///
    /// Components outside `0..=1000` are clamped and the adjustment is
    /// reported to `errors`.
    pub fn period(&self, errors: &ErrorLog) -> TimeDelta {
        let range = 0..=MAX_PERIOD_COMPONENT;
        let days = self.update_check_period_days;
        let hours = self.update_check_period_hours;

        if !range.contains(&days) || !range.contains(&hours) {
            errors.set(
                keys::CHECK_PERIOD,
                format!(
                    "period of {days} day(s) and {hours} hour(s) is outside 0..={MAX_PERIOD_COMPONENT}; clamping"
                ),
            );
        }

        CheckSchedule::period_from(days, hours)
    }

    pub fn schedule(&self, errors: &ErrorLog) -> CheckSchedule {
        CheckSchedule::new(self.last_checked(errors), self.period(errors))
    }

    pub fn set_last_checked(&mut self, now: DateTime<Utc>) {
        self.last_update_check_datetime = Some(now.to_rfc3339());
    }

    /// Add a remote given as a branch tree URL.
    ///
    /// Returns `false` when the remote is already listed.
    ///
    /// # Errors
    /// Returns an error when the URL is not a branch tree URL.
    pub fn add_custom_remote_from_url(&mut self, url: &str) -> Result<bool, RemoteParseError> {
        let remote = RemoteIdentity::parse_tree_url(url)?;
        if self.custom_remotes.contains(&remote) {
            return Ok(false);
        }
        self.custom_remotes.push(remote);
        Ok(true)
    }
}
