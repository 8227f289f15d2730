use chrono::{DateTime, TimeDelta, Utc};

use crate::remote::RemoteIdentity;

/// Upper bound for each of the period's day and hour components.
pub const MAX_PERIOD_COMPONENT: i64 = 1000;

/// When the last successful check happened and how often to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSchedule {
    pub last_checked: Option<DateTime<Utc>>,
    pub period: TimeDelta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The installation has no fixed commit to compare from.
    NoBaseline,
    NotDue { next_due: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckAction {
    Skip(SkipReason),
    Check {
        remote: RemoteIdentity,
        commit: String,
    },
}

impl CheckSchedule {
    #[must_use]
    pub fn new(last_checked: Option<DateTime<Utc>>, period: TimeDelta) -> Self {
        Self {
            last_checked,
            period,
        }
    }

    /// Build a period from day and hour counts, each clamped to
    /// `0..=MAX_PERIOD_COMPONENT`.
    #[must_use]
    pub fn period_from(days: i64, hours: i64) -> TimeDelta {
        let days = days.clamp(0, MAX_PERIOD_COMPONENT);
        let hours = hours.clamp(0, MAX_PERIOD_COMPONENT);
        TimeDelta::days(days) + TimeDelta::hours(hours)
    }

    /// A check is due when none has succeeded yet or a full period has
    /// elapsed since the last one.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.last_checked
            .is_none_or(|last_checked| now - last_checked >= self.period)
    }

    #[must_use]
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.last_checked
            .and_then(|last_checked| last_checked.checked_add_signed(self.period))
    }

    pub fn mark_checked(&mut self, now: DateTime<Utc>) {
        self.last_checked = Some(now);
    }
}

/// Decide whether a scheduled check should run now.
#[must_use]
pub fn maybe_check(
    now: DateTime<Utc>,
    schedule: &CheckSchedule,
    remote: &RemoteIdentity,
    commit: Option<&str>,
) -> CheckAction {
    let Some(commit) = commit else {
        return CheckAction::Skip(SkipReason::NoBaseline);
    };

    if !schedule.is_due(now) {
        return CheckAction::Skip(SkipReason::NotDue {
            next_due: schedule.next_due().unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
    }

    CheckAction::Check {
        remote: remote.clone(),
        commit: commit.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    use super::{CheckAction, CheckSchedule, SkipReason, maybe_check};
    use crate::remote::RemoteIdentity;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0)
            .single()
            .expect("fixed timestamp should be valid")
    }

    fn remote() -> RemoteIdentity {
        RemoteIdentity::new("octo", "widgets", "main")
    }

    #[test]
    fn never_checked_is_due() {
        let schedule = CheckSchedule::new(None, CheckSchedule::period_from(1, 12));

        assert!(schedule.is_due(now()));
    }

    #[test]
    fn due_boundary_is_inclusive() {
        let period = CheckSchedule::period_from(1, 12);

        let exactly = CheckSchedule::new(Some(now() - period), period);
        let one_second_short = CheckSchedule::new(Some(now() - period + TimeDelta::seconds(1)), period);

        assert!(exactly.is_due(now()));
        assert!(!one_second_short.is_due(now()));
    }

    #[test]
    fn zero_period_is_always_due() {
        let period = CheckSchedule::period_from(0, 0);

        for last in [now() - TimeDelta::days(400), now() - TimeDelta::seconds(1), now()] {
            assert!(CheckSchedule::new(Some(last), period).is_due(now()));
        }
    }

    #[test]
    fn period_components_are_clamped() {
        assert_eq!(
            CheckSchedule::period_from(5000, -3),
            TimeDelta::days(1000)
        );
        assert_eq!(
            CheckSchedule::period_from(i64::MAX, i64::MAX),
            TimeDelta::days(1000) + TimeDelta::hours(1000)
        );
    }

    #[test]
    fn mark_checked_pushes_next_due_out() {
        let period = CheckSchedule::period_from(0, 6);
        let mut schedule = CheckSchedule::new(None, period);

        schedule.mark_checked(now());

        assert!(!schedule.is_due(now() + TimeDelta::hours(5)));
        assert_eq!(schedule.next_due(), Some(now() + period));
    }

    #[test]
    fn maybe_check_skips_without_baseline() {
        let schedule = CheckSchedule::new(None, TimeDelta::zero());

        assert_eq!(
            maybe_check(now(), &schedule, &remote(), None),
            CheckAction::Skip(SkipReason::NoBaseline)
        );
    }

    #[test]
    fn maybe_check_skips_when_not_due() {
        let period = CheckSchedule::period_from(1, 0);
        let last = now() - TimeDelta::hours(2);
        let schedule = CheckSchedule::new(Some(last), period);

        assert_eq!(
            maybe_check(now(), &schedule, &remote(), Some("deadbeef")),
            CheckAction::Skip(SkipReason::NotDue {
                next_due: last + period
            })
        );
    }

    #[test]
    fn maybe_check_checks_when_due() {
        let schedule = CheckSchedule::new(None, CheckSchedule::period_from(1, 0));

        assert_eq!(
            maybe_check(now(), &schedule, &remote(), Some("deadbeef")),
            CheckAction::Check {
                remote: remote(),
                commit: "deadbeef".to_string(),
            }
        );
    }
}
