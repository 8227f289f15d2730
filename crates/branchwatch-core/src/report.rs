use crate::checker::UpdateChecker;
use crate::compare::CompareOutcome;
use crate::remote::RemoteIdentity;
use crate::settings::UpdateCheckSettings;

/// Render settings, per-remote results and recorded errors as plain text.
#[must_use]
pub fn render_report(settings: &UpdateCheckSettings, checker: &UpdateChecker) -> String {
    let mut lines = vec![
        format!(
            "Auto-check updates: {}",
            if settings.auto_check_updates { "yes" } else { "no" }
        ),
        format!(
            "Update check period: {} day(s), {} hour(s)",
            settings.update_check_period_days, settings.update_check_period_hours
        ),
        format!(
            "Last update check: {}",
            settings
                .last_update_check_datetime
                .as_deref()
                .unwrap_or("never")
        ),
    ];

    lines.push(match checker.version() {
        Some(version) => format!(
            "Installed: {} at {}",
            version.remote,
            version.commit.as_deref().unwrap_or("branch tip")
        ),
        None => "Installed: unknown (no version metadata)".to_string(),
    });

    let remotes = checker.tracked_remotes(settings);
    if !remotes.is_empty() {
        lines.push(String::new());
        lines.push("Remotes:".to_string());
        for remote in &remotes {
            render_remote(&mut lines, checker, remote);
        }
    }

    let errors = checker.errors().all();
    if !errors.is_empty() {
        lines.push(String::new());
        lines.push("Errors:".to_string());
        for (key, detail) in errors {
            lines.push(format!("  [{key}]"));
            lines.extend(detail.lines().map(|line| format!("    {line}")));
        }
    }

    lines.join("\n")
}

fn render_remote(lines: &mut Vec<String>, checker: &UpdateChecker, remote: &RemoteIdentity) {
    lines.push(format!("  {remote} ({})", remote.tree_url()));

    match checker.registry().get(remote) {
        Some(outcome) => render_outcome(lines, &outcome),
        None if checker.baseline_for(remote).is_none() => {
            lines.push("    no local baseline, on-demand check unavailable".to_string());
        }
        None => lines.push("    never checked".to_string()),
    }
}

fn render_outcome(lines: &mut Vec<String>, outcome: &CompareOutcome) {
    if outcome.is_up_to_date() {
        lines.push("    up to date".to_string());
    } else {
        lines.push(format!("    {} new commit(s):", outcome.ahead_by));
        lines.extend(
            outcome
                .ahead_by_commits
                .iter()
                .map(|message| format!("      - {message}")),
        );
    }

    if outcome.behind_by > 0 {
        lines.push(format!(
            "    installed commit has {} commit(s) not on this branch",
            outcome.behind_by
        ));
    }
}
