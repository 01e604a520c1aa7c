use omnirelease::application::{DeployResult, PromoteResult};
use omnirelease::domain::entities::{DeployStatus, DeploymentLogEntry, ReleaseRecord};

use crate::ui::text::{status_line, ColoredText};
use crate::ui::theme::Icon;

fn status_icon(status: DeployStatus) -> Icon {
    match status {
        DeployStatus::Success => Icon::Success,
        DeployStatus::Warning => Icon::Warning,
        DeployStatus::Error => Icon::Error,
    }
}

pub fn render_log_entry(entry: &DeploymentLogEntry, color: bool, unicode: bool) -> String {
    let mut line = format!(
        "{} {}",
        status_line(
            status_icon(entry.status),
            &format!("{} {}", entry.target_alias, entry.status.as_str()),
            color,
            unicode
        ),
        ColoredText::dim(entry.timestamp.to_rfc3339()).render(color)
    );
    if !entry.details.trim().is_empty() {
        for detail in entry.details.lines() {
            line.push_str(&format!("\n      {detail}"));
        }
    }
    line
}

fn title(record: &ReleaseRecord) -> String {
    match &record.release_name {
        Some(name) => format!("{} ({name})", record.release_id),
        None => record.release_id.to_string(),
    }
}

pub fn render_deploy(result: &DeployResult, color: bool, unicode: bool) -> String {
    let mut out = String::new();
    let release = &result.release;
    out.push_str(
        &ColoredText::info(format!("Release {}", title(release)))
            .bold()
            .render(color),
    );
    out.push('\n');
    out.push_str(&format!(
        "  {} from {} on {}, {} component(s)\n",
        release.deployed_by,
        release.source_environment_alias,
        release.target_branch,
        release.component_selection.len()
    ));
    out.push_str(&format!(
        "  recorded: {} created, {} modified, {} unchanged\n",
        result.recorded.created, result.recorded.modified, result.recorded.unchanged
    ));
    for warning in &result.export_warnings {
        out.push_str(&format!(
            "  {}\n",
            status_line(Icon::Warning, warning, color, unicode)
        ));
    }
    for component in &result.skipped {
        out.push_str(&format!(
            "  {}\n",
            status_line(
                Icon::Warning,
                &format!("{component} was not exported, dependencies unchecked"),
                color,
                unicode
            )
        ));
    }
    if result.dependencies.has_missing() {
        out.push_str(&format!(
            "  {}\n",
            status_line(
                Icon::Warning,
                &format!(
                    "deployed with {} missing dependencies",
                    result.dependencies.missing_count()
                ),
                color,
                unicode
            )
        ));
        out.push_str(&super::components::render_missing(
            &result.dependencies,
            color,
            unicode,
        ));
    }
    for entry in &result.outcomes {
        out.push_str(&format!("  {}\n", render_log_entry(entry, color, unicode)));
    }

    let summary = match (&result.release_commit, result.published) {
        (Some(commit), true) => status_line(
            Icon::Success,
            &format!("Published and tagged at {}", short(commit)),
            color,
            unicode,
        ),
        (None, true) => status_line(
            Icon::Success,
            "Tagged; release files were already up to date",
            color,
            unicode,
        ),
        (_, false) => status_line(
            Icon::Error,
            "Not published: at least one target failed (the release is still recorded)",
            color,
            unicode,
        ),
    };
    out.push_str(&summary);
    out.push('\n');
    out
}

pub fn render_promote(result: &PromoteResult, color: bool, unicode: bool) -> String {
    format!(
        "{}\n  {}\n",
        ColoredText::info(format!("Promoted {}", title(&result.release)))
            .bold()
            .render(color),
        render_log_entry(&result.outcome, color, unicode)
    )
}

pub fn render_release_list(records: &[ReleaseRecord], color: bool, unicode: bool) -> String {
    if records.is_empty() {
        return "No releases recorded\n".to_string();
    }
    let mut out = String::new();
    for record in records {
        let failed = record
            .deployment_log
            .iter()
            .any(|e| e.status == DeployStatus::Error);
        let icon = if record.deployment_log.is_empty() {
            Icon::Pending
        } else if failed {
            Icon::Warning
        } else {
            Icon::Success
        };
        out.push_str(&format!(
            "{} {}\n",
            status_line(icon, &title(record), color, unicode),
            ColoredText::dim(format!(
                "{} {} by {}, {} component(s), targets: {}",
                record.target_branch,
                record.deployed_at.to_rfc3339(),
                record.deployed_by,
                record.component_selection.len(),
                record.targets().join(", ")
            ))
            .render(color)
        ));
    }
    out
}

pub fn render_release_log(
    record: &ReleaseRecord,
    color: bool,
    unicode: bool,
) -> String {
    let mut out = format!(
        "{}\n",
        ColoredText::info(format!("Release {}", title(record)))
            .bold()
            .render(color)
    );
    if record.deployment_log.is_empty() {
        out.push_str("  no deployments logged\n");
    }
    for entry in &record.deployment_log {
        out.push_str(&format!("  {}\n", render_log_entry(entry, color, unicode)));
    }
    out
}

pub(crate) fn short(commit: &str) -> &str {
    commit.get(..10).unwrap_or(commit)
}
