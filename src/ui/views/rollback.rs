use omnirelease::domain::entities::{RedeployRecord, RollbackHistory, RollbackRecord};

use super::releases::short;
use crate::ui::text::{status_line, ColoredText};
use crate::ui::theme::Icon;

pub fn render_rollback(record: &RollbackRecord, color: bool, unicode: bool) -> String {
    let mut out = status_line(
        Icon::Success,
        &format!(
            "Rolled back {} on {} ({} file(s) removed)",
            short(&record.commit_id),
            record.branch,
            record.deleted_file_paths.len()
        ),
        color,
        unicode,
    );
    out.push('\n');
    for path in &record.deleted_file_paths {
        out.push_str(&format!("  - {path}\n"));
    }
    if let Some(commit) = &record.rollback_commit {
        out.push_str(
            &ColoredText::dim(format!("  rollback commit {}\n", short(commit))).render(color),
        );
    }
    out
}

pub fn render_redeploy(record: &RedeployRecord, color: bool, unicode: bool) -> String {
    let mut out = status_line(
        Icon::Success,
        &format!(
            "Restored {} on {} ({} file(s))",
            short(&record.commit_id),
            record.branch,
            record.restored_file_paths.len()
        ),
        color,
        unicode,
    );
    out.push('\n');
    for path in &record.restored_file_paths {
        out.push_str(&format!("  + {path}\n"));
    }
    match &record.redeploy_commit {
        Some(commit) => out.push_str(
            &ColoredText::dim(format!("  redeploy commit {}\n", short(commit))).render(color),
        ),
        None => out.push_str(
            &ColoredText::dim("  branch already held these files; nothing committed\n")
                .render(color),
        ),
    }
    out
}

/// Rollbacks and redeploys interleaved by time
pub fn render_history(history: &RollbackHistory, color: bool, unicode: bool) -> String {
    if history.rollbacks.is_empty() && history.redeploys.is_empty() {
        return "No rollbacks recorded\n".to_string();
    }

    let mut events: Vec<(chrono::DateTime<chrono::Utc>, String)> = Vec::new();
    for r in &history.rollbacks {
        events.push((
            r.rolled_back_at,
            status_line(
                Icon::Warning,
                &format!(
                    "rollback  {} on {} by {} ({} file(s))",
                    short(&r.commit_id),
                    r.branch,
                    r.rolled_back_by,
                    r.deleted_file_paths.len()
                ),
                color,
                unicode,
            ),
        ));
    }
    for r in &history.redeploys {
        events.push((
            r.redeployed_at,
            status_line(
                Icon::Success,
                &format!(
                    "redeploy  {} on {} by {} ({} file(s))",
                    short(&r.commit_id),
                    r.branch,
                    r.redeployed_by,
                    r.restored_file_paths.len()
                ),
                color,
                unicode,
            ),
        ));
    }
    events.sort_by(|a, b| a.0.cmp(&b.0));

    events
        .into_iter()
        .map(|(at, line)| {
            format!(
                "{} {}\n",
                ColoredText::dim(at.to_rfc3339()).render(color),
                line
            )
        })
        .collect()
}
