use omnirelease::application::RefreshReport;
use omnirelease::domain::entities::{DependencyReport, KindMap};
use omnirelease::domain::services::PendingComponent;

use crate::ui::text::{status_line, ColoredText};
use crate::ui::theme::Icon;

pub fn render_refresh(alias: &str, report: &RefreshReport, color: bool, unicode: bool) -> String {
    let mut out = String::new();
    out.push_str(&status_line(
        Icon::Success,
        &format!(
            "Refreshed {alias}: {} available, {} exported",
            report.available, report.exported
        ),
        color,
        unicode,
    ));
    out.push('\n');
    out.push_str(&format!(
        "  {} created, {} modified, {} unchanged\n",
        report.recorded.created, report.recorded.modified, report.recorded.unchanged
    ));
    for warning in &report.warnings {
        out.push_str(&format!(
            "  {}\n",
            status_line(Icon::Warning, warning, color, unicode)
        ));
    }
    out
}

pub fn render_pending(
    alias: &str,
    pending: &KindMap<Vec<PendingComponent>>,
    color: bool,
    unicode: bool,
) -> String {
    if pending.is_empty() {
        return format!(
            "{}\n",
            status_line(
                Icon::Success,
                &format!("Nothing pending in {alias}"),
                color,
                unicode
            )
        );
    }

    let mut out = String::new();
    for (kind, components) in pending.iter() {
        out.push_str(&ColoredText::info(kind.to_string()).bold().render(color));
        out.push('\n');
        for component in components {
            let note = if component.was_previously_deployed {
                "changed since release"
            } else {
                "never released"
            };
            out.push_str(&format!(
                "  {} {} {}\n",
                Icon::Pending.as_str(unicode),
                component.record.name,
                ColoredText::dim(format!(
                    "({note}, modified {})",
                    component.record.modified_at
                ))
                .render(color)
            ));
        }
    }
    out
}

/// Missing dependencies grouped by owner
pub fn render_missing(report: &DependencyReport, color: bool, unicode: bool) -> String {
    let mut out = String::new();
    for (kind, owners) in report.missing.iter() {
        for (owner, names) in owners {
            for name in names {
                out.push_str(&format!(
                    "  {} {} {}\n",
                    Icon::Arrow.as_str(unicode),
                    ColoredText::warning(format!("{kind}:{name}")).render(color),
                    ColoredText::dim(format!("needed by {owner}")).render(color)
                ));
            }
        }
    }
    out
}

pub fn render_check(report: &DependencyReport, color: bool, unicode: bool) -> String {
    if !report.has_missing() {
        let edges: usize = report
            .all
            .values()
            .flat_map(|owners| owners.values())
            .flat_map(|deps| deps.values())
            .map(|names| names.len())
            .sum();
        return format!(
            "{}\n",
            status_line(
                Icon::Success,
                &format!("All dependencies selected ({edges} references checked)"),
                color,
                unicode
            )
        );
    }

    let mut out = status_line(
        Icon::Warning,
        &format!("{} missing dependencies", report.missing_count()),
        color,
        unicode,
    );
    out.push('\n');
    out.push_str(&render_missing(report, color, unicode));
    out
}
