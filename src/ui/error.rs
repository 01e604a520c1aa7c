//! Failure rendering
//!
//! A failed command reports its category and detail, plus whatever partial
//! result the failure carries (a missing-dependency report, a partial
//! rollback record).

use serde_json::{json, Value};

use omnirelease::error::ReleaseError;

use crate::ui::text::ColoredText;
use crate::ui::theme::Icon;
use crate::ui::UiContext;

/// Category name for any error reaching the top level
pub fn category_of(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<ReleaseError>() {
        Some(release) => release.category().as_str(),
        None => "InternalError",
    }
}

fn partial_of(err: &anyhow::Error) -> Option<Value> {
    match err.downcast_ref::<ReleaseError>()? {
        ReleaseError::MissingDependencies(report) => serde_json::to_value(report).ok(),
        ReleaseError::PartialFailure {
            record: Some(record),
            failed,
            ..
        } => Some(json!({ "record": record, "failed": failed })),
        ReleaseError::PartialFailure {
            record: None,
            failed,
            ..
        } => Some(json!({ "failed": failed })),
        _ => None,
    }
}

/// `{"error": {"category", "detail"}, "partial": ...}`
pub fn error_document(err: &anyhow::Error) -> Value {
    let mut doc = json!({
        "error": {
            "category": category_of(err),
            "detail": format!("{err:#}"),
        }
    });
    if let Some(partial) = partial_of(err) {
        doc["partial"] = partial;
    }
    doc
}

pub fn format_error(err: &anyhow::Error, ui: &UiContext) -> String {
    let color = ui.color();
    let unicode = ui.unicode();
    let mut out = format!(
        "{} {err:#}\n",
        ColoredText::error(format!("{} {}", Icon::Error.as_str(unicode), category_of(err)))
            .bold()
            .render(color),
    );

    if let Some(ReleaseError::MissingDependencies(report)) = err.downcast_ref::<ReleaseError>() {
        out.push_str(&crate::ui::views::components::render_missing(report, color, unicode));
        out.push_str(
            &ColoredText::dim("  add the components above, or pass --allow-missing\n")
                .render(color),
        );
    }
    if let Some(ReleaseError::PartialFailure { record, failed, .. }) =
        err.downcast_ref::<ReleaseError>()
    {
        for path in failed {
            out.push_str(&format!(
                "  {} {}\n",
                Icon::Warning.as_str(unicode),
                ColoredText::warning(format!("not backed up: {path}")).render(color)
            ));
        }
        if let Some(record) = record {
            out.push_str(&crate::ui::views::rollback::render_rollback(record, color, unicode));
        }
    }
    out
}
