use std::path::Path;

use anyhow::Result;
use serde_json::json;

use omnirelease::application::{detect_missing_dependencies, StoredComponents};
use omnirelease::domain::services::DependencyResolver;
use omnirelease::infrastructure::BundleSource;
use omnirelease::presentation::create_pending_use_case;

use super::{read_selection, CommandStatus, Runtime};
use crate::cli::SelectionArgs;
use crate::ui::json::emit;
use crate::ui::views::components::{render_check, render_pending, render_refresh};

pub fn refresh(rt: &Runtime, env: &str) -> Result<CommandStatus> {
    let store = rt.context.component_store();
    let report = store.refresh(
        env,
        rt.context.exporter.as_ref(),
        rt.config.export_batching(),
    )?;

    if rt.ui.json {
        emit(&report)?;
    } else {
        print!(
            "{}",
            render_refresh(env, &report, rt.ui.color(), rt.ui.unicode())
        );
    }
    Ok(CommandStatus::Success)
}

pub fn pending(rt: &Runtime, env: &str) -> Result<CommandStatus> {
    let pending = create_pending_use_case(&rt.context).compute_pending(env)?;

    if rt.ui.json {
        emit(&pending)?;
    } else {
        print!(
            "{}",
            render_pending(env, &pending, rt.ui.color(), rt.ui.unicode())
        );
    }
    Ok(CommandStatus::Success)
}

/// Missing dependencies are reported, not raised; the exit code says whether any exist
pub fn check(
    rt: &Runtime,
    env: &str,
    bundle: Option<&Path>,
    args: &SelectionArgs,
) -> Result<CommandStatus> {
    let selection = read_selection(args)?;
    let resolver = DependencyResolver::new();

    let report = match bundle {
        Some(dir) => detect_missing_dependencies(&resolver, &selection, &BundleSource::new(dir))?,
        None => {
            let index = rt.context.component_store().load(env)?;
            detect_missing_dependencies(&resolver, &selection, &StoredComponents::new(&index))?
        }
    };

    if rt.ui.json {
        emit(&json!({
            "missing_count": report.missing_count(),
            "report": report,
        }))?;
    } else {
        print!("{}", render_check(&report, rt.ui.color(), rt.ui.unicode()));
    }

    Ok(if report.has_missing() {
        CommandStatus::Failed
    } else {
        CommandStatus::Success
    })
}
