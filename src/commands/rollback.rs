use anyhow::Result;
use dialoguer::Confirm;

use omnirelease::application::RollbackOptions;
use omnirelease::presentation::create_rollback_use_case;

use super::{CommandStatus, Runtime};
use crate::ui::json::emit;
use crate::ui::views::rollback::{render_history, render_redeploy, render_rollback};

/// Prompt unless --yes, --json or nobody is at the terminal
fn confirmed(rt: &Runtime, prompt: String) -> Result<bool> {
    if rt.yes || rt.ui.json || !rt.ui.caps.can_prompt() {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

pub fn rollback(rt: &Runtime, env: &str, branch: &str, commit: &str) -> Result<CommandStatus> {
    rt.config.require_repository_url()?;
    let use_case = create_rollback_use_case(&rt.context);
    let options = RollbackOptions::new(env, branch, commit, rt.config.actor());

    if !confirmed(
        rt,
        format!("Remove the files commit {commit} added or modified on {branch}?"),
    )? {
        println!("Aborted.");
        return Ok(CommandStatus::Success);
    }

    let record = use_case.rollback(&options)?;

    if rt.ui.json {
        emit(&record)?;
    } else {
        print!("{}", render_rollback(&record, rt.ui.color(), rt.ui.unicode()));
    }
    Ok(CommandStatus::Success)
}

pub fn redeploy(rt: &Runtime, env: &str, branch: &str, commit: &str) -> Result<CommandStatus> {
    rt.config.require_repository_url()?;
    let options = RollbackOptions::new(env, branch, commit, rt.config.actor());
    let record = create_rollback_use_case(&rt.context).redeploy_rollback(&options)?;

    if rt.ui.json {
        emit(&record)?;
    } else {
        print!("{}", render_redeploy(&record, rt.ui.color(), rt.ui.unicode()));
    }
    Ok(CommandStatus::Success)
}

pub fn history(rt: &Runtime, env: &str) -> Result<CommandStatus> {
    let history = create_rollback_use_case(&rt.context).history(env)?;

    if rt.ui.json {
        emit(&history)?;
    } else {
        print!("{}", render_history(&history, rt.ui.color(), rt.ui.unicode()));
    }
    Ok(CommandStatus::Success)
}
