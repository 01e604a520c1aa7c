use anyhow::Result;

use omnirelease::application::{DeployOptions, PromoteOptions, RedeployOptions};
use omnirelease::domain::value_objects::ReleaseId;
use omnirelease::error::ReleaseError;
use omnirelease::presentation::create_deploy_use_case;

use super::{read_selection, CommandStatus, Runtime};
use crate::cli::SelectionArgs;
use crate::ui::json::emit;
use crate::ui::views::releases::{
    render_deploy, render_promote, render_release_list, render_release_log,
};

pub struct DeployArgs {
    pub env: String,
    pub targets: Vec<String>,
    pub branch: String,
    pub name: Option<String>,
    pub allow_missing: bool,
}

fn parse_release_id(raw: &str) -> Result<ReleaseId, ReleaseError> {
    raw.parse().map_err(ReleaseError::Validation)
}

pub fn deploy(rt: &Runtime, args: DeployArgs, selection: &SelectionArgs) -> Result<CommandStatus> {
    rt.config.require_repository_url()?;
    let selection = read_selection(selection)?;

    let mut options = DeployOptions::new(&args.env, &args.branch, selection, rt.config.actor())
        .with_allow_missing(args.allow_missing);
    for target in args.targets {
        options = options.with_target(target);
    }
    if let Some(name) = args.name {
        options = options.with_name(name);
    }

    let result = create_deploy_use_case(&rt.context).execute(&options)?;

    if rt.ui.json {
        emit(&result)?;
    } else {
        print!("{}", render_deploy(&result, rt.ui.color(), rt.ui.unicode()));
    }
    Ok(if result.published {
        CommandStatus::Success
    } else {
        CommandStatus::Failed
    })
}

pub fn redeploy(
    rt: &Runtime,
    env: &str,
    release: &str,
    allow_missing: bool,
    additional: &SelectionArgs,
) -> Result<CommandStatus> {
    rt.config.require_repository_url()?;
    let options = RedeployOptions {
        source_alias: env.to_string(),
        release_id: parse_release_id(release)?,
        additional: read_selection(additional)?,
        actor: rt.config.actor(),
        allow_missing,
    };

    let result = create_deploy_use_case(&rt.context).redeploy_release(&options)?;

    if rt.ui.json {
        emit(&result)?;
    } else {
        print!("{}", render_deploy(&result, rt.ui.color(), rt.ui.unicode()));
    }
    Ok(if result.published {
        CommandStatus::Success
    } else {
        CommandStatus::Failed
    })
}

pub fn promote(rt: &Runtime, env: &str, release: &str, target: &str) -> Result<CommandStatus> {
    rt.config.require_repository_url()?;
    let options = PromoteOptions {
        source_alias: env.to_string(),
        release_id: parse_release_id(release)?,
        target: target.to_string(),
        actor: rt.config.actor(),
    };

    let result = create_deploy_use_case(&rt.context).promote_release(&options)?;

    if rt.ui.json {
        emit(&result)?;
    } else {
        print!("{}", render_promote(&result, rt.ui.color(), rt.ui.unicode()));
    }
    Ok(if result.outcome.status.is_success() {
        CommandStatus::Success
    } else {
        CommandStatus::Failed
    })
}

pub fn list(rt: &Runtime, env: &str, branch: Option<&str>) -> Result<CommandStatus> {
    let records = rt.context.ledger().list_releases(env, branch)?;

    if rt.ui.json {
        emit(&records)?;
    } else {
        print!(
            "{}",
            render_release_list(&records, rt.ui.color(), rt.ui.unicode())
        );
    }
    Ok(CommandStatus::Success)
}

pub fn history(rt: &Runtime, env: &str, release: &str) -> Result<CommandStatus> {
    let id = parse_release_id(release)?;
    let record = rt.context.ledger().get_release(env, &id)?;

    if rt.ui.json {
        emit(&record.deployment_log)?;
    } else {
        print!(
            "{}",
            render_release_log(&record, rt.ui.color(), rt.ui.unicode())
        );
    }
    Ok(CommandStatus::Success)
}
