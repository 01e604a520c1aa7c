//! Command handlers
//!
//! Each handler runs one use case and renders its result as text or JSON.
//! Handlers return [`CommandStatus::Failed`] for outcomes that are not errors
//! but still warrant a non-zero exit (an unpublished release).

pub mod components;
pub mod releases;
pub mod rollback;

use std::fs;

use anyhow::{Context, Result};

use omnirelease::application::ReleaseContext;
use omnirelease::config::{self, Config, ConfigWarning};
use omnirelease::domain::entities::ComponentSelection;
use omnirelease::domain::value_objects::ComponentKind;
use omnirelease::error::ReleaseError;
use omnirelease::infrastructure::CancelFlag;
use omnirelease::presentation;

use crate::cli::{Cli, Commands, SelectionArgs};
use crate::ui::text::ColoredText;
use crate::ui::UiContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failed,
}

/// Loaded configuration plus the wired port bundle
pub struct Runtime {
    pub config: Config,
    pub context: ReleaseContext,
    pub ui: UiContext,
    pub yes: bool,
}

pub fn run(cli: Cli, cancel: CancelFlag) -> Result<CommandStatus> {
    let ui = UiContext::new(cli.json);
    let loaded = config::discover(cli.config.as_deref())?;
    print_config_warnings(&loaded.warnings, &ui);

    let context = presentation::create_context(&loaded.config, cancel);
    let rt = Runtime {
        config: loaded.config,
        context,
        ui,
        yes: cli.yes,
    };

    match cli.command {
        Commands::Refresh { env } => components::refresh(&rt, &env),
        Commands::Pending { env } => components::pending(&rt, &env),
        Commands::Check {
            env,
            bundle,
            selection,
        } => components::check(&rt, &env, bundle.as_deref(), &selection),
        Commands::Deploy {
            env,
            targets,
            branch,
            name,
            allow_missing,
            selection,
        } => releases::deploy(
            &rt,
            releases::DeployArgs {
                env,
                targets,
                branch,
                name,
                allow_missing,
            },
            &selection,
        ),
        Commands::Releases { env, branch } => releases::list(&rt, &env, branch.as_deref()),
        Commands::History { env, release } => match release {
            Some(id) => releases::history(&rt, &env, &id),
            None => rollback::history(&rt, &env),
        },
        Commands::Rollback {
            env,
            branch,
            commit,
        } => rollback::rollback(&rt, &env, &branch, &commit),
        Commands::RedeployRollback {
            env,
            branch,
            commit,
        } => rollback::redeploy(&rt, &env, &branch, &commit),
        Commands::RedeployRelease {
            env,
            release,
            allow_missing,
            selection,
        } => releases::redeploy(&rt, &env, &release, allow_missing, &selection),
        Commands::Promote {
            env,
            release,
            target,
        } => releases::promote(&rt, &env, &release, &target),
    }
}

fn print_config_warnings(warnings: &[ConfigWarning], ui: &UiContext) {
    for w in warnings {
        let location = match w.line {
            Some(line) => format!("{}:{line}", w.file.display()),
            None => w.file.display().to_string(),
        };
        let mut message = format!("unknown config key '{}' in {location}", w.key);
        if let Some(suggestion) = &w.suggestion {
            message.push_str(&format!(" (did you mean '{suggestion}'?)"));
        }
        eprintln!(
            "{}",
            ColoredText::warning(format!("warning: {message}")).render(ui.color())
        );
    }
}

/// Selection from `--selection` and `--component`, merged
pub fn read_selection(args: &SelectionArgs) -> Result<ComponentSelection> {
    let mut selection = match &args.selection {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading selection file {}", path.display()))?;
            serde_json::from_str::<ComponentSelection>(&content).map_err(|e| {
                ReleaseError::Validation(format!("selection file {}: {e}", path.display()))
            })?
        }
        None => ComponentSelection::new(),
    };

    for spec in &args.components {
        let (kind, name) = parse_component(spec)?;
        selection.insert(kind, name);
    }
    Ok(selection)
}

/// `DataRaptor:DRGetCase` or `Metadata/ApexClass:CaseService`
pub fn parse_component(spec: &str) -> Result<(ComponentKind, String), ReleaseError> {
    let Some((kind, name)) = spec.split_once(':') else {
        return Err(ReleaseError::Validation(format!(
            "component '{spec}' must be written as <Kind>:<Name>"
        )));
    };
    let kind: ComponentKind = kind.trim().parse().map_err(ReleaseError::Validation)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ReleaseError::Validation(format!(
            "component '{spec}' has an empty name"
        )));
    }
    Ok((kind, name.to_string()))
}
