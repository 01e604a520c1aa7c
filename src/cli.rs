//! CLI Argument Parsing
//!
//! Global flags (--json, --verbose, --config, --yes) are inherited by all
//! subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// omnirelease - change tracking and release lifecycle for OmniStudio
#[derive(Parser, Debug)]
#[command(name = "omnirelease")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (default: ./omnirelease.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Components named on the command line or in a selection file
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Component as `<Kind>:<Name>` (e.g. `DataRaptor:DRGetCase`, `Metadata/ApexClass:CaseService`)
    #[arg(short = 'c', long = "component", value_name = "KIND:NAME")]
    pub components: Vec<String>,

    /// JSON selection file keyed by component kind
    #[arg(long, value_name = "FILE")]
    pub selection: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every active component of an environment and record changes
    Refresh {
        /// Environment alias
        #[arg(short, long)]
        env: String,
    },

    /// Show components changed since the latest release
    Pending {
        #[arg(short, long)]
        env: String,
    },

    /// Report dependencies a selection omits
    Check {
        #[arg(short, long)]
        env: String,

        /// Read component bodies from an exported bundle instead of the store
        #[arg(long, value_name = "DIR")]
        bundle: Option<PathBuf>,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Export, validate and deploy a selection, then record and publish the release
    Deploy {
        /// Source environment alias
        #[arg(short, long)]
        env: String,

        /// Target environment alias (repeatable)
        #[arg(short, long = "target", required = true)]
        targets: Vec<String>,

        /// Release repository branch
        #[arg(short, long)]
        branch: String,

        /// Human-readable release name
        #[arg(long)]
        name: Option<String>,

        /// Deploy even when dependencies are missing from the selection
        #[arg(long)]
        allow_missing: bool,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// List recorded releases, newest first
    Releases {
        #[arg(short, long)]
        env: String,

        /// Only releases of this branch
        #[arg(short, long)]
        branch: Option<String>,
    },

    /// Deployment log of a release, or the rollback history when no release is given
    History {
        #[arg(short, long)]
        env: String,

        /// Release id
        #[arg(long)]
        release: Option<String>,
    },

    /// Remove the files a commit added or modified, keeping a backup
    Rollback {
        #[arg(short, long)]
        env: String,

        #[arg(short, long)]
        branch: String,

        /// Commit to roll back
        commit: String,
    },

    /// Restore the files of a rolled-back commit from its backup
    RedeployRollback {
        #[arg(short, long)]
        env: String,

        #[arg(short, long)]
        branch: String,

        commit: String,
    },

    /// Re-run a recorded release, optionally with more components
    RedeployRelease {
        #[arg(short, long)]
        env: String,

        /// Release id
        release: String,

        #[arg(long)]
        allow_missing: bool,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Deploy a recorded release's tagged content to another environment
    Promote {
        #[arg(short, long)]
        env: String,

        /// Release id
        release: String,

        /// Environment to promote to
        #[arg(short, long)]
        target: String,
    },
}
