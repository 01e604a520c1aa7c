//! Composition root
//!
//! Builds the port bundle the use cases run against from a loaded
//! configuration. This is the only place concrete adapters are chosen.

use std::sync::Arc;

use crate::application::{
    DeployUseCase, PendingUseCase, ReleaseContext, RollbackUseCase,
};
use crate::config::Config;
use crate::domain::ports::SystemClock;
use crate::infrastructure::{
    CancelFlag, FileEnvironmentLocks, GitIdentity, GitStore, JsonComponentRepository,
    JsonReleaseRepository, JsonRollbackRepository, ProcessRunner, SalesforceToolchain, SfCli,
    StateLayout, VlocityCli,
};

/// Wire every port to its production adapter
///
/// External processes share one deadline and one cancellation flag, so a
/// Ctrl-C stops whichever tool is running.
pub fn create_context(config: &Config, cancel: CancelFlag) -> ReleaseContext {
    let layout = StateLayout::new(config.state_root());
    let runner = ProcessRunner::new(config.timeout(), cancel);

    let toolchain = Arc::new(SalesforceToolchain::new(
        VlocityCli::new(&config.tools.vlocity, runner.clone()),
        SfCli::new(&config.tools.sf, runner.clone(), config.auth_url_files()),
        config.tools.metadata_types.clone(),
    ));

    let identity = GitIdentity {
        name: config.repository.author_name.clone(),
        email: config.repository.author_email.clone(),
    };

    ReleaseContext {
        components: Arc::new(JsonComponentRepository::new(layout.clone())),
        releases: Arc::new(JsonReleaseRepository::new(layout.clone())),
        rollbacks: Arc::new(JsonRollbackRepository::new(layout.clone())),
        exporter: toolchain.clone(),
        deployer: toolchain.clone(),
        authenticator: toolchain,
        version_store: Arc::new(GitStore::new(
            config.repository.url.trim(),
            identity,
            runner,
        )),
        locks: Arc::new(FileEnvironmentLocks::new(layout, config.lock_timeout())),
        clock: Arc::new(SystemClock),
        bundle_dir: config.repository.bundle_dir.clone(),
        releases_dir: config.repository.releases_dir.clone(),
    }
}

pub fn create_deploy_use_case(context: &ReleaseContext) -> DeployUseCase {
    DeployUseCase::new(context)
}

pub fn create_rollback_use_case(context: &ReleaseContext) -> RollbackUseCase {
    RollbackUseCase::new(context)
}

pub fn create_pending_use_case(context: &ReleaseContext) -> PendingUseCase {
    PendingUseCase::new(context.components.clone(), context.ledger())
}
