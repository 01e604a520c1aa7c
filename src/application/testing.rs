//! In-memory port implementations shared by the use case tests

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use crate::domain::entities::{ComponentBody, ComponentSelection, MaterializedComponent};
use crate::domain::ports::{
    Authenticator, ChangeStatus, Clock, DeployOutcome, Deployer, ExportReport, Exporter,
    FileChange, ToolError, VersionStore, WorkingTree,
};
use crate::domain::value_objects::ComponentKind;
use crate::infrastructure::{
    FileEnvironmentLocks, JsonComponentRepository, JsonReleaseRepository, JsonRollbackRepository,
    StateLayout,
};

use super::context::ReleaseContext;

/// Clock that advances by `step` on every reading
pub struct StepClock {
    now: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl Default for StepClock {
    fn default() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }
}

impl StepClock {
    pub fn starting_at(at: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(at),
            step: Duration::seconds(1),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let mut now = self.now.lock().unwrap();
        let current = *now;
        *now += self.step;
        current
    }
}

#[derive(Debug, Clone)]
struct MockCommit {
    parent: Option<String>,
    message: String,
    files: BTreeMap<String, Vec<u8>>,
    changes: Vec<FileChange>,
}

#[derive(Default)]
struct RemoteState {
    commits: BTreeMap<String, MockCommit>,
    branches: BTreeMap<String, String>,
    tags: BTreeMap<String, String>,
    next_id: u64,
}

impl RemoteState {
    fn resolve(&self, revision: &str) -> Option<String> {
        if let Some(commit) = self.tags.get(revision) {
            return Some(commit.clone());
        }
        if let Some(commit) = self.branches.get(revision) {
            return Some(commit.clone());
        }
        if self.commits.contains_key(revision) {
            return Some(revision.to_string());
        }
        let mut prefixed = self.commits.keys().filter(|id| id.starts_with(revision));
        match (prefixed.next(), prefixed.next()) {
            (Some(id), None) if revision.len() >= 4 => Some(id.clone()),
            _ => None,
        }
    }

    fn files_at(&self, commit: Option<&String>) -> BTreeMap<String, Vec<u8>> {
        commit
            .and_then(|id| self.commits.get(id))
            .map(|c| c.files.clone())
            .unwrap_or_default()
    }
}

/// Remote repository kept in memory; trees are real directories
#[derive(Clone, Default)]
pub struct MockVersionStore {
    state: Arc<Mutex<RemoteState>>,
    fail_push: Arc<Mutex<bool>>,
}

impl MockVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit `files` on top of `branch` as if someone else had pushed it
    pub fn seed_commit(&self, branch: &str, files: &[(&str, &[u8])], message: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let parent = state.branches.get(branch).cloned();
        let mut content = state.files_at(parent.as_ref());
        let mut changes = Vec::new();
        for (path, bytes) in files {
            let status = if content.contains_key(*path) {
                ChangeStatus::Modified
            } else {
                ChangeStatus::Added
            };
            content.insert(path.to_string(), bytes.to_vec());
            changes.push(FileChange::new(status, *path));
        }
        let id = next_commit_id(&mut state);
        state.commits.insert(
            id.clone(),
            MockCommit {
                parent,
                message: message.to_string(),
                files: content,
                changes,
            },
        );
        state.branches.insert(branch.to_string(), id.clone());
        id
    }

    pub fn head(&self, branch: &str) -> Option<String> {
        self.state.lock().unwrap().branches.get(branch).cloned()
    }

    pub fn branch_files(&self, branch: &str) -> BTreeMap<String, Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.files_at(state.branches.get(branch))
    }

    /// Messages from the oldest commit on `branch` to its head
    pub fn commit_messages(&self, branch: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut messages = Vec::new();
        let mut cursor = state.branches.get(branch).cloned();
        while let Some(id) = cursor {
            let commit = &state.commits[&id];
            messages.push(commit.message.clone());
            cursor = commit.parent.clone();
        }
        messages.reverse();
        messages
    }

    pub fn tags(&self) -> Vec<String> {
        self.state.lock().unwrap().tags.keys().cloned().collect()
    }

    pub fn tag_target(&self, name: &str) -> Option<String> {
        self.state.lock().unwrap().tags.get(name).cloned()
    }

    /// List `path` as added by `commit` without storing any content for it
    pub fn add_phantom_change(&self, commit: &str, path: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(c) = state.commits.get_mut(commit) {
            c.changes.push(FileChange::new(ChangeStatus::Added, path));
        }
    }

    pub fn fail_pushes(&self) {
        *self.fail_push.lock().unwrap() = true;
    }
}

fn next_commit_id(state: &mut RemoteState) -> String {
    state.next_id += 1;
    format!("{:040x}", 0xabc0_0000_u64 + state.next_id)
}

impl VersionStore for MockVersionStore {
    fn clone_tree(&self) -> Result<Box<dyn WorkingTree>, ToolError> {
        let dir = tempfile::Builder::new()
            .prefix("omnirelease-mock-")
            .tempdir()
            .map_err(|e| ToolError::output("git clone", e))?;
        Ok(Box::new(MockTree {
            dir,
            remote: self.clone(),
            head: None,
        }))
    }
}

pub struct MockTree {
    dir: TempDir,
    remote: MockVersionStore,
    head: Option<String>,
}

impl MockTree {
    fn materialize(&self, files: &BTreeMap<String, Vec<u8>>) -> Result<(), ToolError> {
        let io = |e: std::io::Error| ToolError::output("git checkout", e);
        for entry in fs::read_dir(self.dir.path()).map_err(io)? {
            let path = entry.map_err(io)?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path).map_err(io)?;
            } else {
                fs::remove_file(&path).map_err(io)?;
            }
        }
        for (path, content) in files {
            let target = self.dir.path().join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(io)?;
            }
            fs::write(target, content).map_err(io)?;
        }
        Ok(())
    }

    fn working_files(&self) -> BTreeMap<String, Vec<u8>> {
        let mut files = BTreeMap::new();
        collect_files(self.dir.path(), self.dir.path(), &mut files);
        files
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path: PathBuf = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else if let (Ok(relative), Ok(content)) = (path.strip_prefix(root), fs::read(&path)) {
            let key = relative.to_string_lossy().replace('\\', "/");
            out.insert(key, content);
        }
    }
}

impl WorkingTree for MockTree {
    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn checkout(&mut self, branch: &str) -> Result<(), ToolError> {
        let (head, files) = {
            let state = self.remote.state.lock().unwrap();
            let head = state.branches.get(branch).cloned();
            let files = state.files_at(head.as_ref());
            (head, files)
        };
        self.materialize(&files)?;
        self.head = head;
        Ok(())
    }

    fn checkout_revision(&mut self, revision: &str) -> Result<(), ToolError> {
        let (head, files) = {
            let state = self.remote.state.lock().unwrap();
            let head = state
                .resolve(revision)
                .ok_or_else(|| ToolError::failed("git checkout", "exit status: 1", "unknown revision"))?;
            let files = state.files_at(Some(&head));
            (head, files)
        };
        self.materialize(&files)?;
        self.head = Some(head);
        Ok(())
    }

    fn resolve_revision(&self, revision: &str) -> Result<Option<String>, ToolError> {
        Ok(self.remote.state.lock().unwrap().resolve(revision))
    }

    fn diff_files(&self, commit: &str) -> Result<Vec<FileChange>, ToolError> {
        let state = self.remote.state.lock().unwrap();
        state
            .commits
            .get(commit)
            .map(|c| c.changes.clone())
            .ok_or_else(|| ToolError::failed("git diff-tree", "exit status: 128", "bad object"))
    }

    fn show(&self, commit: &str, path: &str) -> Result<Vec<u8>, ToolError> {
        let state = self.remote.state.lock().unwrap();
        state
            .commits
            .get(commit)
            .and_then(|c| c.files.get(path))
            .cloned()
            .ok_or_else(|| ToolError::failed("git show", "exit status: 128", "path not in commit"))
    }

    fn commit(&mut self, message: &str) -> Result<Option<String>, ToolError> {
        let current = self.working_files();
        let mut state = self.remote.state.lock().unwrap();
        let base = state.files_at(self.head.as_ref());
        if current == base {
            return Ok(None);
        }
        let mut changes = Vec::new();
        for (path, content) in &current {
            match base.get(path) {
                None => changes.push(FileChange::new(ChangeStatus::Added, path.clone())),
                Some(old) if old != content => {
                    changes.push(FileChange::new(ChangeStatus::Modified, path.clone()))
                }
                Some(_) => {}
            }
        }
        for path in base.keys().filter(|p| !current.contains_key(*p)) {
            changes.push(FileChange::new(ChangeStatus::Deleted, path.clone()));
        }
        let id = next_commit_id(&mut state);
        state.commits.insert(
            id.clone(),
            MockCommit {
                parent: self.head.clone(),
                message: message.to_string(),
                files: current,
                changes,
            },
        );
        self.head = Some(id.clone());
        Ok(Some(id))
    }

    fn push(&self, branch: &str) -> Result<(), ToolError> {
        if *self.remote.fail_push.lock().unwrap() {
            return Err(ToolError::failed("git push", "exit status: 1", "remote rejected"));
        }
        if let Some(head) = &self.head {
            let mut state = self.remote.state.lock().unwrap();
            state.branches.insert(branch.to_string(), head.clone());
        }
        Ok(())
    }

    fn tag(&self, name: &str) -> Result<(), ToolError> {
        let mut state = self.remote.state.lock().unwrap();
        if state.tags.contains_key(name) {
            return Err(ToolError::failed("git push", "exit status: 1", "tag already exists"));
        }
        let head = self
            .head
            .clone()
            .ok_or_else(|| ToolError::failed("git tag", "exit status: 128", "no commit to tag"))?;
        state.tags.insert(name.to_string(), head);
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<bool, ToolError> {
        Ok(self.remote.state.lock().unwrap().tags.remove(name).is_some())
    }

    fn list_tags(&self) -> Result<Vec<String>, ToolError> {
        Ok(self.remote.tags())
    }
}

#[derive(Default)]
struct ToolchainState {
    components: BTreeMap<(ComponentKind, String), ComponentBody>,
    export_failure: Option<String>,
    deploy_results: BTreeMap<String, Result<DeployOutcome, ToolError>>,
    rejected_aliases: BTreeSet<String>,
    export_calls: usize,
    authenticated: Vec<String>,
    deployed: Vec<(String, ComponentSelection, BTreeMap<String, Vec<u8>>)>,
}

/// Exporter, deployer and authenticator over a fixed set of components
///
/// Export writes one JSON file per component so the bundle is real.
#[derive(Default)]
pub struct MockToolchain {
    state: Mutex<ToolchainState>,
}

impl MockToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(&self, kind: ComponentKind, name: &str, body: ComponentBody) {
        self.state
            .lock()
            .unwrap()
            .components
            .insert((kind, name.to_string()), body);
    }

    pub fn fail_export(&self, diagnostics: &str) {
        self.state.lock().unwrap().export_failure = Some(diagnostics.to_string());
    }

    pub fn set_deploy_result(&self, alias: &str, result: Result<DeployOutcome, ToolError>) {
        self.state
            .lock()
            .unwrap()
            .deploy_results
            .insert(alias.to_string(), result);
    }

    pub fn reject_auth(&self, alias: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected_aliases
            .insert(alias.to_string());
    }

    pub fn export_calls(&self) -> usize {
        self.state.lock().unwrap().export_calls
    }

    pub fn authenticated(&self) -> Vec<String> {
        self.state.lock().unwrap().authenticated.clone()
    }

    /// Target alias, selection and bundle files of every deploy call
    pub fn deployed(&self) -> Vec<(String, ComponentSelection, BTreeMap<String, Vec<u8>>)> {
        self.state.lock().unwrap().deployed.clone()
    }
}

/// Bundle path of a component's primary file
pub fn bundle_file(kind: &ComponentKind, name: &str) -> String {
    match kind.datapack_type() {
        Some(dir) => format!("{dir}/{name}/{name}_DataPack.json"),
        None => format!("Metadata/{}/{name}.json", kind.label()),
    }
}

impl Exporter for MockToolchain {
    fn list_available(&self, _alias: &str) -> Result<ComponentSelection, ToolError> {
        let state = self.state.lock().unwrap();
        let mut selection = ComponentSelection::new();
        for (kind, name) in state.components.keys() {
            selection.insert(kind.clone(), name.clone());
        }
        Ok(selection)
    }

    fn export(
        &self,
        _alias: &str,
        selection: &ComponentSelection,
        dest: &Path,
    ) -> Result<ExportReport, ToolError> {
        let mut state = self.state.lock().unwrap();
        state.export_calls += 1;
        if let Some(diagnostics) = &state.export_failure {
            return Err(ToolError::failed("vlocity", "exit status: 1", diagnostics.clone()));
        }
        let mut report = ExportReport::default();
        for wanted in selection.components() {
            let key = (wanted.kind.clone(), wanted.name.clone());
            let Some(body) = state.components.get(&key) else {
                report.warnings.push(format!("{wanted} was not exported"));
                continue;
            };
            let path = dest.join(bundle_file(&wanted.kind, &wanted.name));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| ToolError::output("vlocity", e))?;
            }
            let content = serde_json::to_vec_pretty(&body.document)
                .map_err(|e| ToolError::output("vlocity", e))?;
            fs::write(&path, content).map_err(|e| ToolError::output("vlocity", e))?;
            report.components.push(MaterializedComponent {
                reference: wanted,
                body: body.clone(),
            });
        }
        Ok(report)
    }
}

impl Deployer for MockToolchain {
    fn deploy(
        &self,
        alias: &str,
        bundle_dir: &Path,
        selection: &ComponentSelection,
    ) -> Result<DeployOutcome, ToolError> {
        let mut files = BTreeMap::new();
        collect_files(bundle_dir, bundle_dir, &mut files);
        let mut state = self.state.lock().unwrap();
        state
            .deployed
            .push((alias.to_string(), selection.clone(), files));
        state
            .deploy_results
            .get(alias)
            .cloned()
            .unwrap_or_else(|| Ok(DeployOutcome::success(format!("deployed to {alias}"))))
    }
}

impl Authenticator for MockToolchain {
    fn authenticate(&self, alias: &str) -> Result<(), ToolError> {
        let mut state = self.state.lock().unwrap();
        if state.rejected_aliases.contains(alias) {
            return Err(ToolError::Auth {
                alias: alias.to_string(),
                message: "expired refresh token".to_string(),
            });
        }
        state.authenticated.push(alias.to_string());
        Ok(())
    }
}

/// Context wired with the mocks above, real JSON repositories and file locks
pub struct Harness {
    pub state_dir: TempDir,
    pub remote: MockVersionStore,
    pub toolchain: Arc<MockToolchain>,
    pub clock: Arc<StepClock>,
    pub context: ReleaseContext,
}

impl Harness {
    pub fn new() -> Self {
        let state_dir = tempfile::tempdir().unwrap();
        let layout = StateLayout::new(state_dir.path());
        let remote = MockVersionStore::new();
        let toolchain = Arc::new(MockToolchain::new());
        let clock = Arc::new(StepClock::default());
        let context = ReleaseContext {
            components: Arc::new(JsonComponentRepository::new(layout.clone())),
            releases: Arc::new(JsonReleaseRepository::new(layout.clone())),
            rollbacks: Arc::new(JsonRollbackRepository::new(layout.clone())),
            exporter: toolchain.clone(),
            deployer: toolchain.clone(),
            authenticator: toolchain.clone(),
            version_store: Arc::new(remote.clone()),
            locks: Arc::new(FileEnvironmentLocks::new(
                layout,
                std::time::Duration::from_secs(1),
            )),
            clock: clock.clone(),
            bundle_dir: "vlocity".to_string(),
            releases_dir: "releases".to_string(),
        };
        Self {
            state_dir,
            remote,
            toolchain,
            clock,
            context,
        }
    }
}
