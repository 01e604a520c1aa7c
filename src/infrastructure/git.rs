//! Git-backed versioned object store
//!
//! Each `clone_tree` produces a private clone in a temporary directory, so
//! concurrent operations never share a working directory. Git runs as an
//! external process under the shared `ProcessRunner` deadline.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use crate::domain::ports::{ChangeStatus, FileChange, ToolError, VersionStore, WorkingTree};
use crate::infrastructure::process::{CommandOutput, ProcessRunner};

/// Commit identity used for release, rollback and redeploy commits
#[derive(Debug, Clone)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

pub struct GitStore {
    url: String,
    identity: GitIdentity,
    runner: ProcessRunner,
}

impl GitStore {
    pub fn new(url: impl Into<String>, identity: GitIdentity, runner: ProcessRunner) -> Self {
        Self {
            url: url.into(),
            identity,
            runner,
        }
    }
}

impl VersionStore for GitStore {
    fn clone_tree(&self) -> Result<Box<dyn WorkingTree>, ToolError> {
        let dir = tempfile::Builder::new()
            .prefix("omnirelease-")
            .tempdir()
            .map_err(|e| ToolError::Launch {
                tool: "git clone".to_string(),
                message: format!("cannot create checkout directory: {e}"),
            })?;

        tracing::info!(repository = %self.url, "cloning release repository");
        let mut command = Command::new("git");
        command
            .env("GIT_TERMINAL_PROMPT", "0")
            .args(["clone", "--quiet", "--no-checkout", &self.url])
            .arg(dir.path());
        self.runner.run_checked("git clone", &mut command)?;

        Ok(Box::new(GitTree {
            dir,
            identity: self.identity.clone(),
            runner: self.runner.clone(),
        }))
    }
}

/// An ephemeral clone; the directory is removed when dropped
pub struct GitTree {
    dir: TempDir,
    identity: GitIdentity,
    runner: ProcessRunner,
}

impl GitTree {
    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new("git");
        command
            .env("GIT_TERMINAL_PROMPT", "0")
            .arg("-C")
            .arg(self.dir.path())
            .arg("-c")
            .arg(format!("user.name={}", self.identity.name))
            .arg("-c")
            .arg(format!("user.email={}", self.identity.email))
            .args(args);
        command
    }

    fn label(args: &[&str]) -> String {
        match args.first() {
            Some(sub) => format!("git {sub}"),
            None => "git".to_string(),
        }
    }

    /// Run and require success
    fn git(&self, args: &[&str]) -> Result<CommandOutput, ToolError> {
        self.runner
            .run_checked(&Self::label(args), &mut self.command(args))
    }

    /// Run and hand back the outcome whatever the exit code
    fn git_probe(&self, args: &[&str]) -> Result<CommandOutput, ToolError> {
        self.runner.run(&Self::label(args), &mut self.command(args))
    }

    fn validate_branch(&self, branch: &str) -> Result<(), ToolError> {
        let output = self.git_probe(&["check-ref-format", "--branch", branch])?;
        if output.success() {
            Ok(())
        } else {
            Err(ToolError::failed(
                "git check-ref-format",
                output.status,
                format!("'{branch}' is not a valid branch name"),
            ))
        }
    }
}

impl WorkingTree for GitTree {
    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn checkout(&mut self, branch: &str) -> Result<(), ToolError> {
        self.validate_branch(branch)?;
        let remote_ref = format!("refs/remotes/origin/{branch}");
        let exists = self
            .git_probe(&["rev-parse", "--verify", "--quiet", &remote_ref])?
            .success();

        if exists {
            self.git(&["checkout", "--quiet", "-B", branch, &remote_ref])?;
        } else {
            tracing::info!(branch, "branch does not exist yet, starting an empty one");
            let head = format!("refs/heads/{branch}");
            self.git(&["symbolic-ref", "HEAD", &head])?;
            self.git(&["rm", "-r", "-f", "--quiet", "--ignore-unmatch", "--", "."])?;
        }
        Ok(())
    }

    fn checkout_revision(&mut self, revision: &str) -> Result<(), ToolError> {
        self.git(&["checkout", "--quiet", "--detach", revision])?;
        Ok(())
    }

    fn resolve_revision(&self, revision: &str) -> Result<Option<String>, ToolError> {
        let spec = format!("{revision}^{{commit}}");
        let output = self.git_probe(&["rev-parse", "--verify", "--quiet", &spec])?;
        if !output.success() {
            return Ok(None);
        }
        let id = output.stdout_text().trim().to_string();
        Ok((!id.is_empty()).then_some(id))
    }

    fn diff_files(&self, commit: &str) -> Result<Vec<FileChange>, ToolError> {
        let output = self.git(&[
            "diff-tree",
            "--no-commit-id",
            "--name-status",
            "-r",
            "--root",
            "-M",
            "-z",
            commit,
        ])?;
        Ok(parse_name_status(&output.stdout_text()))
    }

    fn show(&self, commit: &str, path: &str) -> Result<Vec<u8>, ToolError> {
        let object = format!("{commit}:{path}");
        Ok(self.git(&["show", &object])?.stdout)
    }

    fn commit(&mut self, message: &str) -> Result<Option<String>, ToolError> {
        self.git(&["add", "--all"])?;
        let staged = self.git_probe(&["diff", "--cached", "--quiet"])?;
        if staged.success() {
            tracing::debug!("nothing to commit");
            return Ok(None);
        }
        self.git(&["commit", "--quiet", "--no-verify", "-m", message])?;
        self.resolve_revision("HEAD")
    }

    fn push(&self, branch: &str) -> Result<(), ToolError> {
        let refspec = format!("HEAD:refs/heads/{branch}");
        self.git(&["push", "--quiet", "origin", &refspec])?;
        Ok(())
    }

    fn tag(&self, name: &str) -> Result<(), ToolError> {
        let message = format!("Release {name}");
        self.git(&["tag", "-a", name, "-m", &message])?;
        let refspec = format!("refs/tags/{name}");
        self.git(&["push", "--quiet", "origin", &refspec])?;
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<bool, ToolError> {
        let local = self.git_probe(&["tag", "-d", name])?.success();

        let refspec = format!("refs/tags/{name}");
        let listed = self.git(&["ls-remote", "--tags", "origin", &refspec])?;
        let remote = !listed.stdout_text().trim().is_empty();
        if remote {
            let delete = format!(":{refspec}");
            self.git(&["push", "--quiet", "origin", &delete])?;
        }

        if !local && !remote {
            tracing::debug!(tag = name, "tag did not exist, nothing to delete");
        }
        Ok(local || remote)
    }

    fn list_tags(&self) -> Result<Vec<String>, ToolError> {
        let output = self.git(&["ls-remote", "--tags", "--refs", "origin"])?;
        Ok(parse_remote_tags(&output.stdout_text()))
    }
}

/// Parse `git diff-tree --name-status -z`; renames and copies report their destination
fn parse_name_status(raw: &str) -> Vec<FileChange> {
    let mut fields = raw.split('\0').filter(|f| !f.is_empty());
    let mut changes = Vec::new();
    while let Some(code) = fields.next() {
        let status = ChangeStatus::from_code(code);
        let path = match status {
            ChangeStatus::Renamed | ChangeStatus::Copied => {
                let _source = fields.next();
                fields.next()
            }
            _ => fields.next(),
        };
        if let Some(path) = path {
            changes.push(FileChange::new(status, path));
        }
    }
    changes
}

fn parse_remote_tags(raw: &str) -> Vec<String> {
    raw.lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|reference| reference.strip_prefix("refs/tags/"))
        .map(str::to_string)
        .collect()
}
