//! Local git repositories for adapter and CLI tests.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "user.name=Seeder", "-c", "user.email=seeder@example.com"])
        .args(args)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed:\n{}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A bare remote and a working clone used to seed it
pub struct BareRepo {
    pub remote: TempDir,
    work: TempDir,
}

impl BareRepo {
    pub fn new() -> Self {
        let remote = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        git(remote.path(), &["init", "--quiet", "--bare"]);
        git(work.path(), &["init", "--quiet"]);
        git(work.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
        let url = remote.path().display().to_string();
        git(work.path(), &["remote", "add", "origin", &url]);
        Self { remote, work }
    }

    pub fn url(&self) -> String {
        self.remote.path().display().to_string()
    }

    /// Write `files`, commit on main and push; returns the commit id
    pub fn commit(&self, files: &[(&str, &str)], message: &str) -> String {
        for (path, content) in files {
            let full = self.work.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        git(self.work.path(), &["add", "--all"]);
        git(self.work.path(), &["commit", "--quiet", "-m", message]);
        git(self.work.path(), &["push", "--quiet", "origin", "HEAD:refs/heads/main"]);
        git(self.work.path(), &["rev-parse", "HEAD"])
    }

    /// Delete `paths`, commit on main and push
    pub fn delete(&self, paths: &[&str], message: &str) -> String {
        for path in paths {
            fs::remove_file(self.work.path().join(path)).unwrap();
        }
        self.commit(&[], message)
    }

    /// Content of `path` on `branch` in the remote, if present
    pub fn remote_file(&self, branch: &str, path: &str) -> Option<String> {
        let object = format!("{branch}:{path}");
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(self.remote.path())
            .args(["show", &object])
            .output()
            .unwrap();
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).to_string())
    }

    pub fn head(&self, branch: &str) -> Option<String> {
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(self.remote.path())
            .args(["rev-parse", "--verify", "--quiet", branch])
            .output()
            .unwrap();
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Last commit subject on `branch`
    pub fn subject(&self, branch: &str) -> String {
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(self.remote.path())
            .args(["log", "-1", "--format=%s", branch])
            .output()
            .unwrap();
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}
