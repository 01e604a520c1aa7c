//! Isolated environment for running the omnirelease binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Result of running an omnirelease command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap_or_else(|e| {
            panic!(
                "stdout is not JSON ({e}):\n{}\nstderr:\n{}",
                self.stdout, self.stderr
            )
        })
    }
}

/// Working directory, state directory and home, all temporary
pub struct TestEnv {
    pub work: TempDir,
    pub state: TempDir,
    pub home: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            work: TempDir::new().unwrap(),
            state: TempDir::new().unwrap(),
            home: TempDir::new().unwrap(),
        }
    }

    /// Env with `./omnirelease.toml` pointing at `repository_url`
    pub fn with_repository(repository_url: &str) -> Self {
        let env = Self::new();
        env.write_config(&format!(
            "state_dir = {:?}\nactor = \"tester\"\n\n[repository]\nurl = {:?}\n\n[tools]\ntimeout_secs = 60\nlock_timeout_secs = 5\n",
            env.state.path().display().to_string(),
            repository_url,
        ));
        env
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.work.path().join("omnirelease.toml"), content).unwrap();
    }

    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.work.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn state_path(&self) -> &Path {
        self.state.path()
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        let output = Command::new(env!("CARGO_BIN_EXE_omnirelease"))
            .current_dir(self.work.path())
            .args(args)
            .env_remove("OMNIRELEASE_STATE_DIR")
            .env_remove("OMNIRELEASE_REPOSITORY_URL")
            .env_remove("OMNIRELEASE_TIMEOUT_SECS")
            .env_remove("RUST_LOG")
            .env("OMNIRELEASE_TEST_HOME", self.home.path())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join(".config"))
            .env("NO_COLOR", "1")
            .output()
            .expect("failed to run omnirelease");

        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}
