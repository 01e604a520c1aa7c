//! Per-environment file locks
//!
//! An exclusive `fs2` lock on `<state>/locks/<alias>.lock` serializes release
//! creation, rollback and redeploy for one environment across processes.

use std::fs::{self, File, OpenOptions};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::domain::ports::{EnvironmentGuard, EnvironmentLocks, StoreError};
use crate::infrastructure::repositories::StateLayout;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub struct FileEnvironmentLocks {
    layout: StateLayout,
    timeout: Duration,
}

/// Unlocks when dropped
struct HeldLock(File);

impl Drop for HeldLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

impl FileEnvironmentLocks {
    pub fn new(layout: StateLayout, timeout: Duration) -> Self {
        Self { layout, timeout }
    }
}

impl EnvironmentLocks for FileEnvironmentLocks {
    fn acquire(&self, alias: &str) -> Result<EnvironmentGuard, StoreError> {
        let path = self.layout.lock_file(alias)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::write(parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| StoreError::write(&path, e))?;

        let started = Instant::now();
        let mut announced = false;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    tracing::debug!(alias, "environment lock acquired");
                    return Ok(EnvironmentGuard::new(alias, HeldLock(file)));
                }
                Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                    if started.elapsed() >= self.timeout {
                        return Err(StoreError::LockTimeout {
                            alias: alias.to_string(),
                            waited_secs: self.timeout.as_secs(),
                        });
                    }
                    if !announced {
                        tracing::info!(alias, "waiting for another operation on this environment");
                        announced = true;
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(StoreError::write(&path, e)),
            }
        }
    }
}
