//! Per-mirror advisory locks
//!
//! An exclusive `flock` on `<mirrors_root>/.locks/<local_name>.lock` is held
//! for the whole pipeline run. Dropping the guard releases it.

use crate::config::LockPolicy;
use crate::error::{Error, Result};
use crate::repo::RepositoryLocation;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Exclusive hold on one mirror
#[derive(Debug)]
pub struct MirrorLock {
    file: File,
    path: PathBuf,
}

impl MirrorLock {
    /// Take the lock for `location` according to `policy`
    ///
    /// Fails with [`Error::Busy`] if another run holds it (immediately under
    /// [`LockPolicy::FailFast`], after `wait` under [`LockPolicy::Wait`]).
    /// Any other locking failure is returned as [`Error::Io`] right away.
    pub async fn acquire(
        location: &RepositoryLocation,
        policy: LockPolicy,
        wait: Duration,
    ) -> Result<Self> {
        let path = location.lock_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .truncate(false)
                .open(&path)?;

            match file.try_lock_exclusive() {
                Ok(()) => {
                    debug!(lock = %path.display(), "mirror lock acquired");
                    return Ok(Self { file, path });
                }
                Err(e) if !is_contended(&e) => return Err(e.into()),
                Err(_) => {}
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if policy == LockPolicy::FailFast || remaining.is_zero() {
                warn!(lock = %path.display(), ?policy, "mirror is busy");
                return Err(Error::Busy(location.local_name().to_string()));
            }
            tokio::time::sleep(POLL_INTERVAL.min(remaining)).await;
        }
    }

    /// Lock file path
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

/// Whether a lock attempt failed only because another holder has it
fn is_contended(err: &io::Error) -> bool {
    err.kind() == fs2::lock_contended_error().kind()
}

impl Drop for MirrorLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(lock = %self.path.display(), "failed to release mirror lock: {e}");
        }
    }
}
