//! # Execution Guard
//!
//! Single-instance enforcement through an exclusive, non-blocking advisory
//! `flock(2)` on the running executable itself. Every process started from the
//! same binary contends on the same inode, so no separate lock file is needed.
//!
//! The lock belongs to the open file description held inside [`GuardHandle`].
//! Dropping the handle closes the descriptor and releases the lock, so the
//! handle must be kept alive for as long as the guard is meant to be held. The
//! orchestrator keeps it until the process exits; the kernel releases it on
//! exit however the process terminates.
//!
//! The lock is advisory: only processes that go through [`ExecutionGuard`]
//! respect it.

use crate::error::{PathlogError, Result};
use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct ExecutionGuard;

impl ExecutionGuard {
    /// Lock the canonical path of the current executable.
    pub fn acquire() -> Result<GuardHandle> {
        let exe = std::env::current_exe()?;
        Self::acquire_at(exe)
    }

    /// Lock an explicit resource. Never blocks and never retries.
    pub fn acquire_at(resource: impl AsRef<Path>) -> Result<GuardHandle> {
        let resource = resource.as_ref().canonicalize()?;
        let file = File::open(&resource)?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(lock) => {
                tracing::info!(resource = %resource.display(), "execution guard acquired");
                Ok(GuardHandle {
                    resource,
                    _lock: lock,
                })
            }
            Err((_, Errno::EWOULDBLOCK)) => Err(PathlogError::AlreadyRunning(resource)),
            Err((_, errno)) => Err(PathlogError::Io(errno.into())),
        }
    }
}

/// A held execution guard. There is no unlock method; the lock lives exactly
/// as long as this value.
pub struct GuardHandle {
    resource: PathBuf,
    _lock: Flock<File>,
}

impl fmt::Debug for GuardHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardHandle")
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

impl GuardHandle {
    pub fn resource(&self) -> &Path {
        &self.resource
    }
}
