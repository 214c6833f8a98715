//! Host-wide mutual exclusion for registry-mutating runs.
//!
//! On Unix this is an advisory `flock(LOCK_EX | LOCK_NB)` on a fixed path.
//! Elsewhere the lock file is created exclusively and removed on release.
//! Either way acquisition never blocks: a held lock reports busy at once.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::TrafficError;

/// Lock token location shared by reconciliation, enforcement and reset.
#[derive(Debug, Clone)]
pub struct ProcessLock {
    path: PathBuf,
}

impl ProcessLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Try to take the lock without waiting.
    ///
    /// Returns `Ok(None)` when another holder has it. The lock is released
    /// when the returned guard is dropped.
    pub fn try_acquire(&self) -> Result<Option<LockGuard>, TrafficError> {
        match lock_file(&self.path) {
            Ok(file) => {
                debug!(path = %self.path.display(), "lock acquired");
                Ok(Some(LockGuard {
                    file,
                    path: self.path.clone(),
                }))
            }
            Err(e) if is_contended(&e) => Ok(None),
            Err(source) => Err(TrafficError::Lock {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }
}

/// Held lock; released on drop.
#[derive(Debug)]
pub struct LockGuard {
    #[cfg_attr(not(unix), allow(dead_code))]
    file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Release explicitly. Dropping the guard has the same effect.
    pub fn release(self) {}
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            // Closing the descriptor would release it too.
            unsafe {
                libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
            }
        }

        #[cfg(not(unix))]
        {
            let _ = std::fs::remove_file(&self.path);
        }

        debug!(path = %self.path.display(), "lock released");
    }
}

#[cfg(unix)]
fn lock_file(path: &Path) -> io::Result<File> {
    use std::os::unix::io::AsRawFd;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)?;

    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(file)
}

#[cfg(not(unix))]
fn lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

fn is_contended(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::AlreadyExists
    )
}
