use anyhow::{Context, Result};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::SyncError;

/// Exclusive claim on a profile's sheet for the length of one run.
///
/// The lock is a file holding the owner's pid. A file left behind by a process
/// that no longer exists is taken over. Dropping the guard removes the file.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        for _ in 0..2 {
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    writeln!(file, "{}", std::process::id())?;
                    tracing::debug!(lock = %path.display(), "acquired run lock");
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if let Some(pid) = read_holder(&path).filter(|pid| is_process_alive(*pid)) {
                        return Err(SyncError::RunInProgress { pid, path }.into());
                    }
                    tracing::warn!(lock = %path.display(), "removing stale run lock");
                    match std::fs::remove_file(&path) {
                        Ok(()) => {}
                        Err(e) if e.kind() == ErrorKind::NotFound => {}
                        Err(e) => {
                            return Err(e).with_context(|| {
                                format!("Failed to remove stale lock {}", path.display())
                            })
                        }
                    }
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to create lock {}", path.display()))
                }
            }
        }

        // Another process re-created the file between our removal and retry.
        let pid = read_holder(&path).unwrap_or_default();
        Err(SyncError::RunInProgress { pid, path }.into())
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn read_holder(path: &Path) -> Option<u32> {
    std::fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Signal 0 checks for the process without delivering anything. `EPERM` means the process
/// exists but belongs to another user.
fn is_process_alive(pid: u32) -> bool {
    if pid == 0 || pid > i32::MAX as u32 {
        return false;
    }
    if unsafe { libc::kill(pid as i32, 0) } == 0 {
        return true;
    }
    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}
