//! Durable JSON account registry.
//!
//! The registry is read once at the start of a run and rewritten once at the
//! end. Writes go to a scratch file that is renamed over the registry, and a
//! backup snapshot taken before the first write lets a failed run put the
//! last known-good content back.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use blitz_config::PanelConfig;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, error, info, warn};

use crate::account::Accounts;
use crate::error::TrafficError;

/// Indentation used by every panel component that writes the registry.
const INDENT: &[u8] = b"    ";

/// File-backed account registry.
#[derive(Debug, Clone)]
pub struct UserRegistry {
    path: PathBuf,
    backup_path: PathBuf,
    tmp_path: PathBuf,
    save_attempts: u32,
    retry_delay: Duration,
}

impl UserRegistry {
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            path: config.paths.registry.clone(),
            backup_path: config.paths.backup_path(),
            tmp_path: config.paths.tmp_path(),
            save_attempts: config.enforcement.save_attempts.max(1),
            retry_delay: config.enforcement.save_retry_delay(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Read and parse the registry.
    pub async fn load(&self) -> Result<Accounts, TrafficError> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|source| TrafficError::Unreadable {
                path: self.path.display().to_string(),
                source,
            })?;
        let accounts: Accounts =
            serde_json::from_slice(&data).map_err(|source| TrafficError::CorruptRegistry {
                path: self.path.display().to_string(),
                source,
            })?;
        debug!(path = %self.path.display(), users = accounts.len(), "registry loaded");
        Ok(accounts)
    }

    /// Like [`load`](Self::load), but a registry that does not exist yet is empty.
    pub async fn load_or_empty(&self) -> Result<Accounts, TrafficError> {
        match self.load().await {
            Err(TrafficError::Unreadable { source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                info!(path = %self.path.display(), "registry not found, starting empty");
                Ok(Accounts::new())
            }
            other => other,
        }
    }

    /// Whether the registry file exists.
    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Snapshot the registry to the backup path.
    pub async fn backup(&self) -> Result<(), TrafficError> {
        tokio::fs::copy(&self.path, &self.backup_path)
            .await
            .map_err(|source| TrafficError::Backup {
                path: self.backup_path.display().to_string(),
                source,
            })?;
        debug!(backup = %self.backup_path.display(), "registry backed up");
        Ok(())
    }

    /// Copy the backup snapshot back over the registry.
    pub async fn restore(&self) -> Result<(), TrafficError> {
        tokio::fs::copy(&self.backup_path, &self.path)
            .await
            .map_err(|source| TrafficError::Restore {
                path: self.backup_path.display().to_string(),
                source,
            })?;
        info!(path = %self.path.display(), "registry restored from backup");
        Ok(())
    }

    /// Restore after a failed run, logging instead of returning a restore failure
    /// so the caller can surface the original error.
    pub async fn rollback(&self) {
        if let Err(e) = self.restore().await {
            error!(error = %e, "registry restore failed, operator attention required");
        }
    }

    /// Serialize and write the registry, retrying transient I/O failures.
    pub async fn save(&self, accounts: &Accounts) -> Result<(), TrafficError> {
        let data = to_indented_json(accounts).map_err(TrafficError::Serialize)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.write_atomic(&data).await {
                Ok(()) => {
                    debug!(path = %self.path.display(), users = accounts.len(), attempt, "registry saved");
                    return Ok(());
                }
                Err(e) if attempt < self.save_attempts => {
                    warn!(attempt, error = %e, "failed to save registry, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(source) => {
                    error!(attempt, error = %source, "failed to save registry, giving up");
                    return Err(TrafficError::Write {
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }

    async fn write_atomic(&self, data: &[u8]) -> io::Result<()> {
        tokio::fs::write(&self.tmp_path, data).await?;
        let replaced = async {
            self.copy_metadata_to_tmp().await?;
            tokio::fs::rename(&self.tmp_path, &self.path).await
        }
        .await;
        if let Err(e) = replaced {
            let _ = tokio::fs::remove_file(&self.tmp_path).await;
            return Err(e);
        }
        Ok(())
    }

    /// Give the scratch file the registry's mode (and owner, where allowed)
    /// so the rename doesn't loosen access to stored passwords.
    async fn copy_metadata_to_tmp(&self) -> io::Result<()> {
        let meta = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        tokio::fs::set_permissions(&self.tmp_path, meta.permissions()).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            // Only root can hand a file to another user.
            let owner = std::os::unix::fs::chown(&self.tmp_path, Some(meta.uid()), Some(meta.gid()));
            if let Err(e) = owner {
                debug!(error = %e, "could not keep registry owner");
            }
        }
        Ok(())
    }
}

fn to_indented_json(accounts: &Accounts) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::with_capacity(accounts.len() * 256);
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    accounts.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}
