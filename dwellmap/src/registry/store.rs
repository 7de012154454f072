//! On-disk location of a subject's registry.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::codec::{self, DecodedRegistry};
use super::error::{RegistryError, RegistryResult};

/// Suffix of the registry file after the subject id.
pub const REGISTRY_SUFFIX: &str = "_REGISTRY.txt";

/// Extension appended to the registry path for the pre-write backup.
pub const BACKUP_EXTENSION: &str = "bak";

/// Reads and rewrites `{dir}/{subject}_REGISTRY.txt`.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    /// Store for a subject's registry inside `dir`.
    pub fn for_subject(dir: &Path, subject: &str) -> Self {
        Self {
            path: dir.join(format!("{}{}", subject, REGISTRY_SUFFIX)),
        }
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `{path}.bak`
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".");
        name.push(BACKUP_EXTENSION);
        PathBuf::from(name)
    }

    /// Load the registry, or `None` if the subject has none yet.
    pub fn load(&self) -> RegistryResult<Option<DecodedRegistry>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No existing registry");
                return Ok(None);
            }
            Err(source) => {
                return Err(RegistryError::ReadFailed {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let decoded = codec::decode(&text)?;
        debug!(
            path = %self.path.display(),
            records = decoded.records.len(),
            last = %decoded.summary.last_stamp,
            "Loaded registry"
        );
        Ok(Some(decoded))
    }

    /// Replace the registry with `contents`, first copying any existing file
    /// to the backup path.
    pub fn persist(&self, contents: &str) -> RegistryResult<()> {
        if self.path.exists() {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup).map_err(|source| RegistryError::BackupFailed {
                path: backup.clone(),
                source,
            })?;
            debug!(backup = %backup.display(), "Backed up registry");
        } else if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| RegistryError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;
        }

        fs::write(&self.path, contents).map_err(|source| RegistryError::WriteFailed {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), bytes = contents.len(), "Registry written");
        Ok(())
    }
}
