//! Save targets for downloaded audio
//!
//! A download ends by handing its blob and suggested filename to a [`SaveHandler`].
//! [`DirectorySaver`] writes into a directory with collision handling; [`MemorySaver`]
//! keeps the files in memory for embedding hosts and tests.

use crate::config::{FileCollisionAction, SaveConfig};
use crate::error::{Result, SaveError};
use crate::types::SavedFile;
use crate::utils::{MAX_RENAME_ATTEMPTS, numbered_path};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::io::AsyncWriteExt;

/// Destination for finished downloads
#[async_trait]
pub trait SaveHandler: Send + Sync {
    /// Save `data` under the suggested `filename`
    ///
    /// The returned [`SavedFile`] reports where the data ended up, which may differ from
    /// the suggestion (e.g. after collision renaming).
    async fn save(&self, filename: &str, data: &[u8]) -> Result<SavedFile>;
}

/// Writes files into a directory
#[derive(Clone, Debug)]
pub struct DirectorySaver {
    dir: PathBuf,
    collision: FileCollisionAction,
}

impl DirectorySaver {
    /// Create a saver writing into `dir`
    pub fn new(dir: impl Into<PathBuf>, collision: FileCollisionAction) -> Self {
        Self {
            dir: dir.into(),
            collision,
        }
    }

    /// Create a saver from the save settings
    pub fn from_config(config: &SaveConfig) -> Self {
        Self::new(config.save_dir.clone(), config.file_collision)
    }

    /// Target directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SaveHandler for DirectorySaver {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<SavedFile> {
        // Only a bare file name may be joined onto the directory
        let candidate = Path::new(filename);
        let is_bare_name = candidate.file_name().is_some_and(|name| name == filename);
        if !is_bare_name {
            return Err(SaveError::InvalidPath {
                path: candidate.to_path_buf(),
                reason: "suggested filename must not contain path components".to_string(),
            }
            .into());
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let target = self.dir.join(filename);
        let path = match self.collision {
            FileCollisionAction::Overwrite => {
                tokio::fs::write(&target, data).await?;
                target
            }
            FileCollisionAction::Skip => {
                if !write_new(&target, data).await? {
                    return Err(SaveError::FileCollision {
                        path: target,
                        reason: "File already exists and collision action is Skip".to_string(),
                    }
                    .into());
                }
                target
            }
            FileCollisionAction::Rename => write_renamed(&target, data).await?,
        };

        tracing::info!(path = %path.display(), bytes = data.len(), "saved file");
        Ok(SavedFile {
            location: path,
            bytes: data.len() as u64,
        })
    }
}

/// Write `data` to the first free numbered variant of `target`
///
/// Each candidate is claimed with an exclusive create, so concurrent saves of the same
/// name never share a location.
async fn write_renamed(target: &Path, data: &[u8]) -> Result<PathBuf> {
    for attempt in 0..=MAX_RENAME_ATTEMPTS {
        let candidate = numbered_path(target, attempt)?;
        if write_new(&candidate, data).await? {
            return Ok(candidate);
        }
    }

    Err(SaveError::FileCollision {
        path: target.to_path_buf(),
        reason: format!(
            "Could not find unique filename after {} attempts",
            MAX_RENAME_ATTEMPTS
        ),
    }
    .into())
}

/// Create `path` exclusively and write `data` into it
///
/// Returns `false` without touching anything if `path` already exists.
async fn write_new(path: &Path, data: &[u8]) -> Result<bool> {
    let mut file = match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    file.write_all(data).await?;
    file.flush().await?;
    Ok(true)
}

/// Keeps saved files in memory, in save order
///
/// Repeated filenames are kept as separate entries.
#[derive(Clone, Debug, Default)]
pub struct MemorySaver {
    files: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MemorySaver {
    /// Create an empty saver
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every saved file as `(filename, data)`
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Names of the saved files
    pub fn filenames(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl SaveHandler for MemorySaver {
    async fn save(&self, filename: &str, data: &[u8]) -> Result<SavedFile> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((filename.to_string(), data.to_vec()));

        Ok(SavedFile {
            location: PathBuf::from(filename),
            bytes: data.len() as u64,
        })
    }
}
