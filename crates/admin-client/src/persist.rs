//! JSON snapshots of client state under a state directory.
//!
//! Files are written to a uniquely named staging file and renamed into
//! place, so a crash mid-write leaves the previous snapshot intact.

use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::ClientError;

/// File name of the persisted auth session.
pub const AUTH_STORAGE_FILE: &str = "auth-storage.json";
/// File name of the persisted user list.
pub const USERS_STORAGE_FILE: &str = "users-storage.json";

/// A typed JSON document at `<dir>/<file_name>`.
///
/// # Examples
/// ```
/// use admin_client::persist::PersistedState;
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let state: PersistedState<Vec<String>> = PersistedState::new(dir.path(), "names.json");
/// assert_eq!(state.load().expect("readable"), None);
/// state.save(&vec!["ada".to_owned()]).expect("writable");
/// assert_eq!(state.load().expect("readable"), Some(vec!["ada".to_owned()]));
/// ```
#[derive(Debug)]
pub struct PersistedState<T> {
    dir: PathBuf,
    file_name: String,
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for PersistedState<T> {
    fn clone(&self) -> Self {
        Self {
            dir: self.dir.clone(),
            file_name: self.file_name.clone(),
            marker: PhantomData,
        }
    }
}

impl<T> PersistedState<T> {
    /// Snapshot stored as `file_name` inside `dir`.
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
            marker: PhantomData,
        }
    }

    /// Full path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    fn error(&self, error: impl std::fmt::Display) -> ClientError {
        ClientError::persistence(&self.path(), error)
    }

    fn open_dir(&self) -> io::Result<Dir> {
        Dir::open_ambient_dir(&self.dir, ambient_authority())
    }

    /// Remove the snapshot; a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Persistence`] when the file exists but cannot be
    /// removed.
    pub fn clear(&self) -> Result<(), ClientError> {
        let dir = match self.open_dir() {
            Ok(dir) => dir,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(self.error(error)),
        };
        match dir.remove_file(Path::new(&self.file_name)) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(self.error(error)),
        }
    }
}

impl<T: DeserializeOwned> PersistedState<T> {
    /// Read the snapshot; `None` when it has never been written.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Persistence`] when the file is unreadable or
    /// not valid JSON for `T`.
    pub fn load(&self) -> Result<Option<T>, ClientError> {
        let dir = match self.open_dir() {
            Ok(dir) => dir,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.error(error)),
        };
        let raw = match dir.read_to_string(Path::new(&self.file_name)) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(self.error(error)),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|error| self.error(error))
    }
}

impl<T: Serialize> PersistedState<T> {
    /// Replace the snapshot with `value`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Persistence`] when the directory or file cannot
    /// be written.
    pub fn save(&self, value: &T) -> Result<(), ClientError> {
        let encoded = serde_json::to_vec_pretty(value).map_err(|error| self.error(error))?;
        Dir::create_ambient_dir_all(&self.dir, ambient_authority())
            .map_err(|error| self.error(error))?;
        let dir = self.open_dir().map_err(|error| self.error(error))?;

        let staging = format!(".{}.{}.tmp", self.file_name, Uuid::new_v4().simple());
        dir.write(Path::new(&staging), &encoded)
            .map_err(|error| self.error(error))?;
        dir.rename(Path::new(&staging), &dir, Path::new(&self.file_name))
            .map_err(|error| {
                if let Err(cleanup) = dir.remove_file(Path::new(&staging)) {
                    tracing::debug!(%cleanup, "failed to remove staging snapshot");
                }
                self.error(error)
            })
    }
}
