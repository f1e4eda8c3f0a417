//! Per-domain volumes persisted as a JSON object, `{"example.com": 40}`.

use tab_volume_core::{CoreResult, PreferenceStore, Volume, VolumeError};

use std::{
    collections::BTreeMap,
    fs,
    io::{ErrorKind, Write},
    panic::Location,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// [`PreferenceStore`] backed by a JSON file.
///
/// The file is read once at open; every `set` rewrites it atomically.
pub struct FilePreferenceStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Volume>>,
}

impl FilePreferenceStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// A file that does not parse is moved aside to `<name>.corrupt` and the
    /// store starts empty.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Storage`] when the file exists but cannot be
    /// read.
    #[track_caller]
    #[instrument]
    pub fn open(path: &Path) -> CoreResult<Self> {
        let entries = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = ?path, error = %e, "Preference file is corrupt, starting empty");
                    Self::quarantine(path);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?path, "No preference file yet");
                BTreeMap::new()
            }
            Err(e) => {
                return Err(VolumeError::Storage {
                    reason: format!("Failed to read {}: {}", path.display(), e),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        info!(path = ?path, domains = entries.len(), "Preferences loaded");

        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    fn quarantine(path: &Path) {
        let aside = path.with_extension("json.corrupt");
        match fs::rename(path, &aside) {
            Ok(()) => info!(path = ?aside, "Corrupt preference file moved aside"),
            Err(e) => warn!(path = ?path, error = %e, "Failed to move corrupt preference file"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Volume>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[track_caller]
    fn write(&self, entries: &BTreeMap<String, Volume>) -> CoreResult<()> {
        let storage_error = |action: &str, e: std::io::Error| VolumeError::Storage {
            reason: format!("Failed to {} preferences: {}", action, e),
            location: ErrorLocation::from(Location::caller()),
        };

        let contents = serde_json::to_vec_pretty(entries).map_err(|e| VolumeError::Storage {
            reason: format!("Failed to serialize preferences: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut temp_file =
            fs::File::create(&temp_path).map_err(|e| storage_error("create temp file for", e))?;
        temp_file
            .write_all(&contents)
            .map_err(|e| storage_error("write", e))?;
        temp_file.sync_all().map_err(|e| storage_error("sync", e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| storage_error("replace", e))?;

        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get(&self, domain: &str) -> CoreResult<Option<Volume>> {
        Ok(self.lock().get(domain).copied())
    }

    async fn set(&self, domain: &str, volume: Volume) -> CoreResult<()> {
        let mut entries = self.lock();
        let previous = entries.insert(domain.to_string(), volume);

        if let Err(e) = self.write(&entries) {
            // Keep memory in step with what is on disk.
            match previous {
                Some(previous) => entries.insert(domain.to_string(), previous),
                None => entries.remove(domain),
            };
            return Err(e);
        }

        debug!(domain, %volume, "Preference saved");

        Ok(())
    }
}
