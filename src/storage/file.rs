//! JSON-file-based storage backend.
//!
//! Stores the whole record collection in a single JSON file under a
//! configurable directory (default: `$XDG_DATA_HOME/sleepstock/`).

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::error::{InventoryError, Result};
use crate::models::MachineRecord;

/// Application name used for the XDG data directory.
const APP_NAME: &str = "sleepstock";

/// File name for the record collection blob.
const RECORDS_FILE: &str = "records.json";
/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "storage.lock";

/// File-backed storage that persists the inventory as a JSON file.
///
/// The record collection is stored as one `records.json` blob, written
/// and read whole. Collection order is preserved exactly as given.
///
/// # Concurrency
///
/// Thread safety within a single process is provided by an in-process
/// [`Mutex`]. Cross-process safety is achieved via an advisory file lock
/// on `storage.lock` (using [`std::fs::File::lock`] /
/// [`std::fs::File::lock_shared`]).
///
/// Read operations acquire a shared lock (allowing concurrent readers),
/// while write operations acquire an exclusive lock.
///
/// # File layout
///
/// ```text
/// <dir>/
///   storage.lock          (cross-process lock sentinel)
///   records.json
/// ```
#[derive(Debug)]
pub struct FileStorage {
    /// Root directory containing the JSON file.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStorage {
    /// Creates a new file storage rooted at the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist. Also
    /// opens (or creates) the `storage.lock` sentinel file used for
    /// cross-process advisory locking.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this application.
    ///
    /// On Linux: `$XDG_DATA_HOME/sleepstock/` (typically
    /// `~/.local/share/sleepstock/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| {
                InventoryError::Storage("could not determine platform data directory".into())
            })
    }

    // ── Private helpers ─────────────────────────────────────────────

    /// Returns the full path for a given file name.
    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Acquires an in-process mutex guard and a shared (read) file lock,
    /// executes `op`, then releases the file lock.
    fn with_shared_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock_shared().map_err(storage_io_error)?;
        let result = op();
        // Only surface the unlock error when the operation succeeded;
        // otherwise the original error is more useful.
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Acquires an in-process mutex guard and an exclusive (write) file
    /// lock, executes `op`, then releases the file lock.
    fn with_exclusive_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock().map_err(storage_io_error)?;
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Reads and deserializes the records file. Returns an empty `Vec`
    /// if the file does not exist.
    fn read_records(&self) -> Result<Vec<MachineRecord>> {
        let path = self.path(RECORDS_FILE);
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(InventoryError::from),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(storage_io_error(err)),
        }
    }

    /// Atomically writes the serialized records file (write-to-tmp then
    /// rename).
    fn write_records(&self, records: &[MachineRecord]) -> Result<()> {
        let path = self.path(RECORDS_FILE);
        let tmp_path = self.path(&format!("{RECORDS_FILE}.tmp"));
        let json = serde_json::to_string_pretty(records).map_err(InventoryError::from)?;
        fs::write(&tmp_path, json).map_err(storage_io_error)?;
        fs::rename(&tmp_path, &path).map_err(storage_io_error)?;
        Ok(())
    }

    /// Deletes the records file.
    ///
    /// The `storage.lock` sentinel is intentionally preserved — it is
    /// infrastructure, not data.
    fn clear_all(&self) -> Result<()> {
        self.with_exclusive_lock(|| {
            let path = self.path(RECORDS_FILE);
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(storage_io_error(err)),
            }
        })
    }
}

// ── Free-standing helpers ───────────────────────────────────────────────

/// Wraps an I/O error into an [`InventoryError::Storage`].
fn storage_io_error(err: std::io::Error) -> InventoryError {
    InventoryError::Storage(Box::new(err))
}

/// Wraps a mutex poison error into an [`InventoryError::Storage`].
fn lock_poison_error<T>(err: &std::sync::PoisonError<T>) -> InventoryError {
    InventoryError::Storage(err.to_string().into())
}

// ── BlockingStorage implementation ──────────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingStorage for FileStorage {
    #[inline]
    fn records(&self) -> Result<Vec<MachineRecord>> {
        self.with_shared_lock(|| self.read_records())
    }

    #[inline]
    fn save_records(&self, records: Vec<MachineRecord>) -> Result<()> {
        self.with_exclusive_lock(|| self.write_records(&records))
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        self.clear_all()
    }
}

// ── Storage (async) implementation ──────────────────────────────────────

#[cfg(feature = "async")]
impl super::Storage for FileStorage {
    #[inline]
    fn records(&self) -> impl Future<Output = Result<Vec<MachineRecord>>> + Send {
        core::future::ready(self.with_shared_lock(|| self.read_records()))
    }

    #[inline]
    fn save_records(&self, records: Vec<MachineRecord>) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.with_exclusive_lock(|| self.write_records(&records)))
    }

    #[inline]
    fn clear(&self) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.clear_all())
    }
}
