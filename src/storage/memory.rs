//! In-memory storage backend for testing.
//!
//! Provides [`InMemoryStorage`], a thread-safe in-memory implementation of
//! the storage traits. Ideal for unit and integration tests where file I/O
//! is undesirable.

use std::sync::Mutex;

#[cfg(feature = "async")]
use core::future::{self, Future};

use crate::error::{InventoryError, Result};
use crate::models::MachineRecord;

/// Thread-safe in-memory storage for testing.
///
/// This type implements both [`super::Storage`] (async) and
/// [`super::BlockingStorage`] (blocking) traits, providing a zero-setup
/// storage backend for tests.
///
/// # Example
///
/// ```rust
/// use sleepstock::storage::InMemoryStorage;
///
/// let storage = InMemoryStorage::new();
/// // Use with Inventory or InventoryBlocking:
/// // InventoryBlocking::new(storage)
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// Persisted collection behind a mutex for thread-safe interior
    /// mutability.
    records: Mutex<Vec<MachineRecord>>,
}

impl InMemoryStorage {
    /// Creates a new empty in-memory storage.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the inner lock and applies a closure.
    fn with_lock<R>(&self, f: impl FnOnce(&mut Vec<MachineRecord>) -> R) -> Result<R> {
        let mut records = self.records.lock().map_err(|err| lock_error(&err))?;
        Ok(f(&mut records))
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &std::sync::PoisonError<T>) -> InventoryError {
    InventoryError::Storage(err.to_string().into())
}

// ── BlockingStorage implementation ──────────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingStorage for InMemoryStorage {
    #[inline]
    fn records(&self) -> Result<Vec<MachineRecord>> {
        self.with_lock(|records| records.clone())
    }

    #[inline]
    fn save_records(&self, records: Vec<MachineRecord>) -> Result<()> {
        self.with_lock(|stored| *stored = records)
    }

    #[inline]
    fn clear(&self) -> Result<()> {
        self.with_lock(Vec::clear)
    }
}

// ── Storage (async) implementation ──────────────────────────────────────

#[cfg(feature = "async")]
impl super::Storage for InMemoryStorage {
    #[inline]
    fn records(&self) -> impl Future<Output = Result<Vec<MachineRecord>>> + Send {
        future::ready(self.with_lock(|records| records.clone()))
    }

    #[inline]
    fn save_records(&self, records: Vec<MachineRecord>) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|stored| *stored = records))
    }

    #[inline]
    fn clear(&self) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(Vec::clear))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MachineCategory, MachineModel, MachineStatus, NaiveDate, RecordId};
    use chrono::DateTime;

    /// Creates a minimal test record.
    fn test_record(id: &str, serial: &str) -> MachineRecord {
        MachineRecord {
            id: RecordId::new(id.to_owned()),
            serial_number: serial.to_owned(),
            model: MachineModel::Philips,
            category: MachineCategory::RentalUnit,
            status: MachineStatus::InStock,
            status_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            patient_name: None,
            phone_number: None,
            accessories: Vec::new(),
            last_updated: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[cfg(feature = "blocking")]
    mod blocking {
        use super::*;
        use crate::storage::BlockingStorage;

        #[test]
        fn starts_empty() {
            let s = InMemoryStorage::new();
            assert!(s.records().unwrap().is_empty());
        }

        #[test]
        fn save_and_read_records() {
            let s = InMemoryStorage::new();
            s.save_records(vec![test_record("r-1", "SN-1"), test_record("r-2", "SN-2")])
                .unwrap();
            assert_eq!(s.records().unwrap().len(), 2);
        }

        #[test]
        fn save_replaces_whole_collection() {
            let s = InMemoryStorage::new();
            s.save_records(vec![test_record("r-1", "SN-1")]).unwrap();
            s.save_records(vec![test_record("r-2", "SN-2")]).unwrap();

            let records = s.records().unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].serial_number, "SN-2");
        }

        #[test]
        fn clear_resets_everything() {
            let s = InMemoryStorage::new();
            s.save_records(vec![test_record("r-1", "SN-1")]).unwrap();
            s.clear().unwrap();
            assert!(s.records().unwrap().is_empty());
        }
    }

    #[cfg(feature = "async")]
    mod async_tests {
        use super::*;
        use crate::storage::Storage;

        #[tokio::test]
        async fn save_and_read_records() {
            let s = InMemoryStorage::new();
            s.save_records(vec![test_record("r-1", "SN-1")])
                .await
                .unwrap();
            let records = s.records().await.unwrap();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].serial_number, "SN-1");
        }

        #[tokio::test]
        async fn clear_resets_everything() {
            let s = InMemoryStorage::new();
            s.save_records(vec![test_record("r-1", "SN-1")])
                .await
                .unwrap();
            s.clear().await.unwrap();
            assert!(s.records().await.unwrap().is_empty());
        }
    }
}
