//! High-level inventory store with integrated persistence.
//!
//! Combines the canonical in-memory record collection with a
//! [`Storage`] / [`BlockingStorage`] backend: hydrate once at startup,
//! persist after every successful mutation, and answer queries from
//! memory in between.

use crate::models::{MachineRecord, MachineStatus};

/// Per-status record counts for the summary surface.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    /// Machines sitting in stock.
    pub in_stock: usize,
    /// Machines out on trial.
    pub trial: usize,
    /// Machines out on rental.
    pub rental: usize,
    /// Machines purchased by patients.
    pub purchased: usize,
}

impl StatusCounts {
    /// Tallies the given collection.
    #[inline]
    #[must_use]
    pub fn for_records(records: &[MachineRecord]) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.status {
                MachineStatus::InStock => counts.in_stock += 1,
                MachineStatus::Trial => counts.trial += 1,
                MachineStatus::Rental => counts.rental += 1,
                MachineStatus::Purchased => counts.purchased += 1,
            }
        }
        counts
    }

    /// Returns the count for one status.
    #[inline]
    #[must_use]
    pub const fn of(&self, status: MachineStatus) -> usize {
        match status {
            MachineStatus::InStock => self.in_stock,
            MachineStatus::Trial => self.trial,
            MachineStatus::Rental => self.rental,
            MachineStatus::Purchased => self.purchased,
        }
    }

    /// Total number of records.
    #[inline]
    #[must_use]
    pub const fn total(&self) -> usize {
        self.in_stock + self.trial + self.rental + self.purchased
    }
}

/// Generates a high-level inventory store (async or blocking).
macro_rules! define_inventory {
    (
        store_name: $store:ident,
        storage_trait: $storage_trait:ident,
        store_doc: $store_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $store_doc]
        #[derive(Debug)]
        pub struct $store<S: $storage_trait> {
            /// Persistence backend.
            storage: S,
            /// Canonical ordered collection; newest-first insertion order.
            records: Vec<MachineRecord>,
            /// Set once the initial load has completed. Writes are
            /// skipped before that so a valid persisted collection is
            /// never clobbered by an empty startup default.
            hydrated: bool,
        }

        impl<S: $storage_trait> $store<S> {
            /// Creates an empty, un-hydrated store over the given backend.
            #[inline]
            pub const fn new(storage: S) -> Self {
                Self {
                    storage,
                    records: Vec::new(),
                    hydrated: false,
                }
            }

            /// Loads the persisted collection into memory.
            ///
            /// Call once at startup. A malformed persisted blob is
            /// logged and degrades to an empty collection — a broken
            /// file must not take the whole tool down. Backend I/O
            /// failures other than "nothing persisted yet" propagate.
            ///
            /// Returns the number of records loaded.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails to read.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn hydrate(&mut self) -> Result<usize> {
                let loaded = match self.storage.records() $( .$await_ext )? {
                    Ok(records) => records,
                    Err(InventoryError::Serialization(err)) => {
                        tracing::warn!(
                            error = %err,
                            "persisted inventory is unreadable; starting empty"
                        );
                        Vec::new()
                    }
                    Err(err) => return Err(err),
                };
                tracing::debug!(count = loaded.len(), "inventory hydrated");
                self.records = loaded;
                self.hydrated = true;
                Ok(self.records.len())
            }

            /// Returns `true` once [`Self::hydrate`] has completed.
            #[inline]
            #[must_use]
            pub const fn is_hydrated(&self) -> bool {
                self.hydrated
            }

            /// Returns the canonical ordered collection.
            #[inline]
            #[must_use]
            pub fn records(&self) -> &[MachineRecord] {
                &self.records
            }

            /// Inserts a new record or updates an existing one.
            ///
            /// A record whose id is already present replaces the old
            /// version in place, keeping its position. A new record is
            /// rejected when its serial number collides with any
            /// existing record; otherwise it is prepended, so insertion
            /// order is newest-first. The collection is persisted after
            /// a successful mutation.
            ///
            /// # Errors
            ///
            /// Returns [`InventoryError::DuplicateSerial`] on a serial
            /// collision (the collection is left unchanged), or a
            /// storage error if persisting fails.
            #[tracing::instrument(skip_all, fields(serial = %record.serial_number))]
            pub $($async_kw)? fn upsert(&mut self, record: MachineRecord) -> Result<()> {
                match self
                    .records
                    .iter()
                    .position(|existing| existing.id == record.id)
                {
                    Some(index) => {
                        if let Some(slot) = self.records.get_mut(index) {
                            *slot = record;
                        }
                    }
                    None => {
                        if self
                            .records
                            .iter()
                            .any(|existing| existing.serial_number == record.serial_number)
                        {
                            return Err(InventoryError::DuplicateSerial(record.serial_number));
                        }
                        self.records.insert(0, record);
                    }
                }
                self.persist() $( .$await_ext )?
            }

            /// Removes the record with the given id.
            ///
            /// Returns `true` if a record was removed; `false` (with no
            /// persistence write) when no record carries the id.
            ///
            /// # Errors
            ///
            /// Returns a storage error if persisting fails.
            #[tracing::instrument(skip_all, fields(id = %id))]
            pub $($async_kw)? fn remove(&mut self, id: &RecordId) -> Result<bool> {
                let before = self.records.len();
                self.records.retain(|record| record.id != *id);
                if self.records.len() == before {
                    return Ok(false);
                }
                self.persist() $( .$await_ext )? ?;
                Ok(true)
            }

            /// Looks up a record by serial number, case-insensitively.
            #[inline]
            #[must_use]
            pub fn find_by_serial(&self, serial: &str) -> Option<&MachineRecord> {
                let needle = serial.trim().to_uppercase();
                self.records
                    .iter()
                    .find(|record| record.serial_number == needle)
            }

            /// Returns the filtered, sorted view for the given query.
            #[inline]
            #[must_use]
            pub fn query(&self, query: &RecordQuery) -> Vec<&MachineRecord> {
                query.run(&self.records)
            }

            /// Returns per-status summary counts.
            #[inline]
            #[must_use]
            pub fn status_counts(&self) -> StatusCounts {
                StatusCounts::for_records(&self.records)
            }

            /// Returns a reference to the storage backend.
            #[inline]
            #[must_use]
            pub const fn storage(&self) -> &S {
                &self.storage
            }

            /// Writes the collection to the backend, unless hydration
            /// has not happened yet.
            $($async_kw)? fn persist(&self) -> Result<()> {
                if !self.hydrated {
                    tracing::debug!("skipping persistence before initial load");
                    return Ok(());
                }
                self.storage.save_records(self.records.clone()) $( .$await_ext )?
            }
        }
    };
}

// ── Async variant ───────────────────────────────────────────────────────

#[cfg(feature = "async")]
mod async_inventory {
    //! Async inventory store.

    use super::StatusCounts;
    use crate::error::{InventoryError, Result};
    use crate::models::{MachineRecord, RecordId};
    use crate::query::RecordQuery;
    use crate::storage::Storage;

    define_inventory! {
        store_name: Inventory,
        storage_trait: Storage,
        store_doc: "High-level async inventory store with integrated persistence.\n\nHydrate once at startup via [`Inventory::hydrate`]; every mutation\npersists the whole collection afterwards.",
        async_kw: async,
        await_kw: await,
    }
}

// ── Blocking variant ────────────────────────────────────────────────────

#[cfg(feature = "blocking")]
mod blocking_inventory {
    //! Blocking inventory store.

    use super::StatusCounts;
    use crate::error::{InventoryError, Result};
    use crate::models::{MachineRecord, RecordId};
    use crate::query::RecordQuery;
    use crate::storage::BlockingStorage;

    define_inventory! {
        store_name: InventoryBlocking,
        storage_trait: BlockingStorage,
        store_doc: "High-level blocking inventory store with integrated persistence.\n\nHydrate once at startup via [`InventoryBlocking::hydrate`]; every\nmutation persists the whole collection afterwards.",
    }
}

#[cfg(feature = "async")]
pub use async_inventory::Inventory;
#[cfg(feature = "blocking")]
pub use blocking_inventory::InventoryBlocking;
