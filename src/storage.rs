//! Pluggable storage backends for persisting the machine inventory.
//!
//! This module defines the [`Storage`] (async) and [`BlockingStorage`]
//! (blocking) traits via a shared macro, mirroring the client generation
//! pattern in [`crate::recognition`].
//!
//! The persisted state is deliberately a single blob: the whole record
//! collection is written and read in one piece under one fixed key, so
//! backends stay trivial and the inventory store remains the only owner
//! of collection semantics.

#[cfg(feature = "storage-file")]
mod file;
mod memory;

#[cfg(feature = "storage-file")]
pub use file::FileStorage;
pub use memory::InMemoryStorage;

/// Generates a storage trait (async or blocking) with all methods.
///
/// Uses `@methods` to define the method list once, and `@method` to
/// render each method in async (`impl Future + Send`) or blocking
/// (`fn`) style.
macro_rules! define_storage {
    // ── Entry points ────────────────────────────────────────────────
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: async_mode,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods async_mode);
        }
    };
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: blocking,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_storage!(@methods blocking);
        }
    };

    // ── Single method list (shared between both variants) ───────────
    (@methods $mode:ident) => {
        define_storage!(@method $mode, records,
            "Returns the persisted record collection.\n\nReturns an empty collection when no state has been persisted yet.\n\n# Errors\n\nReturns [`crate::error::InventoryError::Serialization`] when the persisted blob cannot be parsed, or a storage error when the backend fails to read.",
            -> Result<Vec<MachineRecord>>);
        define_storage!(@method $mode, save_records,
            "Replaces the persisted record collection with the given one.\n\nThe whole collection is written as a single blob.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            records: Vec<MachineRecord>, -> Result<()>);
        define_storage!(@method $mode, clear,
            "Removes all persisted state.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            -> Result<()>);
    };

    // ── Blocking method renderer ────────────────────────────────────
    (@method blocking, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*) -> $ret;
    };

    // ── Async method renderer (returns impl Future + Send) ──────────
    (@method async_mode, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*)
            -> impl core::future::Future<Output = $ret> + Send;
    };
}

#[cfg(feature = "async")]
mod async_storage {
    //! Async storage trait definition.

    use crate::error::Result;
    use crate::models::MachineRecord;

    define_storage! {
        trait_name: Storage,
        trait_doc: "Async storage backend for persisting the machine inventory.\n\nAll methods take `&self` — implementations should use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: async_mode,
    }
}

#[cfg(feature = "blocking")]
mod blocking_storage {
    //! Blocking storage trait definition.

    use crate::error::Result;
    use crate::models::MachineRecord;

    define_storage! {
        trait_name: BlockingStorage,
        trait_doc: "Blocking storage backend for persisting the machine inventory.\n\nAll methods take `&self` — implementations should use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: blocking,
    }
}

#[cfg(feature = "async")]
pub use async_storage::Storage;
#[cfg(feature = "blocking")]
pub use blocking_storage::BlockingStorage;
