//! Inventory tracker for sleep-therapy machines.
//!
//! This crate tracks physical CPAP-style machine units through their
//! lifecycle (in stock, on trial, rented, purchased), persists the
//! collection locally as a single JSON blob, and layers filtering,
//! sorting, spreadsheet export, and photo serial-number recognition on
//! top.
//!
//! The main pieces:
//!
//! - [`models`] — the [`models::MachineRecord`] entity and its closed
//!   enumerations.
//! - [`storage`] — pluggable persistence backends (JSON file,
//!   in-memory).
//! - [`inventory`] — the canonical record store: hydrate once, persist
//!   after every mutation.
//! - [`query`] — pure filtering and sorting of the collection.
//! - [`editor`] — form validation and record construction.
//! - [`recognition`] — client for the hosted serial-number extraction
//!   service.
//! - [`export`] — `.xlsx` export of the filtered view.

pub mod editor;
pub mod error;
pub mod export;
pub mod inventory;
pub mod models;
pub mod query;
pub mod recognition;
pub mod storage;
