//! Form-level validation and construction of machine records.
//!
//! [`RecordDraft`] holds in-progress form state. [`RecordDraft::finish`]
//! either produces a normalized [`MachineRecord`] or refuses with a
//! validation error, leaving the draft untouched so the caller can
//! correct and resubmit.

use chrono::{DateTime, Utc};

use crate::error::{InventoryError, Result};
use crate::models::{
    MachineCategory, MachineModel, MachineRecord, MachineStatus, NaiveDate, RecordId,
};

/// In-progress form state for creating or editing one record.
///
/// Field contents are raw user input; normalization (trimming, serial
/// uppercasing, clearing patient fields for in-stock machines) happens
/// in [`RecordDraft::finish`], always, so stale hidden values cannot
/// resurface after a status flips back and forth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    /// Identifier of the record being edited; `None` on create.
    pub id: Option<RecordId>,
    /// Raw serial number input.
    pub serial_number: String,
    /// Selected machine brand.
    pub model: MachineModel,
    /// Selected category.
    pub category: MachineCategory,
    /// Selected status.
    pub status: MachineStatus,
    /// Date the status takes effect.
    pub status_date: NaiveDate,
    /// Raw patient name input.
    pub patient_name: String,
    /// Raw phone number input.
    pub phone_number: String,
    /// Accessory list under edit.
    pub accessories: Vec<String>,
}

impl RecordDraft {
    /// Creates an empty draft with the form's default selections.
    #[inline]
    #[must_use]
    pub const fn new(status_date: NaiveDate) -> Self {
        Self {
            id: None,
            serial_number: String::new(),
            model: MachineModel::FisherPaykel,
            category: MachineCategory::New,
            status: MachineStatus::InStock,
            status_date,
            patient_name: String::new(),
            phone_number: String::new(),
            accessories: Vec::new(),
        }
    }

    /// Creates a draft pre-filled from an existing record, for editing.
    ///
    /// The record's id is carried over so [`RecordDraft::finish`]
    /// produces an in-place update rather than a new record.
    #[inline]
    #[must_use]
    pub fn from_record(record: &MachineRecord) -> Self {
        Self {
            id: Some(record.id.clone()),
            serial_number: record.serial_number.clone(),
            model: record.model,
            category: record.category,
            status: record.status,
            status_date: record.status_date,
            patient_name: record.patient_name.clone().unwrap_or_default(),
            phone_number: record.phone_number.clone().unwrap_or_default(),
            accessories: record.accessories.clone(),
        }
    }

    /// Adds an accessory entry.
    ///
    /// The entry is trimmed first; empty or already-present entries
    /// (case-sensitive exact match) are rejected. Returns `true` when
    /// the entry was added.
    #[inline]
    pub fn add_accessory(&mut self, raw: &str) -> bool {
        let trimmed = raw.trim();
        if trimmed.is_empty() || self.accessories.iter().any(|existing| existing == trimmed) {
            return false;
        }
        self.accessories.push(trimmed.to_owned());
        true
    }

    /// Removes the accessory at the given position.
    ///
    /// Returns the removed entry, or `None` when the position is out of
    /// range.
    #[inline]
    pub fn remove_accessory(&mut self, index: usize) -> Option<String> {
        if index < self.accessories.len() {
            Some(self.accessories.remove(index))
        } else {
            None
        }
    }

    /// Validates the draft and constructs the resulting record.
    ///
    /// Validation order: missing serial first, then missing patient
    /// name for statuses that require one. On success the serial is
    /// uppercased, name and phone are trimmed, and patient fields plus
    /// accessories are cleared whenever the status does not call for
    /// them. A fresh id is generated on create; an existing id is
    /// reused on edit. `now` becomes the record's `last_updated` stamp.
    ///
    /// Duplicate-serial enforcement is the store's job; see
    /// [`crate::inventory`].
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::MissingSerial`] when the trimmed serial
    /// is empty, and [`InventoryError::MissingPatient`] when the status
    /// requires patient info but the trimmed patient name is empty.
    pub fn finish(&self, now: DateTime<Utc>) -> Result<MachineRecord> {
        let serial = self.serial_number.trim();
        if serial.is_empty() {
            return Err(InventoryError::MissingSerial);
        }

        let needs_patient_info = self.status.requires_patient_info();
        let patient = self.patient_name.trim();
        if needs_patient_info && patient.is_empty() {
            return Err(InventoryError::MissingPatient);
        }

        let phone = self.phone_number.trim();
        let (patient_name, phone_number, accessories) = if needs_patient_info {
            (
                Some(patient.to_owned()),
                if phone.is_empty() {
                    None
                } else {
                    Some(phone.to_owned())
                },
                self.accessories.clone(),
            )
        } else {
            (None, None, Vec::new())
        };

        Ok(MachineRecord {
            id: self.id.clone().unwrap_or_else(RecordId::generate),
            serial_number: serial.to_uppercase(),
            model: self.model,
            category: self.category,
            status: self.status,
            status_date: self.status_date,
            patient_name,
            phone_number,
            accessories,
            last_updated: now,
        })
    }
}
