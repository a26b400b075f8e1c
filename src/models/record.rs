//! Machine record model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{MachineCategory, MachineModel, MachineStatus, RecordId};

/// One tracked physical machine unit and its current disposition.
///
/// The sole persisted entity. Records are created by the editor,
/// owned by the inventory store, and treated as immutable snapshots
/// everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRecord {
    /// Unique identifier, assigned at creation.
    pub id: RecordId,
    /// Uppercase serial number, unique across the collection.
    pub serial_number: String,
    /// Machine brand.
    pub model: MachineModel,
    /// New stock or rental pool.
    pub category: MachineCategory,
    /// Current lifecycle disposition.
    pub status: MachineStatus,
    /// Date the current status took effect.
    pub status_date: NaiveDate,
    /// Patient name; present exactly when the status requires it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    /// Patient contact phone; only meaningful alongside `patient_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Accessory names handed out with the machine, no duplicates.
    #[serde(default)]
    pub accessories: Vec<String>,
    /// Timestamp of the last create/update, the default freshness key.
    pub last_updated: DateTime<Utc>,
}
