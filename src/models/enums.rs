//! Enumeration types for constrained record values.

use serde::{Deserialize, Serialize};

/// Lifecycle disposition of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MachineStatus {
    /// Sitting in stock, unassigned.
    InStock,
    /// Out on a patient trial.
    Trial,
    /// Rented to a patient.
    Rental,
    /// Purchased by a patient.
    Purchased,
}

impl MachineStatus {
    /// All statuses in their canonical display order.
    pub const ALL: [Self; 4] = [Self::InStock, Self::Trial, Self::Rental, Self::Purchased];

    /// Human-readable label, also used as the lexicographic sort key.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InStock => "in-stock",
            Self::Trial => "trial",
            Self::Rental => "rental",
            Self::Purchased => "purchased",
        }
    }

    /// Returns `true` if this status ties the machine to a patient.
    ///
    /// Trial, rental, and purchased machines carry patient contact
    /// information; in-stock machines must not.
    #[inline]
    #[must_use]
    pub const fn requires_patient_info(self) -> bool {
        matches!(self, Self::Trial | Self::Rental | Self::Purchased)
    }
}

impl core::fmt::Display for MachineStatus {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Machine brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MachineModel {
    /// Fisher & Paykel.
    FisherPaykel,
    /// Philips Respironics.
    Philips,
    /// ResMed.
    Resmed,
}

impl MachineModel {
    /// All models in their canonical display order.
    pub const ALL: [Self; 3] = [Self::FisherPaykel, Self::Philips, Self::Resmed];

    /// Human-readable brand label, used for search and export.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FisherPaykel => "F&P",
            Self::Philips => "Philips",
            Self::Resmed => "Resmed",
        }
    }
}

impl core::fmt::Display for MachineModel {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a physical unit is new stock or part of the rental pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MachineCategory {
    /// Factory-new unit.
    New,
    /// Unit circulating in the rental pool.
    RentalUnit,
}

impl MachineCategory {
    /// All categories in their canonical display order.
    pub const ALL: [Self; 2] = [Self::New, Self::RentalUnit];

    /// Human-readable category label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::RentalUnit => "rental-pool",
        }
    }
}

impl core::fmt::Display for MachineCategory {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}
