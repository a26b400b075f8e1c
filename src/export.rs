//! Spreadsheet export of the filtered inventory view.
//!
//! Pure row projection plus workbook writing. The adapter operates on
//! whatever filtered/sorted view it is handed and keeps no state.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use crate::error::Result;
use crate::models::{MachineRecord, NaiveDate};

/// Worksheet name.
const SHEET_NAME: &str = "Inventory";

/// Column headers, in the fixed export order.
const HEADERS: [&str; 8] = [
    "Serial", "Model", "Status", "Date", "Patient", "Phone", "Accessories", "Updated",
];

/// Delimiter joining accessory names into one cell.
const ACCESSORY_DELIMITER: &str = ", ";

/// Human-readable timestamp format for the `Updated` column.
const UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns the dated export file name, e.g. `SleepInventory_2024-06-01.xlsx`.
#[inline]
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("SleepInventory_{date}.xlsx")
}

/// Projects one record into its export row, in header order.
#[inline]
#[must_use]
pub fn row_values(record: &MachineRecord) -> [String; 8] {
    [
        record.serial_number.clone(),
        record.model.label().to_owned(),
        record.status.label().to_owned(),
        record.status_date.to_string(),
        record.patient_name.clone().unwrap_or_default(),
        record.phone_number.clone().unwrap_or_default(),
        record.accessories.join(ACCESSORY_DELIMITER),
        record.last_updated.format(UPDATED_FORMAT).to_string(),
    ]
}

/// Writes the given view to an `.xlsx` workbook at `path`.
///
/// One worksheet named `Inventory`, a bold header row, then one row per
/// record in the order given.
///
/// # Errors
///
/// Returns [`crate::error::InventoryError::Export`] if the workbook
/// cannot be built or saved.
#[tracing::instrument(skip_all, fields(rows = records.len()))]
pub fn write_workbook<P: AsRef<Path>>(records: &[&MachineRecord], path: P) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    _ = worksheet.set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    for (col, title) in (0_u16..).zip(HEADERS) {
        _ = worksheet.write_string_with_format(0, col, title, &header_format)?;
    }

    let mut row: u32 = 1;
    for record in records {
        for (col, value) in (0_u16..).zip(row_values(record)) {
            _ = worksheet.write_string(row, col, value)?;
        }
        row += 1;
    }

    workbook.save(path.as_ref())?;
    tracing::debug!(path = %path.as_ref().display(), "workbook written");
    Ok(())
}
