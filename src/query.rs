//! Pure filtering and sorting of the record collection.
//!
//! The query engine is a side-effect-free projection: it never mutates
//! the collection it is given and always returns a fresh ordered
//! sequence of references.

use crate::models::{MachineRecord, MachineStatus, NaiveDate};

/// Status criterion of a query.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every status passes.
    #[default]
    All,
    /// Only the given status passes.
    Only(MachineStatus),
}

/// Ordering applied to the filtered view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Most recently updated first (descending `last_updated`).
    #[default]
    Newest,
    /// Ascending lexicographic by serial number.
    Serial,
    /// Ascending lexicographic by status label.
    Status,
    /// Most recent status date first (descending `status_date`).
    Date,
}

/// Composable query over the record collection.
///
/// Use builder-style methods to chain criteria. All conditions are
/// combined — a record must satisfy every set criterion to pass.
///
/// # Examples
///
/// ```
/// use sleepstock::query::{RecordQuery, SortMode, StatusFilter};
/// use sleepstock::models::{MachineStatus, NaiveDate};
///
/// let query = RecordQuery::new()
///     .search("chen")
///     .status(StatusFilter::Only(MachineStatus::Rental))
///     .date_from(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
///     .sort(SortMode::Date);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// Free-text needle; empty or unset always passes.
    pub search: Option<String>,
    /// Status criterion.
    pub status: StatusFilter,
    /// Start of the inclusive status-date range.
    pub date_from: Option<NaiveDate>,
    /// End of the inclusive status-date range.
    pub date_to: Option<NaiveDate>,
    /// Ordering of the result.
    pub sort: SortMode,
}

impl RecordQuery {
    /// Creates an empty query that matches all records, newest first.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to records matching the given search text.
    ///
    /// The needle is matched case-insensitively as a substring of the
    /// serial number, patient name, phone number, or model label.
    #[inline]
    #[must_use]
    pub fn search<T: Into<String>>(mut self, needle: T) -> Self {
        self.search = Some(needle.into());
        self
    }

    /// Restricts to records with the given status.
    #[inline]
    #[must_use]
    pub const fn status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Restricts to records whose status date is on or after `from`.
    #[inline]
    #[must_use]
    pub const fn date_from(mut self, from: NaiveDate) -> Self {
        self.date_from = Some(from);
        self
    }

    /// Restricts to records whose status date is on or before `to`.
    #[inline]
    #[must_use]
    pub const fn date_to(mut self, to: NaiveDate) -> Self {
        self.date_to = Some(to);
        self
    }

    /// Restricts to records with status dates in the given range
    /// (inclusive on both ends).
    #[inline]
    #[must_use]
    pub const fn date_range(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.date_from = Some(from);
        self.date_to = Some(to);
        self
    }

    /// Sets the ordering of the result.
    #[inline]
    #[must_use]
    pub const fn sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    /// Returns `true` if the record satisfies all set criteria.
    #[inline]
    #[must_use]
    pub fn matches(&self, record: &MachineRecord) -> bool {
        self.matches_search(record) && self.matches_status(record) && self.matches_date(record)
    }

    /// Returns the filtered, sorted view of the given collection.
    ///
    /// The input is never mutated. The sort is stable: records with
    /// equal keys keep their collection order, so re-running the same
    /// query over an unchanged collection yields an identical result.
    #[must_use]
    pub fn run<'rec>(&self, records: &'rec [MachineRecord]) -> Vec<&'rec MachineRecord> {
        let mut view: Vec<&MachineRecord> =
            records.iter().filter(|record| self.matches(record)).collect();
        match self.sort {
            SortMode::Newest => view.sort_by(|a, b| b.last_updated.cmp(&a.last_updated)),
            SortMode::Serial => view.sort_by(|a, b| a.serial_number.cmp(&b.serial_number)),
            SortMode::Status => view.sort_by(|a, b| a.status.label().cmp(b.status.label())),
            SortMode::Date => view.sort_by(|a, b| b.status_date.cmp(&a.status_date)),
        }
        view
    }

    /// Checks the free-text criterion.
    fn matches_search(&self, record: &MachineRecord) -> bool {
        self.search.as_ref().is_none_or(|needle| {
            let needle_lower = needle.to_lowercase();
            record
                .serial_number
                .to_lowercase()
                .contains(&needle_lower)
                || record
                    .patient_name
                    .as_ref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle_lower))
                || record
                    .phone_number
                    .as_ref()
                    .is_some_and(|phone| phone.to_lowercase().contains(&needle_lower))
                || record.model.label().to_lowercase().contains(&needle_lower)
        })
    }

    /// Checks the status criterion.
    fn matches_status(&self, record: &MachineRecord) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => record.status == status,
        }
    }

    /// Checks the date-range criterion; unset bounds are unbounded.
    fn matches_date(&self, record: &MachineRecord) -> bool {
        self.date_from.is_none_or(|from| record.status_date >= from)
            && self.date_to.is_none_or(|to| record.status_date <= to)
    }
}
