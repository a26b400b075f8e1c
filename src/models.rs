//! Data models for inventory entities.
//!
//! This module contains the strongly-typed machine record, its newtype
//! ID wrapper, enumeration types for constrained values, and the wire
//! models for the recognition service.

mod enums;
mod ids;
mod recognition;
mod record;

pub use enums::{MachineCategory, MachineModel, MachineStatus};
pub use ids::RecordId;
pub use recognition::{
    Candidate, Content, GenerationConfig, InlineData, Part, RecognizeRequest, RecognizeResponse,
};
pub use record::MachineRecord;

/// Re-exported so downstream code can name the status-date type without
/// depending on `chrono` directly.
pub use chrono::NaiveDate;
