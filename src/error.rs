//! Error types for the sleepstock inventory library.

/// All errors that can occur when using the inventory library.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage backend failed.
    #[error("storage error: {0}")]
    Storage(Box<dyn core::error::Error + Send + Sync>),

    /// HTTP transport failure while talking to the recognition service.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The recognition service returned a non-success status.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("recognition API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Response body or a fallback message.
        message: String,
    },

    /// No recognition API key was configured.
    #[error("recognition API key is not configured")]
    MissingApiKey,

    /// The submitted serial number was empty after trimming.
    #[error("serial number must not be empty")]
    MissingSerial,

    /// The selected status requires a patient name, but none was given.
    #[error("patient name is required for the selected status")]
    MissingPatient,

    /// A different record already carries this serial number.
    #[error("serial number already exists in the inventory: {0}")]
    DuplicateSerial(String),

    /// Spreadsheet export failed.
    #[error("export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, InventoryError>;
