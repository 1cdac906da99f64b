// Analytics Errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// A comparison names a participant the registry has never seen.
    #[error("Unknown entity in comparison: {name}")]
    UnknownEntity { name: String },
    /// Report fetch failed or carried no comparisons.
    #[error("Report data unavailable: {0}")]
    DataUnavailable(String),
    /// Full document text could not be retrieved for a selected pair.
    #[error("Document text unavailable: {0}")]
    DocumentUnavailable(String),
}

impl AnalyticsError {
    pub fn unknown_entity(name: impl Into<String>) -> Self {
        Self::UnknownEntity { name: name.into() }
    }
}
