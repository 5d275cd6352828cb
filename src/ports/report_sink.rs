//! Report sink port: Trait for writing a paginated report document.

use std::path::PathBuf;

/// Errors a sink can report while writing a document.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    EmptyReport,

    #[error("Document build error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One fixed-height page of rasterized report rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage {
    pub rows: Vec<String>,
}

/// Destination for exported reports.
pub trait ReportSink: Send + Sync {
    /// Write `pages` as one document and return where it landed.
    ///
    /// # Errors
    /// Returns error if the document cannot be built or written.
    fn write(
        &self,
        pages: &[ReportPage],
        date: chrono::NaiveDate,
    ) -> Result<PathBuf, ExportError>;
}
