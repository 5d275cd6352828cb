//! Report export: Paginates a rasterized results view and hands it to a sink.

use std::path::PathBuf;
use std::sync::Arc;

use crate::ports::{ExportError, ReportPage, ReportSink};
use crate::Result;

/// Text columns rendered per row. Fits an A4 page at 9pt Courier.
pub const PAGE_COLUMNS: u16 = 88;
/// Rows per exported page.
pub const PAGE_ROWS: usize = 60;

/// Split `rows` into pages of `rows_per_page`, dropping trailing blank rows.
///
/// The last page is short rather than padded.
#[must_use]
pub fn paginate(rows: &[String], rows_per_page: usize) -> Vec<ReportPage> {
    let used = rows
        .iter()
        .rposition(|r| !r.trim().is_empty())
        .map_or(0, |last| last + 1);

    rows[..used]
        .chunks(rows_per_page.max(1))
        .map(|chunk| ReportPage {
            rows: chunk.to_vec(),
        })
        .collect()
}

pub struct ReportExporter<S>
where
    S: ReportSink + ?Sized,
{
    sink: Arc<S>,
}

impl<S> ReportExporter<S>
where
    S: ReportSink + ?Sized,
{
    pub fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    /// Paginate `rows` and write them as one document dated `date`.
    ///
    /// # Errors
    /// Returns error if the view is blank or the sink fails.
    pub fn export(&self, rows: &[String], date: chrono::NaiveDate) -> Result<PathBuf> {
        let pages = paginate(rows, PAGE_ROWS);
        if pages.is_empty() {
            return Err(ExportError::EmptyReport.into());
        }
        tracing::debug!("Exporting {} rows across {} pages", rows.len(), pages.len());
        Ok(self.sink.write(&pages, date)?)
    }
}
