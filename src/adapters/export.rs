//! Report document writer using docx-rs.
//!
//! Pages arrive already rasterized as fixed-width text rows. Each row becomes
//! one monospace paragraph; pages are separated by hard page breaks on an A4
//! portrait sheet.

use std::io::Cursor;
use std::path::PathBuf;

use docx_rs::{BreakType, Docx, LineSpacing, PageMargin, Paragraph, Run, RunFonts};

use crate::ports::{ExportError, ReportPage, ReportSink};

/// A4 portrait in twentieths of a point.
const A4_WIDTH_TWIPS: u32 = 11_906;
const A4_HEIGHT_TWIPS: u32 = 16_838;
/// 15 mm
const MARGIN_TWIPS: i32 = 850;
const REPORT_FONT: &str = "Courier New";
/// Half-points.
const REPORT_FONT_SIZE: usize = 18;

/// File name for a report generated on `date`.
#[must_use]
pub fn report_file_name(date: chrono::NaiveDate) -> String {
    format!("CareEnforced_Risk_Report_{}.docx", date.format("%Y-%m-%d"))
}

/// Writes reports as `.docx` files into a directory.
#[derive(Debug, Clone)]
pub struct DocxReportSink {
    dir: PathBuf,
}

impl DocxReportSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReportSink for DocxReportSink {
    fn write(
        &self,
        pages: &[ReportPage],
        date: chrono::NaiveDate,
    ) -> Result<PathBuf, ExportError> {
        let bytes = render_docx(pages)?;

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(report_file_name(date));
        std::fs::write(&path, bytes)?;

        tracing::info!("Wrote {} page report to {}", pages.len(), path.display());
        Ok(path)
    }
}

/// Build the document bytes for `pages`.
///
/// # Errors
/// Returns error if there are no rows or packing fails.
pub fn render_docx(pages: &[ReportPage]) -> Result<Vec<u8>, ExportError> {
    if pages.iter().all(|p| p.rows.is_empty()) {
        return Err(ExportError::EmptyReport);
    }

    let mut docx = Docx::new()
        .page_size(A4_WIDTH_TWIPS, A4_HEIGHT_TWIPS)
        .page_margin(
            PageMargin::new()
                .top(MARGIN_TWIPS)
                .bottom(MARGIN_TWIPS)
                .left(MARGIN_TWIPS)
                .right(MARGIN_TWIPS),
        );

    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            docx = docx.add_paragraph(
                Paragraph::new().add_run(Run::new().add_break(BreakType::Page)),
            );
        }
        for row in &page.rows {
            docx = docx.add_paragraph(row_paragraph(row));
        }
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Render(e.to_string()))?;

    Ok(buf.into_inner())
}

fn row_paragraph(row: &str) -> Paragraph {
    Paragraph::new()
        .line_spacing(LineSpacing::new().before(0).after(0))
        .add_run(
            Run::new()
                .add_text(row.trim_end())
                .size(REPORT_FONT_SIZE)
                .fonts(RunFonts::new().ascii(REPORT_FONT).hi_ansi(REPORT_FONT)),
        )
}
