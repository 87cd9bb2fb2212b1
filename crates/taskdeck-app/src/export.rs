//! Report rendering for the full task list.
//!
//! Both renderings iterate tasks in the order the caller fetched them and
//! are pure functions from slice to bytes; fetching the list (and mapping a
//! store failure into [`ExportError`]) is the HTTP layer's job.

use printpdf::{BuiltinFont, Mm, PdfDocument};
use rust_xlsxwriter::{Workbook, XlsxError};
use taskdeck_core::Task;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::store::StoreError;

/// Failure during report export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Reading the task list failed.
    #[error("store failure during export: {0}")]
    Store(#[from] StoreError),

    /// Spreadsheet rendering failed.
    #[error("spreadsheet rendering failed: {0}")]
    Spreadsheet(#[from] XlsxError),

    /// PDF rendering failed.
    #[error("document rendering failed: {0}")]
    Document(#[from] printpdf::Error),
}

const HEADERS: [&str; 4] = ["Title", "Type", "Max End Date", "Completed"];
const COLUMN_WIDTHS: [f64; 4] = [30.0, 15.0, 20.0, 10.0];

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

fn format_date(ts: OffsetDateTime) -> String {
    ts.to_offset(time::UtcOffset::UTC)
        .format(DATE_FORMAT)
        .unwrap_or_else(|_| ts.to_string())
}

const fn completed_label(completed: bool) -> &'static str {
    if completed { "Yes" } else { "No" }
}

/// Render the task list as an XLSX workbook with one fixed header row.
///
/// Zero tasks yield a well-formed header-only sheet.
///
/// # Errors
/// Returns [`ExportError::Spreadsheet`] when the workbook cannot be built.
pub fn render_spreadsheet(tasks: &[Task]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Tasks")?;

    for (col, (header, width)) in (0u16..).zip(HEADERS.iter().zip(COLUMN_WIDTHS)) {
        sheet.write_string(0, col, *header)?;
        sheet.set_column_width(col, width)?;
    }

    for (row, task) in (1u32..).zip(tasks) {
        sheet.write_string(row, 0, task.title.as_str())?;
        sheet.write_string(row, 1, task.kind.as_str())?;
        sheet.write_string(row, 2, format_date(task.max_end_date))?;
        sheet.write_string(row, 3, completed_label(task.completed))?;
    }

    Ok(workbook.save_to_buffer()?)
}

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const TITLE_SIZE_PT: f32 = 20.0;
const BODY_SIZE_PT: f32 = 12.0;
const LINE_STEP_MM: f32 = 6.0;
const BLOCK_GAP_MM: f32 = 4.0;

/// Render the task list as an A4 PDF: centered report title, one labeled
/// block per task, a blank gap between blocks, page breaks as needed.
///
/// Zero tasks yield a title-only document.
///
/// # Errors
/// Returns [`ExportError::Document`] when the PDF cannot be assembled.
pub fn render_document(tasks: &[Task]) -> Result<Vec<u8>, ExportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Tasks Report",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "content",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;

    let title = "Tasks Report";
    layer.use_text(title, TITLE_SIZE_PT, Mm(centered_x(title, TITLE_SIZE_PT)), Mm(y), &font);
    y -= 2.0 * LINE_STEP_MM;

    for task in tasks {
        let lines = [
            format!("Title: {}", task.title),
            format!("Type: {}", task.kind),
            format!("Max End Date: {}", format_date(task.max_end_date)),
            format!("Completed: {}", completed_label(task.completed)),
        ];

        let block_height = 4.0 * LINE_STEP_MM + BLOCK_GAP_MM;
        if y - block_height < MARGIN_MM {
            let (page, page_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_HEIGHT_MM - MARGIN_MM;
        }

        for line in &lines {
            layer.use_text(line.as_str(), BODY_SIZE_PT, Mm(MARGIN_MM), Mm(y), &font);
            y -= LINE_STEP_MM;
        }
        y -= BLOCK_GAP_MM;
    }

    Ok(doc.save_to_bytes()?)
}

/// Approximate horizontal centering for the builtin Helvetica face.
fn centered_x(text: &str, font_size_pt: f32) -> f32 {
    const PT_TO_MM: f32 = 0.352_778;
    // Average glyph advance of roughly half an em is close enough for a
    // short report title.
    const AVG_GLYPH_EM: f32 = 0.5;
    #[allow(clippy::cast_precision_loss)]
    let glyphs = text.chars().count() as f32;
    let width_mm = glyphs * font_size_pt * AVG_GLYPH_EM * PT_TO_MM;
    ((PAGE_WIDTH_MM - width_mm) / 2.0).max(MARGIN_MM)
}
