//! Excel generation (shared)
//!
//! Writes the mapping result table into a single-sheet workbook buffer.

use crate::error::{Error, Result};
use crate::types::{ExportRecord, OutputRow, OUTPUT_COLUMNS};
use rust_xlsxwriter::*;

/// Name of the result sheet
pub const RESULT_SHEET_NAME: &str = "Mapping Results";

/// Column widths, in Excel character units, matching [`OUTPUT_COLUMNS`]
const COLUMN_WIDTHS: [f64; 6] = [36.0, 10.0, 16.0, 90.0, 12.0, 11.0];

/// Generate the result workbook into a buffer
///
/// # Arguments
/// * `rows` - output rows in input order
pub fn generate_results_buffer(rows: &[OutputRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let value_format = Format::new()
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Hair)
        .set_border_color(Color::RGB(0xCCCCCC));

    // unconfirmed rows are highlighted for follow-up review
    let pending_format = value_format
        .clone()
        .set_background_color(Color::RGB(0xFFF4E5));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(RESULT_SHEET_NAME)
        .map_err(|e| Error::Excel(format!("sheet name: {}", e)))?;

    for (col, (title, width)) in OUTPUT_COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        worksheet
            .set_column_width(col, width)
            .map_err(|e| Error::Excel(format!("column width: {}", e)))?;
        worksheet
            .write_string_with_format(0, col, *title, &header_format)
            .map_err(|e| Error::Excel(format!("header: {}", e)))?;
    }
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| Error::Excel(format!("freeze panes: {}", e)))?;

    for (idx, row) in rows.iter().enumerate() {
        let excel_row = (idx + 1) as u32;
        let format = if row.confirmed { &value_format } else { &pending_format };
        let record = ExportRecord::from(row);

        for (col, value) in record.cells().iter().enumerate() {
            worksheet
                .write_string_with_format(excel_row, col as u16, *value, format)
                .map_err(|e| Error::Excel(format!("row {}: {}", excel_row, e)))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| Error::Excel(format!("save: {}", e)))
}
