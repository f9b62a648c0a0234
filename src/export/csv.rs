//! CSV output of the result table

use crate::error::Result;
use indas_mapper_common::{ExportRecord, OutputRow, OUTPUT_COLUMNS};
use std::path::Path;

pub fn write_csv(rows: &[OutputRow], output_path: &Path) -> Result<()> {
    // header written up front so an empty table still has its columns
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output_path)?;
    writer.write_record(OUTPUT_COLUMNS)?;

    for row in rows {
        writer.serialize(ExportRecord::from(row))?;
    }

    writer.flush()?;
    Ok(())
}
