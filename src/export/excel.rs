//! Excel output of the result table (CLI)
//!
//! The workbook itself is built by the shared `excel_core`.

use crate::error::{MapperError, Result};
use indas_mapper_common::export::excel_core::generate_results_buffer;
use indas_mapper_common::OutputRow;
use std::path::Path;

pub fn write_excel(rows: &[OutputRow], output_path: &Path) -> Result<()> {
    let buffer = generate_results_buffer(rows)
        .map_err(|e| MapperError::Export(format!("Excel: {}", e)))?;
    std::fs::write(output_path, buffer)?;
    Ok(())
}
