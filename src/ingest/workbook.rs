use super::{non_blank, ColumnIndex, TrialBalanceRow};
use crate::error::{MapperError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Read the trial balance sheet of a workbook
pub(super) fn read_sheet(path: &Path, sheet: &str) -> Result<Vec<TrialBalanceRow>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| MapperError::Workbook(format!("{}: {}", path.display(), e)))?;

    let sheet_names = workbook.sheet_names();
    if !sheet_names.iter().any(|name| name == sheet) {
        return Err(MapperError::SheetNotFound {
            sheet: sheet.to_string(),
            available: sheet_names.join(", "),
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| MapperError::Workbook(format!("{} [{}]: {}", path.display(), sheet, e)))?;

    // calamine ranges start at the first used cell
    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let mut rows = range.rows();

    let headers: Vec<String> = rows
        .next()
        .map(|cells| cells.iter().map(|c| cell_text(c).unwrap_or_default()).collect())
        .unwrap_or_default();
    let columns = ColumnIndex::locate(&headers, sheet)?;

    let parsed = rows
        .enumerate()
        .map(|(idx, cells)| {
            let cell = |col: usize| cells.get(col).and_then(cell_text);
            TrialBalanceRow {
                row_number: first_row + idx + 2,
                account_name: cell(columns.account),
                credit: cell(columns.credit),
                debit: cell(columns.debit),
            }
        })
        .collect();

    Ok(parsed)
}

/// Text of a cell; empty cells, blank strings and error cells are `None`
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => non_blank(s),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        other => non_blank(&other.to_string()),
    }
}
