//! Trial balance input
//!
//! Reads the `Account Names` / `Credit` / `Debit` columns from a workbook
//! sheet or a CSV file. Any missing column or unreadable file is fatal for the
//! whole file; individual rows are only judged later by [`TrialBalanceRow::context`].

mod workbook;

use crate::error::{MapperError, Result};
use indas_mapper_common::Context;
use std::path::Path;

pub const COLUMN_ACCOUNT: &str = "Account Names";
pub const COLUMN_CREDIT: &str = "Credit";
pub const COLUMN_DEBIT: &str = "Debit";

const REQUIRED_COLUMNS: [&str; 3] = [COLUMN_ACCOUNT, COLUMN_CREDIT, COLUMN_DEBIT];

/// One data row of the trial balance. Blank cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrialBalanceRow {
    /// 1-based row number in the source (header is row 1)
    pub row_number: usize,
    pub account_name: Option<String>,
    pub credit: Option<String>,
    pub debit: Option<String>,
}

impl TrialBalanceRow {
    pub fn new(account_name: &str, credit: Option<&str>, debit: Option<&str>) -> Self {
        Self {
            row_number: 0,
            account_name: non_blank(account_name),
            credit: credit.and_then(non_blank),
            debit: debit.and_then(non_blank),
        }
    }

    /// Row for an entry typed on the command line; the amount is unknown
    pub fn entry(account_name: &str, context: Context) -> Self {
        let side = Some(String::new());
        let (credit, debit) = match context {
            Context::Credit => (side, None),
            Context::Debit => (None, side),
        };
        Self {
            row_number: 1,
            account_name: non_blank(account_name),
            credit,
            debit,
        }
    }

    /// Side of the trial balance; `None` unless exactly one of credit/debit is set
    pub fn context(&self) -> Option<Context> {
        Context::from_sides(self.credit.is_some(), self.debit.is_some())
    }
}

/// Read a trial balance from `.xlsx`/`.xlsm`/`.xls`/`.ods` (sheet `sheet`) or `.csv`
pub fn read_trial_balance(path: &Path, sheet: &str) -> Result<Vec<TrialBalanceRow>> {
    if !path.exists() {
        return Err(MapperError::FileNotFound(path.display().to_string()));
    }

    let is_csv = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        read_csv(path)
    } else {
        workbook::read_sheet(path, sheet)
    }
}

fn read_csv(path: &Path) -> Result<Vec<TrialBalanceRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let sheet = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let columns = ColumnIndex::locate(&headers, &sheet)?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let cell = |col: usize| record.get(col).and_then(non_blank);
        rows.push(TrialBalanceRow {
            row_number: idx + 2,
            account_name: cell(columns.account),
            credit: cell(columns.credit),
            debit: cell(columns.debit),
        });
    }

    Ok(rows)
}

/// Positions of the required columns in the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    account: usize,
    credit: usize,
    debit: usize,
}

impl ColumnIndex {
    fn locate(headers: &[String], sheet: &str) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| find(name).is_none())
            .collect();

        match (find(COLUMN_ACCOUNT), find(COLUMN_CREDIT), find(COLUMN_DEBIT)) {
            (Some(account), Some(credit), Some(debit)) => Ok(Self { account, credit, debit }),
            _ => Err(MapperError::MissingColumns {
                sheet: sheet.to_string(),
                missing: missing.join(", "),
            }),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
