//! Shared types
//!
//! Types used by every front end:
//! - Context: which side of the trial balance an entry sits on
//! - ClassificationResult: one classification (from the cache or the model)
//! - OutputRow: the per-row result shown to the user and exported

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default value for any reply field the model did not supply
pub const UNKNOWN: &str = "Unknown";

/// Label used when a raw label path matches no taxonomy entry
pub const UNRESOLVED_LABEL: &str = "UNKNOWN LABEL - NEEDS REVIEW";

/// Trial balance side of an account entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Context {
    Credit,
    Debit,
}

impl Context {
    pub fn as_str(&self) -> &'static str {
        match self {
            Context::Credit => "Credit",
            Context::Debit => "Debit",
        }
    }

    /// Derive the context from the presence of a credit and a debit value.
    ///
    /// Exactly one side must be populated; both or neither give `None`.
    pub fn from_sides(has_credit: bool, has_debit: bool) -> Option<Self> {
        match (has_credit, has_debit) {
            (true, false) => Some(Context::Credit),
            (false, true) => Some(Context::Debit),
            _ => None,
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Context {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "credit" | "cr" => Ok(Context::Credit),
            "debit" | "dr" => Ok(Context::Debit),
            _ => Err(format!("Unknown context: {}. Use credit or debit", s)),
        }
    }
}

/// A complete classification of one account entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub classification_type: String,
    pub label_path: String,
    pub reasoning: String,
    pub ind_as_reference: String,
}

impl Default for ClassificationResult {
    fn default() -> Self {
        Self {
            classification_type: UNKNOWN.to_string(),
            label_path: UNRESOLVED_LABEL.to_string(),
            reasoning: UNKNOWN.to_string(),
            ind_as_reference: UNKNOWN.to_string(),
        }
    }
}

impl ClassificationResult {
    /// True when the label path resolved to a taxonomy entry
    pub fn is_resolved(&self) -> bool {
        self.label_path != UNRESOLVED_LABEL
    }
}

/// Where an output row's classification came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Reused from a previously confirmed mapping
    CacheHit,
    /// Fresh model call; `provider` is the display name used in exports
    ModelGenerated { provider: String },
}

impl Provenance {
    /// Value of the `Source` column
    pub fn source_label(&self) -> &str {
        match self {
            Provenance::CacheHit => "Database",
            Provenance::ModelGenerated { provider } => provider,
        }
    }
}

/// Per-row result of a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub account_name: String,
    pub context: Context,
    pub classification_type: String,
    pub label_path: String,
    pub provenance: Provenance,
    pub confirmed: bool,
}

impl OutputRow {
    pub fn confirmed_label(&self) -> &'static str {
        if self.confirmed { "Yes" } else { "No" }
    }
}

/// Column headers of the exported result table, in order
pub const OUTPUT_COLUMNS: [&str; 6] = [
    "Account Name",
    "Context",
    "Classification",
    "Label Path",
    "Source",
    "Confirmed",
];

/// Flat export view of an [`OutputRow`]
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord<'a> {
    #[serde(rename = "Account Name")]
    pub account_name: &'a str,
    #[serde(rename = "Context")]
    pub context: &'static str,
    #[serde(rename = "Classification")]
    pub classification: &'a str,
    #[serde(rename = "Label Path")]
    pub label_path: &'a str,
    #[serde(rename = "Source")]
    pub source: &'a str,
    #[serde(rename = "Confirmed")]
    pub confirmed: &'static str,
}

impl<'a> From<&'a OutputRow> for ExportRecord<'a> {
    fn from(row: &'a OutputRow) -> Self {
        Self {
            account_name: &row.account_name,
            context: row.context.as_str(),
            classification: &row.classification_type,
            label_path: &row.label_path,
            source: row.provenance.source_label(),
            confirmed: row.confirmed_label(),
        }
    }
}

impl ExportRecord<'_> {
    /// Cell values in [`OUTPUT_COLUMNS`] order
    pub fn cells(&self) -> [&str; 6] {
        [
            self.account_name,
            self.context,
            self.classification,
            self.label_path,
            self.source,
            self.confirmed,
        ]
    }
}
