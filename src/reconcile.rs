//! Reconciliation loop
//!
//! Drives each trial balance row through cache lookup, classification and
//! review, one row at a time and in input order.
//!
//! ```text
//! check(row) ─┬─ Skipped
//!             ├─ Cached ───────────────────────────────┐
//!             ├─ Failed                                ├─> OutputRow
//!             └─ AwaitingConfirmation ─ finalize(v) ───┘
//! ```

use crate::cache::MappingStore;
use crate::classifier::{ClassifierGateway, ModelClient, ProviderFailure};
use crate::error::{MapperError, Result};
use crate::ingest::TrialBalanceRow;
use crate::review::Reviewer;
use indas_mapper_common::{ClassificationResult, Context, OutputRow, Provenance};
use indicatif::ProgressBar;
use std::fmt;

/// Why a row produced no output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingAccountName,
    /// Neither Credit nor Debit populated
    NoAmount,
    /// Both Credit and Debit populated
    BothSides,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::MissingAccountName => "missing account name",
            SkipReason::NoAmount => "no credit or debit value",
            SkipReason::BothSides => "both credit and debit values",
        };
        f.write_str(text)
    }
}

/// Model classification waiting for a reviewer
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReview {
    pub row_number: usize,
    pub account_name: String,
    pub context: Context,
    pub result: ClassificationResult,
    pub provider: &'static str,
}

/// Row whose model call failed
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    pub row_number: usize,
    pub account_name: String,
    pub context: Context,
    pub failure: ProviderFailure,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowStep {
    Skipped(SkipReason),
    Cached(OutputRow),
    Failed(RowFailure),
    AwaitingConfirmation(PendingReview),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

/// Reviewer answer for a pending row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
    /// Stop the run; the pending row is not recorded
    Abort,
}

impl Decision {
    pub fn verdict(self) -> Option<Verdict> {
        match self {
            Decision::Accept => Some(Verdict::Accept),
            Decision::Reject => Some(Verdict::Reject),
            Decision::Abort => None,
        }
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// One entry per cached or reviewed row, in input order
    pub rows: Vec<OutputRow>,
    /// (row number, reason)
    pub skipped: Vec<(usize, SkipReason)>,
    pub failures: Vec<RowFailure>,
    pub aborted: bool,
}

impl RunReport {
    pub fn cache_hits(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.provenance == Provenance::CacheHit)
            .count()
    }

    pub fn confirmed(&self) -> usize {
        self.rows.iter().filter(|r| r.confirmed).count()
    }
}

/// Run stopped by a storage or review error; holds the rows handled so far
#[derive(Debug, thiserror::Error)]
#[error("run stopped after {} rows: {}", .report.rows.len(), .error)]
pub struct RunInterrupted {
    pub report: RunReport,
    #[source]
    pub error: MapperError,
}

pub struct Reconciler<'a, C> {
    gateway: ClassifierGateway<'a, C>,
    store: &'a MappingStore,
    progress: Option<ProgressBar>,
}

impl<'a, C: ModelClient> Reconciler<'a, C> {
    pub fn new(gateway: ClassifierGateway<'a, C>, store: &'a MappingStore) -> Self {
        Self {
            gateway,
            store,
            progress: None,
        }
    }

    /// Advance `bar` by one per processed row
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    pub fn gateway(&self) -> &ClassifierGateway<'a, C> {
        &self.gateway
    }

    /// Run a row up to its first decision point.
    ///
    /// Only storage errors are returned as `Err`.
    pub async fn check(&self, row: &TrialBalanceRow) -> Result<RowStep> {
        let Some(account) = row.account_name.as_deref() else {
            return Ok(RowStep::Skipped(SkipReason::MissingAccountName));
        };

        let context = match row.context() {
            Some(context) => context,
            None if row.credit.is_some() => return Ok(RowStep::Skipped(SkipReason::BothSides)),
            None => return Ok(RowStep::Skipped(SkipReason::NoAmount)),
        };

        if let Some(result) = self.store.lookup(account, context)? {
            tracing::debug!(account, %context, "cache hit");
            return Ok(RowStep::Cached(OutputRow {
                account_name: account.to_string(),
                context,
                classification_type: result.classification_type,
                label_path: result.label_path,
                provenance: Provenance::CacheHit,
                confirmed: true,
            }));
        }

        match self.gateway.classify(account, context).await {
            Ok(result) => Ok(RowStep::AwaitingConfirmation(PendingReview {
                row_number: row.row_number,
                account_name: account.to_string(),
                context,
                result,
                provider: self.gateway.provider().display_name(),
            })),
            Err(failure) => {
                tracing::warn!(row = row.row_number, account, error = %failure, "classification failed");
                Ok(RowStep::Failed(RowFailure {
                    row_number: row.row_number,
                    account_name: account.to_string(),
                    context,
                    failure,
                }))
            }
        }
    }

    /// Record the reviewer's verdict and build the output row.
    ///
    /// Both verdicts are persisted; only accepted ones are ever reused.
    pub fn finalize(&self, pending: PendingReview, verdict: Verdict) -> Result<OutputRow> {
        let confirmed = verdict == Verdict::Accept;
        self.store
            .record(&pending.account_name, pending.context, &pending.result, confirmed)?;

        Ok(OutputRow {
            account_name: pending.account_name,
            context: pending.context,
            classification_type: pending.result.classification_type,
            label_path: pending.result.label_path,
            provenance: Provenance::ModelGenerated {
                provider: pending.provider.to_string(),
            },
            confirmed,
        })
    }

    pub async fn run<R: Reviewer>(
        &self,
        rows: &[TrialBalanceRow],
        reviewer: &mut R,
    ) -> std::result::Result<RunReport, Box<RunInterrupted>> {
        let mut report = RunReport::default();

        match self.drive(rows, reviewer, &mut report).await {
            Ok(()) => Ok(report),
            Err(error) => {
                tracing::error!(rows = report.rows.len(), %error, "run interrupted");
                Err(Box::new(RunInterrupted { report, error }))
            }
        }
    }

    async fn drive<R: Reviewer>(
        &self,
        rows: &[TrialBalanceRow],
        reviewer: &mut R,
        report: &mut RunReport,
    ) -> Result<()> {
        for row in rows {
            let step = self.check(row).await?;

            match step {
                RowStep::Skipped(reason) => {
                    tracing::debug!(row = row.row_number, %reason, "row skipped");
                    report.skipped.push((row.row_number, reason));
                }
                RowStep::Cached(output) => report.rows.push(output),
                RowStep::Failed(failure) => report.failures.push(failure),
                RowStep::AwaitingConfirmation(pending) => {
                    let Some(verdict) = reviewer.review(&pending)?.verdict() else {
                        tracing::info!(row = row.row_number, "run aborted by reviewer");
                        report.aborted = true;
                        break;
                    };
                    report.rows.push(self.finalize(pending, verdict)?);
                }
            }

            if let Some(bar) = &self.progress {
                bar.inc(1);
            }
        }

        Ok(())
    }
}
