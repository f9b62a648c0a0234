//! Reconciliation loop tests
//!
//! Runs whole trial balances through the loop with a scripted model and
//! reviewer against an in-memory mapping database.

mod support;

use indas_mapper::cache::MappingStore;
use indas_mapper::classifier::ClassifierGateway;
use indas_mapper::error::{MapperError, Result};
use indas_mapper::ingest::TrialBalanceRow;
use indas_mapper::reconcile::{Decision, PendingReview, Reconciler, RowStep, SkipReason, Verdict};
use indas_mapper::review::{BatchPolicy, Reviewer};
use indas_mapper_common::{
    ClassificationResult, Context, ExportRecord, LabelCatalog, MatchPolicy, Provenance,
    UNRESOLVED_LABEL,
};
use std::collections::VecDeque;
use support::{reply, ScriptedClient, PPE_PATH, PPE_REPLY};

/// Reviewer answering from a fixed list and remembering what it saw
struct ScriptedReviewer {
    decisions: VecDeque<Decision>,
    seen: Vec<PendingReview>,
}

impl ScriptedReviewer {
    fn new(decisions: &[Decision]) -> Self {
        Self {
            decisions: decisions.iter().copied().collect(),
            seen: Vec::new(),
        }
    }
}

impl Reviewer for ScriptedReviewer {
    fn review(&mut self, pending: &PendingReview) -> Result<Decision> {
        self.seen.push(pending.clone());
        Ok(self.decisions.pop_front().unwrap_or(Decision::Reject))
    }
}

fn reconciler<'a>(
    client: ScriptedClient,
    catalog: &'a LabelCatalog,
    store: &'a MappingStore,
) -> Reconciler<'a, ScriptedClient> {
    Reconciler::new(ClassifierGateway::new(client, catalog, MatchPolicy::Containment), store)
}

fn numbered(mut rows: Vec<TrialBalanceRow>) -> Vec<TrialBalanceRow> {
    for (idx, row) in rows.iter_mut().enumerate() {
        row.row_number = idx + 2;
    }
    rows
}

/// Uncached entry: model call, confirmation, one stored record
#[tokio::test]
async fn test_new_entry_is_classified_and_confirmed() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    let mapper = reconciler(ScriptedClient::replying(&[PPE_REPLY]), &catalog, &store);
    let mut reviewer = ScriptedReviewer::new(&[Decision::Accept]);

    let rows = numbered(vec![TrialBalanceRow::new("Accumulated Depreciation", None, Some("5000"))]);
    let report = mapper.run(&rows, &mut reviewer).await.expect("run");

    assert_eq!(mapper.gateway().client().calls(), 1);
    assert_eq!(reviewer.seen.len(), 1);
    assert_eq!(reviewer.seen[0].result.label_path, PPE_PATH);

    assert_eq!(report.rows.len(), 1);
    let record = ExportRecord::from(&report.rows[0]);
    assert_eq!(record.account_name, "Accumulated Depreciation");
    assert_eq!(record.context, "Debit");
    assert_eq!(record.classification, "Balance Sheet");
    assert_eq!(record.label_path, PPE_PATH);
    assert_eq!(record.source, "OpenAI");
    assert_eq!(record.confirmed, "Yes");

    let history = store.history("Accumulated Depreciation", Context::Debit).expect("history");
    assert_eq!(history.len(), 1);
    assert!(history[0].confirmed);
    assert_eq!(history[0].result.ind_as_reference, "Ind AS 16");
}

/// Reply naming only the leaf: the full taxonomy path is stored and exported
#[tokio::test]
async fn test_partial_label_path_is_resolved() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    let partial = reply("Balance Sheet", "Property, Plant and Equipment");
    let mapper = reconciler(ScriptedClient::replying(&[partial.as_str()]), &catalog, &store);
    let mut reviewer = ScriptedReviewer::new(&[Decision::Accept]);

    let rows = numbered(vec![TrialBalanceRow::new("Accumulated Depreciation", None, Some("1000"))]);
    let report = mapper.run(&rows, &mut reviewer).await.expect("run");

    assert_eq!(mapper.gateway().client().calls(), 1);
    assert_eq!(reviewer.seen[0].result.label_path, PPE_PATH);

    assert_eq!(report.rows.len(), 1);
    let record = ExportRecord::from(&report.rows[0]);
    assert_eq!(record.label_path, PPE_PATH);
    assert_eq!(record.source, "OpenAI");
    assert_eq!(record.confirmed, "Yes");

    let history = store.history("Accumulated Depreciation", Context::Debit).expect("history");
    assert_eq!(history.len(), 1);
    assert!(history[0].confirmed);
    assert_eq!(history[0].result.label_path, PPE_PATH);
}

/// Confirmed entry: reused without a model call or a review
#[tokio::test]
async fn test_cached_entry_skips_model() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    let cached = ClassificationResult {
        classification_type: "Balance Sheet".into(),
        label_path: PPE_PATH.into(),
        reasoning: "earlier run".into(),
        ind_as_reference: "Ind AS 16".into(),
    };
    store
        .record("Accumulated Depreciation", Context::Debit, &cached, true)
        .expect("seed");

    let mapper = reconciler(ScriptedClient::replying(&[]), &catalog, &store);
    let mut reviewer = ScriptedReviewer::new(&[]);

    let rows = numbered(vec![TrialBalanceRow::new("Accumulated Depreciation", None, Some("5000"))]);
    let report = mapper.run(&rows, &mut reviewer).await.expect("run");

    assert_eq!(mapper.gateway().client().calls(), 0);
    assert!(reviewer.seen.is_empty());
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].provenance, Provenance::CacheHit);
    assert_eq!(report.rows[0].provenance.source_label(), "Database");
    assert!(report.rows[0].confirmed);
    assert_eq!(report.rows[0].label_path, PPE_PATH);

    // nothing new written on a hit
    assert_eq!(store.stats().expect("stats").total, 1);
}

/// Context is part of the cache key
#[tokio::test]
async fn test_cache_hit_requires_same_context() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    store
        .record("Suspense", Context::Credit, &ClassificationResult::default(), true)
        .expect("seed");

    let mapper = reconciler(ScriptedClient::replying(&[PPE_REPLY]), &catalog, &store);
    let row = TrialBalanceRow::new("Suspense", None, Some("10"));

    match mapper.check(&row).await.expect("check") {
        RowStep::AwaitingConfirmation(pending) => assert_eq!(pending.context, Context::Debit),
        other => panic!("expected a model classification, got {:?}", other),
    }
}

#[tokio::test]
async fn test_skip_rules() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    let mapper = reconciler(ScriptedClient::replying(&[]), &catalog, &store);
    let mut reviewer = ScriptedReviewer::new(&[]);

    let rows = numbered(vec![
        TrialBalanceRow::new("", Some("100"), None),
        TrialBalanceRow::new("Suspense", None, None),
        TrialBalanceRow::new("Round off", Some("1"), Some("1")),
    ]);
    let report = mapper.run(&rows, &mut reviewer).await.expect("run");

    assert!(report.rows.is_empty());
    assert_eq!(
        report.skipped,
        vec![
            (2, SkipReason::MissingAccountName),
            (3, SkipReason::NoAmount),
            (4, SkipReason::BothSides),
        ]
    );
    assert_eq!(mapper.gateway().client().calls(), 0);
    assert_eq!(store.stats().expect("stats").total, 0);
}

/// Rejections are stored but never reused
#[tokio::test]
async fn test_rejected_entry_is_classified_again() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    let mapper = reconciler(
        ScriptedClient::replying(&[PPE_REPLY, PPE_REPLY]),
        &catalog,
        &store,
    );
    let mut reviewer = ScriptedReviewer::new(&[Decision::Reject, Decision::Accept]);

    let rows = numbered(vec![
        TrialBalanceRow::new("Accumulated Depreciation", None, Some("5000")),
        TrialBalanceRow::new("Accumulated Depreciation", None, Some("7000")),
    ]);
    let report = mapper.run(&rows, &mut reviewer).await.expect("run");

    assert_eq!(mapper.gateway().client().calls(), 2);
    assert_eq!(report.rows.len(), 2);
    assert!(!report.rows[0].confirmed);
    assert_eq!(report.rows[0].confirmed_label(), "No");
    assert!(report.rows[1].confirmed);

    let stats = store.stats().expect("stats");
    assert_eq!((stats.total, stats.confirmed, stats.rejected), (2, 1, 1));
}

/// A confirmed row is reused by a later duplicate in the same run
#[tokio::test]
async fn test_duplicate_row_hits_cache_after_confirmation() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    let mapper = reconciler(ScriptedClient::replying(&[PPE_REPLY]), &catalog, &store);
    let mut reviewer = ScriptedReviewer::new(&[Decision::Accept]);

    let rows = numbered(vec![
        TrialBalanceRow::new("Accumulated Depreciation", None, Some("5000")),
        TrialBalanceRow::new("Accumulated Depreciation", None, Some("7000")),
    ]);
    let report = mapper.run(&rows, &mut reviewer).await.expect("run");

    assert_eq!(mapper.gateway().client().calls(), 1);
    assert_eq!(report.rows[1].provenance, Provenance::CacheHit);
    assert_eq!(report.cache_hits(), 1);
}

#[tokio::test]
async fn test_provider_failure_is_reported_and_run_continues() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    let client = ScriptedClient::new(vec![
        Err("HTTP 503: overloaded".to_string()),
        Ok(reply("Profit & Loss", "I Revenue From operations")),
    ]);
    let mapper = reconciler(client, &catalog, &store);
    let mut reviewer = ScriptedReviewer::new(&[Decision::Accept]);

    let rows = numbered(vec![
        TrialBalanceRow::new("Rent", None, Some("1200")),
        TrialBalanceRow::new("Sales", Some("90000"), None),
    ]);
    let report = mapper.run(&rows, &mut reviewer).await.expect("run");

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].row_number, 2);
    assert_eq!(report.failures[0].account_name, "Rent");
    assert!(report.failures[0].failure.message.contains("503"));

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].account_name, "Sales");
    assert_eq!(report.rows[0].label_path, "Profit & Loss > I Revenue From operations");

    // failed rows leave no record
    assert!(store.history("Rent", Context::Debit).expect("history").is_empty());
}

#[tokio::test]
async fn test_abort_stops_without_recording_pending_row() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    let mapper = reconciler(
        ScriptedClient::replying(&[PPE_REPLY, PPE_REPLY, PPE_REPLY]),
        &catalog,
        &store,
    );
    let mut reviewer = ScriptedReviewer::new(&[Decision::Accept, Decision::Abort]);

    let rows = numbered(vec![
        TrialBalanceRow::new("Accumulated Depreciation", None, Some("5000")),
        TrialBalanceRow::new("Plant", None, Some("80000")),
        TrialBalanceRow::new("Machinery", None, Some("60000")),
    ]);
    let report = mapper.run(&rows, &mut reviewer).await.expect("run");

    assert!(report.aborted);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(mapper.gateway().client().calls(), 2);
    assert_eq!(store.stats().expect("stats").total, 1);
    assert!(store.history("Plant", Context::Debit).expect("history").is_empty());
}

/// Unmatched labels still go to review with the sentinel
#[tokio::test]
async fn test_unresolved_label_goes_to_review() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    let mapper = reconciler(
        ScriptedClient::replying(&[reply("Balance Sheet", "Crypto holdings").as_str()]),
        &catalog,
        &store,
    );
    let mut policy = BatchPolicy::AcceptResolved;

    let rows = numbered(vec![TrialBalanceRow::new("Bitcoin", None, Some("1"))]);
    let report = mapper.run(&rows, &mut policy).await.expect("run");

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].label_path, UNRESOLVED_LABEL);
    assert!(!report.rows[0].confirmed);
    assert_eq!(store.lookup("Bitcoin", Context::Debit).expect("lookup"), None);
}

/// Default batch policy never fills the cache
#[tokio::test]
async fn test_default_batch_policy_records_rejections() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    let mapper = reconciler(ScriptedClient::replying(&[PPE_REPLY]), &catalog, &store);
    let mut policy = BatchPolicy::default();

    let rows = numbered(vec![TrialBalanceRow::new("Accumulated Depreciation", None, Some("5000"))]);
    let report = mapper.run(&rows, &mut policy).await.expect("run");

    assert_eq!(report.rows.len(), 1);
    assert!(!report.rows[0].confirmed);
    assert_eq!(store.stats().expect("stats").rejected, 1);
    assert_eq!(store.lookup("Accumulated Depreciation", Context::Debit).expect("lookup"), None);
}

/// Step API without the driver loop
#[tokio::test]
async fn test_check_then_finalize() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    let mapper = reconciler(ScriptedClient::replying(&[PPE_REPLY]), &catalog, &store);

    let row = TrialBalanceRow::new("Accumulated Depreciation", None, Some("5000"));
    let pending = match mapper.check(&row).await.expect("check") {
        RowStep::AwaitingConfirmation(pending) => pending,
        other => panic!("unexpected step {:?}", other),
    };
    assert_eq!(pending.provider, "OpenAI");

    let output = mapper.finalize(pending, Verdict::Accept).expect("finalize");
    assert_eq!(
        output.provenance,
        Provenance::ModelGenerated { provider: "OpenAI".into() }
    );

    // second check now hits the cache
    assert!(matches!(mapper.check(&row).await.expect("check"), RowStep::Cached(_)));
}

/// Reviewer whose input source is gone
struct ClosedInput;

impl Reviewer for ClosedInput {
    fn review(&mut self, _pending: &PendingReview) -> Result<Decision> {
        Err(MapperError::Review("not a terminal".to_string()))
    }
}

/// A review error stops the run but keeps the rows handled before it
#[tokio::test]
async fn test_review_error_keeps_partial_report() {
    let catalog = LabelCatalog::ind_as();
    let store = MappingStore::open_in_memory().expect("store");
    let cached = ClassificationResult {
        classification_type: "Balance Sheet".into(),
        label_path: PPE_PATH.into(),
        reasoning: "earlier run".into(),
        ind_as_reference: "Ind AS 16".into(),
    };
    store
        .record("Accumulated Depreciation", Context::Debit, &cached, true)
        .expect("seed");

    let mapper = reconciler(ScriptedClient::replying(&[PPE_REPLY]), &catalog, &store);
    let rows = numbered(vec![
        TrialBalanceRow::new("Accumulated Depreciation", None, Some("5000")),
        TrialBalanceRow::new("", None, Some("10")),
        TrialBalanceRow::new("Plant", None, Some("300")),
        TrialBalanceRow::new("Sales", Some("900"), None),
    ]);

    let interrupted = mapper
        .run(&rows, &mut ClosedInput)
        .await
        .expect_err("review error stops the run");

    assert!(matches!(interrupted.error, MapperError::Review(_)));
    assert_eq!(interrupted.report.rows.len(), 1);
    assert_eq!(interrupted.report.rows[0].provenance, Provenance::CacheHit);
    assert_eq!(interrupted.report.skipped, vec![(3, SkipReason::MissingAccountName)]);
    assert!(!interrupted.report.aborted);
    assert!(interrupted.to_string().contains("not a terminal"));

    // the row under review and everything after it untouched
    assert_eq!(mapper.gateway().client().calls(), 1);
    assert!(store.history("Plant", Context::Debit).expect("history").is_empty());
    assert_eq!(store.stats().expect("stats").total, 1);
}
