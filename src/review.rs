//! Human review of model classifications

use crate::error::{MapperError, Result};
use crate::reconcile::{Decision, PendingReview};
use clap::ValueEnum;
use dialoguer::Select;
use indicatif::ProgressBar;
use std::io::IsTerminal;

/// Decides whether a model classification enters the cache
pub trait Reviewer {
    fn review(&mut self, pending: &PendingReview) -> Result<Decision>;
}

/// Non-interactive review rule
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum BatchPolicy {
    /// Record every result as rejected
    #[default]
    Reject,
    /// Accept every result
    Accept,
    /// Accept results with a taxonomy label, reject the rest
    AcceptResolved,
}

impl Reviewer for BatchPolicy {
    fn review(&mut self, pending: &PendingReview) -> Result<Decision> {
        let decision = match self {
            BatchPolicy::Reject => Decision::Reject,
            BatchPolicy::Accept => Decision::Accept,
            BatchPolicy::AcceptResolved if pending.result.is_resolved() => Decision::Accept,
            BatchPolicy::AcceptResolved => Decision::Reject,
        };
        Ok(decision)
    }
}

/// Terminal prompt per row
#[derive(Default)]
pub struct InteractiveReviewer {
    progress: Option<ProgressBar>,
}

impl InteractiveReviewer {
    pub fn new(progress: Option<ProgressBar>) -> Self {
        Self { progress }
    }

    fn ask(pending: &PendingReview) -> Result<Decision> {
        print_pending(pending);

        let choice = Select::new()
            .with_prompt("Is this mapping correct?")
            .items(&["Yes", "No", "Stop"])
            .default(0)
            .interact()
            .map_err(|e| MapperError::Review(e.to_string()))?;

        Ok(match choice {
            0 => Decision::Accept,
            1 => Decision::Reject,
            _ => Decision::Abort,
        })
    }
}

impl Reviewer for InteractiveReviewer {
    fn review(&mut self, pending: &PendingReview) -> Result<Decision> {
        match &self.progress {
            Some(bar) => bar.suspend(|| Self::ask(pending)),
            None => Self::ask(pending),
        }
    }
}

/// Reviewer chosen for a run
pub enum ReviewMode {
    Interactive(InteractiveReviewer),
    Batch(BatchPolicy),
}

impl ReviewMode {
    /// An explicit policy wins. Without one, prompts need a terminal;
    /// unattended runs fall back to the default batch policy.
    pub fn select(policy: Option<BatchPolicy>, attended: bool, progress: Option<ProgressBar>) -> Self {
        match policy {
            Some(policy) => ReviewMode::Batch(policy),
            None if attended => ReviewMode::Interactive(InteractiveReviewer::new(progress)),
            None => {
                let policy = BatchPolicy::default();
                tracing::warn!(?policy, "no terminal for review prompts, using batch policy");
                ReviewMode::Batch(policy)
            }
        }
    }
}

impl Reviewer for ReviewMode {
    fn review(&mut self, pending: &PendingReview) -> Result<Decision> {
        match self {
            ReviewMode::Interactive(reviewer) => reviewer.review(pending),
            ReviewMode::Batch(policy) => policy.review(pending),
        }
    }
}

/// Whether a person can answer prompts (stdin and stderr are terminals)
pub fn terminal_attached() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

fn print_pending(pending: &PendingReview) {
    let result = &pending.result;
    println!();
    println!("Row {}: {} ({})", pending.row_number, pending.account_name, pending.context);
    println!("  Classification: {}", result.classification_type);
    println!("  Label Path:     {}", result.label_path);
    println!("  Reasoning:      {}", result.reasoning);
    println!("  Ind AS:         {}", result.ind_as_reference);
    if !result.is_resolved() {
        println!("  ! label did not match the taxonomy");
    }
}
