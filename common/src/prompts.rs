//! Prompt generation
//!
//! Prompt contract shared by every model client:
//! - build_system_prompt: closed choice set (every flattened label path)
//! - build_user_prompt: the literal entry plus the four-field reply grammar

use crate::types::Context;

/// Reply field labels, in the order the model must emit them
pub const FIELD_CLASSIFICATION_TYPE: &str = "Classification Type";
pub const FIELD_LABEL_PATH: &str = "Label Path";
pub const FIELD_REASONING: &str = "Reasoning";
pub const FIELD_IND_AS: &str = "Ind AS";

/// System and user instruction for one classification request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(label_options: &[String], text: &str, context: Context) -> Self {
        Self {
            system: build_system_prompt(label_options),
            user: build_user_prompt(text, context),
        }
    }

    /// Both parts joined, for clients without a separate system role
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

/// System instruction embedding the complete label list
///
/// # Arguments
/// * `label_options` - flattened taxonomy, in taxonomy order
pub fn build_system_prompt(label_options: &[String]) -> String {
    let labels = label_options
        .iter()
        .map(|label| format!("- {}", label))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a senior Indian accountant mapping trial balance items to Ind AS labels.
Follow these rules:
1. First determine if the item belongs to the Balance Sheet or the Profit & Loss
2. Select EXACTLY ONE label from this structured list:
{labels}
3. Follow the hierarchy exactly
4. Include the full label path, copied verbatim from the list
5. Provide brief reasoning with the Ind AS reference"#
    )
}

/// User instruction for one account entry
///
/// # Arguments
/// * `text` - account name as it appears in the trial balance
/// * `context` - side of the trial balance the amount sits on
pub fn build_user_prompt(text: &str, context: Context) -> String {
    format!(
        r#"Account Entry:
Text: {text}
Context: {context}

Respond STRICTLY in this format, one field per line, nothing else:
{FIELD_CLASSIFICATION_TYPE}: [Balance Sheet/Profit & Loss]
{FIELD_LABEL_PATH}: [Full hierarchy path]
{FIELD_REASONING}: [Brief explanation]
{FIELD_IND_AS}: [Standard number]"#
    )
}
