//! Model reply parser
//!
//! The model is asked for four labelled lines:
//!
//! ```text
//! Classification Type: Balance Sheet
//! Label Path: Balance Sheet > ASSETS > ...
//! Reasoning: ...
//! Ind AS: Ind AS 16
//! ```
//!
//! Parsing is line oriented and never fails: any field that is missing or
//! empty defaults to `"Unknown"`, so a partially usable reply still produces a
//! reviewable classification.

use crate::prompts::{FIELD_CLASSIFICATION_TYPE, FIELD_IND_AS, FIELD_LABEL_PATH, FIELD_REASONING};
use crate::types::{ClassificationResult, UNKNOWN, UNRESOLVED_LABEL};
use crate::validator::PathValidator;
use regex::Regex;

lazy_static::lazy_static! {
    // optional list bullet / bold markup, a field label, a colon, the value
    static ref FIELD_LINE: Regex = Regex::new(
        r"(?i)^\s*(?:[-*]\s+)?\**\s*(classification type|label path|reasoning|ind as)\s*\**\s*:\**\s*(.*)$"
    ).unwrap();
}

/// Fields of one reply, before label validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub classification_type: String,
    /// Raw label path text as the model wrote it
    pub label_path: String,
    pub reasoning: String,
    pub ind_as_reference: String,
    /// Field labels that were absent or empty
    pub missing: Vec<&'static str>,
}

impl ParsedReply {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Validate the label path and produce the final classification.
    ///
    /// A missing label path resolves to the unresolved sentinel.
    pub fn into_result(self, validator: &PathValidator<'_>) -> ClassificationResult {
        let label_path = if self.missing.contains(&FIELD_LABEL_PATH) {
            UNRESOLVED_LABEL
        } else {
            validator.resolve(&self.label_path)
        };

        ClassificationResult {
            classification_type: self.classification_type,
            label_path: label_path.to_string(),
            reasoning: self.reasoning,
            ind_as_reference: self.ind_as_reference,
        }
    }
}

/// Parse a model reply.
///
/// A line matches a field when, after optional leading whitespace, list bullet
/// or `**` markup, it starts with the field label followed by `:`. The value is
/// the rest of the line. If a field appears more than once, the last one wins.
///
/// # Examples
/// ```
/// use indas_mapper_common::parse_reply;
///
/// let parsed = parse_reply("Classification Type: Profit & Loss\nInd AS: Ind AS 115");
/// assert_eq!(parsed.classification_type, "Profit & Loss");
/// assert_eq!(parsed.reasoning, "Unknown");
/// ```
pub fn parse_reply(reply: &str) -> ParsedReply {
    let mut classification_type = None;
    let mut label_path = None;
    let mut reasoning = None;
    let mut ind_as_reference = None;

    for line in reply.lines() {
        let Some(caps) = FIELD_LINE.captures(line) else {
            continue;
        };

        let value = clean_value(&caps[2]);
        if value.is_empty() {
            continue;
        }

        let slot = match caps[1].to_lowercase().as_str() {
            "classification type" => &mut classification_type,
            "label path" => &mut label_path,
            "reasoning" => &mut reasoning,
            _ => &mut ind_as_reference,
        };
        *slot = Some(value);
    }

    let mut missing = Vec::new();
    let mut take = |value: Option<String>, field: &'static str| {
        value.unwrap_or_else(|| {
            missing.push(field);
            UNKNOWN.to_string()
        })
    };

    let classification_type = take(classification_type, FIELD_CLASSIFICATION_TYPE);
    let label_path = take(label_path, FIELD_LABEL_PATH);
    let reasoning = take(reasoning, FIELD_REASONING);
    let ind_as_reference = take(ind_as_reference, FIELD_IND_AS);

    ParsedReply {
        classification_type,
        label_path,
        reasoning,
        ind_as_reference,
        missing,
    }
}

/// Strip whitespace and wrapping markup (`[..]`, quotes, backticks, `**`)
fn clean_value(raw: &str) -> String {
    let mut value = raw.trim();
    loop {
        let stripped = value
            .strip_prefix('[')
            .and_then(|v| v.strip_suffix(']'))
            .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
            .or_else(|| value.strip_prefix('`').and_then(|v| v.strip_suffix('`')))
            .or_else(|| value.strip_prefix("**").and_then(|v| v.strip_suffix("**")));

        match stripped {
            Some(inner) => value = inner.trim(),
            None => break,
        }
    }
    value.to_string()
}
