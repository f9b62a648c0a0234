//! Label path validation
//!
//! Maps the label path text returned by the model back onto an exact entry of
//! the flattened taxonomy, or the unresolved sentinel.

use crate::taxonomy::{LabelCatalog, PATH_SEPARATOR};
use crate::types::UNRESOLVED_LABEL;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How raw label text is matched against the taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// First option (in taxonomy order) that contains the raw text anywhere.
    ///
    /// Tolerates punctuation and partial paths, but a short raw path that is a
    /// substring of an unrelated longer label resolves to that label.
    #[default]
    Containment,
    /// Exact option, or the first option ending in `" > " + raw`.
    Segment,
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "containment" | "contains" => Ok(MatchPolicy::Containment),
            "segment" | "strict" => Ok(MatchPolicy::Segment),
            _ => Err(format!("Unknown match policy: {}. Use containment or segment", s)),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::Containment => write!(f, "containment"),
            MatchPolicy::Segment => write!(f, "segment"),
        }
    }
}

/// Resolves raw label text against a [`LabelCatalog`]
#[derive(Debug, Clone, Copy)]
pub struct PathValidator<'a> {
    catalog: &'a LabelCatalog,
    policy: MatchPolicy,
}

impl<'a> PathValidator<'a> {
    pub fn new(catalog: &'a LabelCatalog, policy: MatchPolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Resolve raw label text to a canonical label path.
    ///
    /// Returns [`UNRESOLVED_LABEL`] when nothing matches. Blank input never
    /// matches.
    ///
    /// # Examples
    /// ```
    /// use indas_mapper_common::{LabelCatalog, MatchPolicy, PathValidator};
    ///
    /// let catalog = LabelCatalog::ind_as();
    /// let validator = PathValidator::new(&catalog, MatchPolicy::Containment);
    /// assert_eq!(
    ///     validator.resolve("(d) Goodwill"),
    ///     "Balance Sheet > ASSETS > (1) Non-current assets > (d) Goodwill"
    /// );
    /// ```
    pub fn resolve(&self, raw: &str) -> &'a str {
        let raw = raw.trim();
        if raw.is_empty() {
            return UNRESOLVED_LABEL;
        }

        let options = self.catalog.options();
        let found = match self.policy {
            MatchPolicy::Containment => options.iter().find(|option| option.contains(raw)),
            MatchPolicy::Segment => {
                if self.catalog.contains(raw) {
                    options.iter().find(|option| option.as_str() == raw)
                } else {
                    let suffix = format!("{}{}", PATH_SEPARATOR, raw);
                    options.iter().find(|option| option.ends_with(&suffix))
                }
            }
        };

        found.map(String::as_str).unwrap_or(UNRESOLVED_LABEL)
    }
}
