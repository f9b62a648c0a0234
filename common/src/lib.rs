//! Ind AS Mapper Common Library
//!
//! I/O-free core shared by the mapper front ends: the label taxonomy, the
//! prompt contract, the model reply parser and label path validation.

pub mod error;
pub mod export;
pub mod parser;
pub mod prompts;
pub mod taxonomy;
pub mod types;
pub mod validator;

pub use error::{Error, Result};
pub use parser::{parse_reply, ParsedReply};
pub use prompts::{build_system_prompt, build_user_prompt, Prompt};
pub use taxonomy::{LabelCatalog, Taxonomy, TaxonomyNode, PATH_SEPARATOR};
pub use types::{
    ClassificationResult, Context, ExportRecord, OutputRow, Provenance, OUTPUT_COLUMNS, UNKNOWN,
    UNRESOLVED_LABEL,
};
pub use validator::{MatchPolicy, PathValidator};
