use crate::ai_provider::AiProvider;
use crate::review::BatchPolicy;
use clap::{Args, Parser, Subcommand, ValueEnum};
use indas_mapper_common::{Context, MatchPolicy};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "indas-mapper")]
#[command(about = "Map trial balance accounts to Ind AS Schedule III labels", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose diagnostics (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Model provider (openai/claude/codex/gemini)
    #[arg(long, default_value = "openai", global = true)]
    pub ai_provider: AiProvider,
}

/// Options shared by the commands that classify entries
#[derive(Args, Debug, Clone, Default)]
pub struct MappingOptions {
    /// Mapping database (default from config: account_mappings.db)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Replacement taxonomy JSON file
    #[arg(long)]
    pub taxonomy: Option<PathBuf>,

    /// Review without prompting (reject/accept/accept-resolved)
    #[arg(long)]
    pub policy: Option<BatchPolicy>,

    /// Label path matching (containment/segment), overrides config
    #[arg(long)]
    pub label_match: Option<MatchPolicy>,

    /// Write the result table to this file or directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (csv/excel/both)
    #[arg(short, long, default_value = "csv")]
    pub format: ExportFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map every row of a trial balance file
    Map {
        /// Trial balance workbook (.xlsx/.xlsm/.xls/.ods) or .csv
        #[arg(required = true)]
        file: PathBuf,

        /// Sheet name (default from config: TrialBalance)
        #[arg(short, long)]
        sheet: Option<String>,

        #[command(flatten)]
        options: MappingOptions,
    },

    /// Map a single account entry
    Classify {
        /// Account name
        #[arg(required = true)]
        text: String,

        /// Trial balance side (credit/debit)
        #[arg(short, long)]
        context: Context,

        #[command(flatten)]
        options: MappingOptions,
    },

    /// List the label paths of the taxonomy
    Labels {
        /// Replacement taxonomy JSON file
        #[arg(long)]
        taxonomy: Option<PathBuf>,
    },

    /// Inspect the mapping database
    Cache {
        /// Show record counts
        #[arg(long)]
        info: bool,

        /// Show every record for this account name
        #[arg(long, requires = "context")]
        history: Option<String>,

        /// Side used with --history (credit/debit)
        #[arg(short, long)]
        context: Option<Context>,

        /// Mapping database (default from config)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Show or edit the configuration
    Config {
        /// Store the OpenAI API key
        #[arg(long)]
        set_api_key: Option<String>,

        /// Show the configuration
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Csv,
    #[value(alias = "xlsx")]
    Excel,
    Both,
}
