use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("OpenAI API key is not set. Set OPENAI_API_KEY or run `indas-mapper config --set-api-key YOUR_KEY`")]
    MissingApiKey,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Sheet '{sheet}' not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[error("Missing required columns in '{sheet}': {missing}")]
    MissingColumns { sheet: String, missing: String },

    #[error("Unreadable input file: {0}")]
    Workbook(String),

    #[error("Model call failed: {0}")]
    ApiCall(String),

    #[error("Mapping database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Review input failed: {0}")]
    Review(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] indas_mapper_common::Error),
}

pub type Result<T> = std::result::Result<T, MapperError>;
