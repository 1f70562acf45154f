use thiserror::Error;

/// Errors that end a cashback run. None of them yields a partial summary.
#[derive(Error, Debug)]
pub enum CashbackError {
    /// No card profile is registered under the given key
    #[error("Unknown card profile: {0}")]
    Configuration(String),

    /// The decoded input contained no data rows
    #[error("Dataset is empty: no transaction rows found")]
    EmptyDataset,

    /// The first row lacks one or more of the mapped columns
    #[error(
        "Column mismatch: missing {}. Actual headers found: {}",
        .missing.join(", "),
        .found.join(", ")
    )]
    SchemaMismatch {
        missing: Vec<String>,
        found: Vec<String>,
    },

    // ── Row source errors ──────────────────────────────────────────────────────

    /// Decoding the uploaded content failed (detail in the message)
    #[error("Parse failed: {0}")]
    ParseFailed(String),

    /// No row source recognises the content or file name
    #[error("Unsupported file format")]
    UnsupportedFormat,

    /// Reading the file from disk failed
    #[error("Failed to read file content: {0}")]
    ReadContentFailed(#[from] std::io::Error),

    /// The builder was run without content or a file path
    #[error("Content or filepath is required")]
    MissingContentAndFilepath,
}

pub type CashbackResult<T> = Result<T, CashbackError>;
