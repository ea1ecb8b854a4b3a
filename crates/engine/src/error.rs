use thiserror::Error;

/// Fatal errors during a change-log scan.
///
/// Recoverable events (malformed delta payloads, unparsable timestamps)
/// never appear here; they are logged and skipped inside the scan.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Delta source error: {0}")]
    Source(String),

    #[error("Snapshot has no '{name}' key column")]
    MissingKeyColumn { name: String },

    #[error("Table error: {0}")]
    Table(#[from] sheetlog_table::TableError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
