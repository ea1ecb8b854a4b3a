use thiserror::Error;

/// Errors that can occur during table operations
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Duplicate column name: {name}")]
    DuplicateColumnName { name: String },

    #[error("Row width mismatch: table has {expected} columns, row has {actual}")]
    RowWidthMismatch { expected: usize, actual: usize },

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TableError>;
