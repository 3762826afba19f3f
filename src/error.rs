use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed table: {0}")]
    Shape(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Unmapped value {value} in column '{column}' at row {row}")]
    UnmappedValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Non-numeric value {value} in column '{column}' at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Column '{0}' has missing values but no observed value to impute from")]
    NothingToImpute(String),

    #[error("Table columns {found:?} do not match destination columns {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Metrics error: {0}")]
    Metrics(String),
}

pub type Result<T> = std::result::Result<T, EtlError>;
