use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("File not found: {path}")]
    MissingInputFile { path: String },

    #[error("Error reading files: {0}")]
    InputRead(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type MetricsResult<T> = Result<T, MetricsError>;
