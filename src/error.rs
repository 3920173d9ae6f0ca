use crate::model::Category;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuneError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Empty Pool: {category} needs {required} candidates but only {available} available")]
    EmptyPool {
        category: Category,
        required: usize,
        available: usize,
    },

    #[error("Search Error: {0}")]
    Internal(String),

    #[error("Worker Busy: a search is already running")]
    Busy,
}

pub type RfResult<T> = Result<T, RuneError>;
