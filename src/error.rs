use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors surfaced by the fetcher. Nothing is retried or swallowed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid timespan: {0}")]
    InvalidGranularity(String),

    #[error("At least one ticker is required")]
    NoTickers,

    #[error("Failed to open database {path}: {source}")]
    Connection {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Failed to build table: {0}")]
    Frame(#[from] PolarsError),

    #[error("Fetching {ticker} failed: {source}")]
    Ticker {
        ticker: String,
        #[source]
        source: Box<FetchError>,
    },

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl FetchError {
    /// Tag an error with the ticker whose fetch produced it.
    pub fn for_ticker(self, ticker: &str) -> Self {
        FetchError::Ticker {
            ticker: ticker.to_string(),
            source: Box::new(self),
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
