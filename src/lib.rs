pub mod data_fetcher;
pub mod database;
pub mod error;
pub mod models;
pub mod schema;
pub mod utils;

pub use data_fetcher::Fetcher;
pub use database::{ConnectionProvider, SqliteProvider};
pub use error::FetchError;
pub use models::{Config, DateRange, FetchMode, Fetched, Granularity, IntoTickers, Tickers};
pub use schema::{DatasetDescriptor, FinDatabaseSchema, SchemaRegistry};
