use polars::prelude::DataFrame;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::{FetchError, Result};
use crate::models::Config;
use crate::schema::DatasetDescriptor;

pub mod frame;
pub mod query;

pub use query::{SelectQuery, TickerFilter};

/// Hands out one connection per query. The connection is closed when the
/// caller drops it, whether the query succeeded or not.
pub trait ConnectionProvider {
    fn connect(&self) -> Result<Connection>;
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for &P {
    fn connect(&self) -> Result<Connection> {
        (**self).connect()
    }
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for Arc<P> {
    fn connect(&self) -> Result<Connection> {
        (**self).connect()
    }
}

/// Read-only provider over a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteProvider {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: Config::default().busy_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.database_path).with_busy_timeout(config.busy_timeout)
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connection_error(&self, source: rusqlite::Error) -> FetchError {
        FetchError::Connection {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl ConnectionProvider for SqliteProvider {
    fn connect(&self) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;

        let conn = Connection::open_with_flags(&self.path, flags)
            .map_err(|e| self.connection_error(e))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| self.connection_error(e))?;

        debug!("Opened read-only connection to {}", self.path.display());
        Ok(conn)
    }
}

/// Run one query on a fresh connection and materialize the rows
pub fn fetch_frame<P>(provider: &P, query: &SelectQuery<'_>) -> Result<DataFrame>
where
    P: ConnectionProvider + ?Sized,
{
    let (sql, params) = query.render();
    debug!("Executing: {} with {} parameter(s)", sql, params.len());

    let conn = provider.connect()?;
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query(params_from_iter(params.iter()))?;
    let df = frame::materialize(query.descriptor(), rows)?;

    Ok(df)
}

/// Double-quote an identifier for SQLite
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column list of a descriptor, quoted and comma separated
pub fn select_list(descriptor: &DatasetDescriptor) -> String {
    descriptor
        .columns
        .iter()
        .map(|c| quote_identifier(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}
