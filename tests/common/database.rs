//! Fixture databases laid out like the financial database

use anyhow::Result;
use market_data_fetcher::database::ConnectionProvider;
use market_data_fetcher::error::Result as FetchResult;
use market_data_fetcher::SqliteProvider;
use rusqlite::{params, Connection};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SAMPLE_TICKERS: [&str; 3] = ["AAPL", "MSFT", "GOOGL"];

/// Daily bars per ticker, deliberately out of date order
pub const DAILY_DATES: [&str; 5] = [
    "2023-02-01",
    "2023-01-04",
    "2022-12-30",
    "2023-01-31",
    "2023-01-03",
];

/// Hourly bars per ticker, deliberately out of time order
pub const HOURLY_TIMES: [&str; 3] = [
    "2023-01-03 16:00:00",
    "2023-01-03 14:00:00",
    "2023-01-03 15:00:00",
];

const INTRADAY_TABLES: [&str; 4] = [
    "one_minute_stock_data",
    "five_minute_stock_data",
    "fifteen_minute_stock_data",
    "hourly_stock_data",
];

/// A SQLite file in its own temporary directory, removed on drop
pub struct TestDatabase {
    _dir: TempDir,
    path: PathBuf,
}

impl TestDatabase {
    /// Empty database file with no tables
    pub fn empty() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("fin_database.db");
        Connection::open(&path)?;
        Ok(Self { _dir: dir, path })
    }

    /// Database with every table created and no rows
    pub fn with_schema() -> Result<Self> {
        let db = Self::empty()?;
        let conn = db.writer()?;
        create_schema(&conn)?;
        Ok(db)
    }

    /// Database with the schema and the sample rows
    pub fn with_sample_data() -> Result<Self> {
        let db = Self::with_schema()?;
        let conn = db.writer()?;
        insert_sample_prices(&conn)?;
        insert_sample_financials(&conn)?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn provider(&self) -> SqliteProvider {
        SqliteProvider::new(&self.path)
    }

    pub fn counting_provider(&self) -> CountingProvider {
        CountingProvider {
            inner: self.provider(),
            connections: Cell::new(0),
        }
    }

    /// Read-write connection for setting up fixtures
    pub fn writer(&self) -> Result<Connection> {
        Ok(Connection::open(&self.path)?)
    }

    pub fn row_count(&self, table: &str) -> Result<i64> {
        let conn = self.writer()?;
        let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Wraps a provider and counts the connections it hands out
pub struct CountingProvider {
    inner: SqliteProvider,
    connections: Cell<usize>,
}

impl CountingProvider {
    pub fn connections(&self) -> usize {
        self.connections.get()
    }
}

impl ConnectionProvider for CountingProvider {
    fn connect(&self) -> FetchResult<Connection> {
        self.connections.set(self.connections.get() + 1);
        self.inner.connect()
    }
}

pub fn create_schema(conn: &Connection) -> Result<()> {
    for table in INTRADAY_TABLES {
        conn.execute(
            &format!(
                "CREATE TABLE {} (
                    id INTEGER PRIMARY KEY,
                    ticker TEXT NOT NULL,
                    date DATETIME NOT NULL,
                    open REAL,
                    high REAL,
                    low REAL,
                    close REAL,
                    volume INTEGER,
                    vwap REAL,
                    transactions INTEGER
                )",
                table
            ),
            [],
        )?;
    }

    conn.execute(
        "CREATE TABLE daily_stock_data (
            id INTEGER PRIMARY KEY,
            symbol TEXT NOT NULL,
            date DATE NOT NULL,
            open REAL,
            high REAL,
            low REAL,
            close REAL,
            volume INTEGER,
            vwap REAL,
            transactions INTEGER
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE company_financials (
            id INTEGER PRIMARY KEY,
            tickers TEXT NOT NULL,
            cik TEXT,
            company_name TEXT,
            fiscal_year INTEGER,
            fiscal_period TEXT,
            start_date DATE,
            end_date DATE,
            filing_date DATE,
            revenues REAL,
            net_income REAL,
            eps_basic REAL,
            eps_diluted REAL,
            total_assets REAL,
            total_liabilities REAL,
            equity REAL,
            operating_cash_flow REAL
        )",
        [],
    )?;

    Ok(())
}

pub fn insert_daily_bar(conn: &Connection, symbol: &str, date: &str, close: f64) -> Result<()> {
    conn.execute(
        "INSERT INTO daily_stock_data (symbol, date, open, high, low, close, volume, vwap, transactions)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![symbol, date, close - 1.0, close + 1.5, close - 2.0, close, 1_000_000i64, close - 0.25, 12_000i64],
    )?;
    Ok(())
}

pub fn insert_intraday_bar(conn: &Connection, table: &str, ticker: &str, ts: &str, close: f64) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {} (ticker, date, open, high, low, close, volume, vwap, transactions)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            table
        ),
        params![ticker, ts, close - 0.1, close + 0.2, close - 0.3, close, 25_000i64, close, 310i64],
    )?;
    Ok(())
}

pub fn insert_financials(conn: &Connection, tickers: &str, company_name: &str, fiscal_year: i64, revenues: f64) -> Result<()> {
    conn.execute(
        "INSERT INTO company_financials (
            tickers, cik, company_name, fiscal_year, fiscal_period, start_date, end_date, filing_date,
            revenues, net_income, eps_basic, eps_diluted, total_assets, total_liabilities, equity, operating_cash_flow
         ) VALUES (?1, ?2, ?3, ?4, 'FY', ?5, ?6, ?7, ?8, ?9, NULL, NULL, ?10, ?11, ?12, NULL)",
        params![
            tickers,
            format!("{:010}", fiscal_year),
            company_name,
            fiscal_year,
            format!("{}-01-01", fiscal_year),
            format!("{}-12-31", fiscal_year),
            format!("{}-02-15", fiscal_year + 1),
            revenues,
            revenues * 0.2,
            revenues * 3.0,
            revenues * 2.0,
            revenues,
        ],
    )?;
    Ok(())
}

pub fn insert_sample_prices(conn: &Connection) -> Result<()> {
    for (i, ticker) in SAMPLE_TICKERS.iter().enumerate() {
        let base = 100.0 * (i as f64 + 1.0);
        for (j, date) in DAILY_DATES.iter().enumerate() {
            insert_daily_bar(conn, ticker, date, base + j as f64)?;
        }
        for table in INTRADAY_TABLES {
            for (j, ts) in HOURLY_TIMES.iter().enumerate() {
                insert_intraday_bar(conn, table, ticker, ts, base + j as f64)?;
            }
        }
    }
    Ok(())
}

pub fn insert_sample_financials(conn: &Connection) -> Result<()> {
    insert_financials(conn, "AAPL", "Apple Inc.", 2022, 394_328.0)?;
    insert_financials(conn, "MSFT", "Microsoft Corporation", 2022, 198_270.0)?;
    insert_financials(conn, "AAPL,MSFT", "Joint Filing", 2021, 1_000.0)?;
    insert_financials(conn, "GOOGL,GOOG", "Alphabet Inc.", 2022, 282_836.0)?;
    Ok(())
}
