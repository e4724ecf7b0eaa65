//! Dataset descriptors for the price and fundamentals tables.
//!
//! Every [`Granularity`] maps to exactly one descriptor through an exhaustive
//! `match`, so adding a granularity without a table does not compile.

use chrono::NaiveDateTime;

use crate::models::Granularity;

/// Storage type of a column and the polars dtype it materializes as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `YYYY-MM-DD` text
    Date,
    /// `YYYY-MM-DD HH:MM:SS` text
    Timestamp,
    Float,
    Integer,
    Text,
}

impl ColumnKind {
    /// Render a date bound so it compares correctly against values stored
    /// in a column of this kind.
    pub fn encode_bound(&self, bound: NaiveDateTime) -> String {
        match self {
            ColumnKind::Date => bound.date().format("%Y-%m-%d").to_string(),
            _ => bound.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnKind::Date | ColumnKind::Timestamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn col(name: &'static str, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec { name, kind }
}

/// Table layout the fetcher queries against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetDescriptor {
    pub name: &'static str,
    pub table: &'static str,
    pub ticker_column: &'static str,
    pub date_column: Option<&'static str>,
    pub columns: &'static [ColumnSpec],
}

impl DatasetDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Kind of the date column, if the dataset has one
    pub fn date_kind(&self) -> Option<ColumnKind> {
        self.date_column
            .and_then(|name| self.column(name))
            .map(|c| c.kind)
    }
}

/// Source of dataset descriptors
pub trait SchemaRegistry {
    fn time_series(&self, granularity: Granularity) -> &DatasetDescriptor;
    fn fundamentals(&self) -> &DatasetDescriptor;
}

impl<R: SchemaRegistry + ?Sized> SchemaRegistry for &R {
    fn time_series(&self, granularity: Granularity) -> &DatasetDescriptor {
        (**self).time_series(granularity)
    }

    fn fundamentals(&self) -> &DatasetDescriptor {
        (**self).fundamentals()
    }
}

const INTRADAY_COLUMNS: &[ColumnSpec] = &[
    col("ticker", ColumnKind::Text),
    col("date", ColumnKind::Timestamp),
    col("open", ColumnKind::Float),
    col("high", ColumnKind::Float),
    col("low", ColumnKind::Float),
    col("close", ColumnKind::Float),
    col("volume", ColumnKind::Integer),
    col("vwap", ColumnKind::Float),
    col("transactions", ColumnKind::Integer),
];

const DAILY_COLUMNS: &[ColumnSpec] = &[
    col("symbol", ColumnKind::Text),
    col("date", ColumnKind::Date),
    col("open", ColumnKind::Float),
    col("high", ColumnKind::Float),
    col("low", ColumnKind::Float),
    col("close", ColumnKind::Float),
    col("volume", ColumnKind::Integer),
    col("vwap", ColumnKind::Float),
    col("transactions", ColumnKind::Integer),
];

const FINANCIALS_COLUMNS: &[ColumnSpec] = &[
    col("tickers", ColumnKind::Text),
    col("cik", ColumnKind::Text),
    col("company_name", ColumnKind::Text),
    col("fiscal_year", ColumnKind::Integer),
    col("fiscal_period", ColumnKind::Text),
    col("start_date", ColumnKind::Date),
    col("end_date", ColumnKind::Date),
    col("filing_date", ColumnKind::Date),
    col("revenues", ColumnKind::Float),
    col("net_income", ColumnKind::Float),
    col("eps_basic", ColumnKind::Float),
    col("eps_diluted", ColumnKind::Float),
    col("total_assets", ColumnKind::Float),
    col("total_liabilities", ColumnKind::Float),
    col("equity", ColumnKind::Float),
    col("operating_cash_flow", ColumnKind::Float),
];

pub const ONE_MINUTE_STOCK_DATA: DatasetDescriptor = DatasetDescriptor {
    name: "one_minute_stock_data",
    table: "one_minute_stock_data",
    ticker_column: "ticker",
    date_column: Some("date"),
    columns: INTRADAY_COLUMNS,
};

pub const FIVE_MINUTE_STOCK_DATA: DatasetDescriptor = DatasetDescriptor {
    name: "five_minute_stock_data",
    table: "five_minute_stock_data",
    ticker_column: "ticker",
    date_column: Some("date"),
    columns: INTRADAY_COLUMNS,
};

pub const FIFTEEN_MINUTE_STOCK_DATA: DatasetDescriptor = DatasetDescriptor {
    name: "fifteen_minute_stock_data",
    table: "fifteen_minute_stock_data",
    ticker_column: "ticker",
    date_column: Some("date"),
    columns: INTRADAY_COLUMNS,
};

pub const HOURLY_STOCK_DATA: DatasetDescriptor = DatasetDescriptor {
    name: "hourly_stock_data",
    table: "hourly_stock_data",
    ticker_column: "ticker",
    date_column: Some("date"),
    columns: INTRADAY_COLUMNS,
};

pub const DAILY_STOCK_DATA: DatasetDescriptor = DatasetDescriptor {
    name: "daily_stock_data",
    table: "daily_stock_data",
    ticker_column: "symbol",
    date_column: Some("date"),
    columns: DAILY_COLUMNS,
};

pub const COMPANY_FINANCIALS: DatasetDescriptor = DatasetDescriptor {
    name: "company_financials",
    table: "company_financials",
    ticker_column: "tickers",
    date_column: None,
    columns: FINANCIALS_COLUMNS,
};

/// Built-in layout of the financial database
#[derive(Debug, Clone, Copy, Default)]
pub struct FinDatabaseSchema;

impl SchemaRegistry for FinDatabaseSchema {
    fn time_series(&self, granularity: Granularity) -> &DatasetDescriptor {
        match granularity {
            Granularity::Minute => &ONE_MINUTE_STOCK_DATA,
            Granularity::FiveMinutes => &FIVE_MINUTE_STOCK_DATA,
            Granularity::FifteenMinutes => &FIFTEEN_MINUTE_STOCK_DATA,
            Granularity::Hour => &HOURLY_STOCK_DATA,
            Granularity::Daily => &DAILY_STOCK_DATA,
        }
    }

    fn fundamentals(&self) -> &DatasetDescriptor {
        &COMPANY_FINANCIALS
    }
}
