use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::FetchError;

/// Sampling interval of a price table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Granularity {
    #[serde(rename = "minute")]
    Minute,
    #[serde(rename = "5minutes")]
    FiveMinutes,
    #[serde(rename = "15minutes")]
    FifteenMinutes,
    #[serde(rename = "hour")]
    Hour,
    #[default]
    #[serde(rename = "daily")]
    Daily,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Minute,
        Granularity::FiveMinutes,
        Granularity::FifteenMinutes,
        Granularity::Hour,
        Granularity::Daily,
    ];

    /// Keyword used on the command line and in serialized form
    pub fn keyword(&self) -> &'static str {
        match self {
            Granularity::Minute => "minute",
            Granularity::FiveMinutes => "5minutes",
            Granularity::FifteenMinutes => "15minutes",
            Granularity::Hour => "hour",
            Granularity::Daily => "daily",
        }
    }

    pub fn is_intraday(&self) -> bool {
        !matches!(self, Granularity::Daily)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Accepts exactly the five keywords; anything else, including other casings,
/// is an invalid timespan.
impl FromStr for Granularity {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minute" => Ok(Granularity::Minute),
            "5minutes" => Ok(Granularity::FiveMinutes),
            "15minutes" => Ok(Granularity::FifteenMinutes),
            "hour" => Ok(Granularity::Hour),
            "daily" => Ok(Granularity::Daily),
            _ => Err(FetchError::InvalidGranularity(s.to_string())),
        }
    }
}

/// Ordered, de-duplicated set of ticker symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tickers(Vec<String>);

impl Tickers {
    /// Build a ticker set, trimming symbols and dropping blanks and repeats.
    /// Fails when nothing is left.
    pub fn new<I, S>(symbols: I) -> Result<Self, FetchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tickers: Vec<String> = Vec::new();
        for symbol in symbols {
            let symbol = symbol.as_ref().trim();
            if symbol.is_empty() || tickers.iter().any(|t| t == symbol) {
                continue;
            }
            tickers.push(symbol.to_string());
        }

        if tickers.is_empty() {
            return Err(FetchError::NoTickers);
        }
        Ok(Tickers(tickers))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.0.iter().any(|t| t == ticker)
    }
}

impl fmt::Display for Tickers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

impl<'a> IntoIterator for &'a Tickers {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Conversion into a ticker set; a lone symbol becomes a one-element set.
pub trait IntoTickers {
    fn into_tickers(self) -> Result<Tickers, FetchError>;
}

impl IntoTickers for Tickers {
    fn into_tickers(self) -> Result<Tickers, FetchError> {
        Ok(self)
    }
}

impl IntoTickers for &str {
    fn into_tickers(self) -> Result<Tickers, FetchError> {
        Tickers::new([self])
    }
}

impl IntoTickers for String {
    fn into_tickers(self) -> Result<Tickers, FetchError> {
        Tickers::new([self])
    }
}

impl<S: AsRef<str>> IntoTickers for Vec<S> {
    fn into_tickers(self) -> Result<Tickers, FetchError> {
        Tickers::new(self)
    }
}

impl<S: AsRef<str>> IntoTickers for &[S] {
    fn into_tickers(self) -> Result<Tickers, FetchError> {
        Tickers::new(self)
    }
}

impl<S: AsRef<str>, const N: usize> IntoTickers for [S; N] {
    fn into_tickers(self) -> Result<Tickers, FetchError> {
        Tickers::new(self)
    }
}

/// Optional date window, open on either or both ends.
/// Plain dates are taken as midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    /// Full history
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start: start.map(midnight),
            end: end.map(midnight),
        }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn since(start: NaiveDate) -> Self {
        Self::new(Some(start), None)
    }

    pub fn until(end: NaiveDate) -> Self {
        Self::new(None, Some(end))
    }

    pub fn from_timestamps(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (Some(start), Some(end)) => write!(f, "{} to {}", start, end),
            (Some(start), None) => write!(f, "from {}", start),
            (None, Some(end)) => write!(f, "until {}", end),
            (None, None) => f.write_str("full history"),
        }
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Whether tickers are fetched in one query or one query each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    Combined,
    #[default]
    Separated,
}

impl From<bool> for FetchMode {
    fn from(combine: bool) -> Self {
        if combine {
            FetchMode::Combined
        } else {
            FetchMode::Separated
        }
    }
}

/// Result of a retrieval: one table, or one table per ticker
#[derive(Debug, Clone)]
pub enum Fetched {
    Combined(DataFrame),
    Separated(HashMap<String, DataFrame>),
}

impl Fetched {
    pub fn into_combined(self) -> Option<DataFrame> {
        match self {
            Fetched::Combined(df) => Some(df),
            Fetched::Separated(_) => None,
        }
    }

    pub fn into_separated(self) -> Option<HashMap<String, DataFrame>> {
        match self {
            Fetched::Separated(frames) => Some(frames),
            Fetched::Combined(_) => None,
        }
    }

    /// Row count across every table
    pub fn total_rows(&self) -> usize {
        match self {
            Fetched::Combined(df) => df.height(),
            Fetched::Separated(frames) => frames.values().map(|df| df.height()).sum(),
        }
    }
}

/// Configuration for the application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_path: String,
    pub busy_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: "fin_database.db".to_string(),
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Config::default();
        let busy_timeout = match std::env::var("DATABASE_BUSY_TIMEOUT_MS") {
            Ok(raw) => Duration::from_millis(raw.trim().parse().map_err(|_| {
                anyhow::anyhow!("DATABASE_BUSY_TIMEOUT_MS must be a whole number of milliseconds, got '{}'", raw)
            })?),
            Err(_) => defaults.busy_timeout,
        };

        Ok(Config {
            database_path: std::env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            busy_timeout,
        })
    }
}
