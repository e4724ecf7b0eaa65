//! Historical price and fundamentals retrieval.
//!
//! A [`Fetcher`] owns a ticker set and a connection provider. Each retrieval
//! resolves a dataset descriptor, builds one query (combined mode) or one
//! query per ticker (separated mode), and returns freshly built tables.
//! Queries run one after another; every query gets its own connection.

use polars::prelude::DataFrame;
use std::collections::HashMap;
use tracing::{debug, error, info};

use crate::database::{fetch_frame, ConnectionProvider, SelectQuery, TickerFilter};
use crate::error::Result;
use crate::models::{DateRange, FetchMode, Fetched, Granularity, IntoTickers, Tickers};
use crate::schema::{DatasetDescriptor, FinDatabaseSchema, SchemaRegistry};

#[derive(Debug)]
pub struct Fetcher<P, R = FinDatabaseSchema> {
    provider: P,
    registry: R,
    tickers: Tickers,
}

impl<P: ConnectionProvider> Fetcher<P, FinDatabaseSchema> {
    /// Create a fetcher over the built-in database layout
    pub fn new(provider: P, tickers: impl IntoTickers) -> Result<Self> {
        Self::with_registry(provider, tickers, FinDatabaseSchema)
    }
}

impl<P: ConnectionProvider, R: SchemaRegistry> Fetcher<P, R> {
    pub fn with_registry(provider: P, tickers: impl IntoTickers, registry: R) -> Result<Self> {
        Ok(Self {
            provider,
            registry,
            tickers: tickers.into_tickers()?,
        })
    }

    pub fn tickers(&self) -> &Tickers {
        &self.tickers
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetch price bars at `granularity`, filtered to `range` and sorted by date.
    pub fn retrieve_time_series(
        &self,
        granularity: Granularity,
        range: &DateRange,
        mode: FetchMode,
    ) -> Result<Fetched> {
        info!(
            "📊 Fetching stock data for ticker(s) {} with timespan '{}'",
            self.tickers, granularity
        );

        let descriptor = self.registry.time_series(granularity);
        if range.is_unbounded() {
            debug!("No date filter, returning full history");
        } else {
            info!("📅 Applying date filter: {}", range);
        }

        match mode {
            FetchMode::Combined => {
                info!("Combining all tickers into a single table");
                let query = SelectQuery::new(descriptor, TickerFilter::AnyOf(self.tickers.as_slice()))
                    .within(range)
                    .ordered_by_date();
                let df = self.run(descriptor, &query)?;
                info!("✅ Fetched {} rows for {}", df.height(), self.tickers);
                Ok(Fetched::Combined(df))
            }
            FetchMode::Separated => {
                info!("Fetching data separately for each ticker");
                let mut frames = HashMap::with_capacity(self.tickers.len());
                for ticker in &self.tickers {
                    let query = SelectQuery::new(descriptor, TickerFilter::Equals(ticker))
                        .within(range)
                        .ordered_by_date();
                    let df = self
                        .run(descriptor, &query)
                        .map_err(|e| e.for_ticker(ticker))?;
                    info!("✅ Fetched {} rows for {}", df.height(), ticker);
                    frames.insert(ticker.clone(), df);
                }
                Ok(Fetched::Separated(frames))
            }
        }
    }

    /// Like [`Fetcher::retrieve_time_series`], taking the granularity as a
    /// keyword. Unknown keywords fail before any connection is opened.
    pub fn retrieve_time_series_by_name(
        &self,
        granularity: &str,
        range: &DateRange,
        mode: FetchMode,
    ) -> Result<Fetched> {
        let granularity: Granularity = granularity.parse().map_err(|e| {
            error!("❌ {}", e);
            e
        })?;
        self.retrieve_time_series(granularity, range, mode)
    }

    /// Fetch financial statement rows. Separated mode matches any row whose
    /// ticker field mentions the ticker, since a row may list several.
    pub fn retrieve_fundamentals(&self, mode: FetchMode) -> Result<Fetched> {
        let descriptor = self.registry.fundamentals();

        match mode {
            FetchMode::Combined => {
                info!("📊 Getting financial statement data for {}", self.tickers);
                let query = SelectQuery::new(descriptor, TickerFilter::AnyOf(self.tickers.as_slice()));
                let df = self.run(descriptor, &query)?;
                info!("✅ Fetched {} financial rows for {}", df.height(), self.tickers);
                Ok(Fetched::Combined(df))
            }
            FetchMode::Separated => {
                let mut frames = HashMap::with_capacity(self.tickers.len());
                for ticker in &self.tickers {
                    info!("📊 Getting financial statement data for {}", ticker);
                    let query = SelectQuery::new(descriptor, TickerFilter::Contains(ticker));
                    let df = self
                        .run(descriptor, &query)
                        .map_err(|e| e.for_ticker(ticker))?;
                    frames.insert(ticker.clone(), df);
                }
                Ok(Fetched::Separated(frames))
            }
        }
    }

    fn run(&self, descriptor: &DatasetDescriptor, query: &SelectQuery<'_>) -> Result<DataFrame> {
        debug!("Executing query against {}", descriptor.name);
        fetch_frame(&self.provider, query)
    }
}
