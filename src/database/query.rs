//! Parameterized SELECT construction against a dataset descriptor.

use rusqlite::types::Value;

use super::{quote_identifier, select_list};
use crate::models::DateRange;
use crate::schema::DatasetDescriptor;

/// How rows are matched against the descriptor's ticker column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerFilter<'a> {
    /// Column value is one of the tickers
    AnyOf(&'a [String]),
    /// Column value equals the ticker
    Equals(&'a str),
    /// Column value contains the ticker anywhere, for delimited ticker lists.
    /// Case-sensitive, like the other filters.
    Contains(&'a str),
}

#[derive(Debug, Clone)]
pub struct SelectQuery<'a> {
    descriptor: &'a DatasetDescriptor,
    tickers: TickerFilter<'a>,
    range: DateRange,
    order_by_date: bool,
}

impl<'a> SelectQuery<'a> {
    pub fn new(descriptor: &'a DatasetDescriptor, tickers: TickerFilter<'a>) -> Self {
        Self {
            descriptor,
            tickers,
            range: DateRange::all(),
            order_by_date: false,
        }
    }

    /// Restrict to a date window. Has no effect on datasets without a date column.
    pub fn within(mut self, range: &DateRange) -> Self {
        self.range = *range;
        self
    }

    /// Sort ascending by the date column, if the dataset has one
    pub fn ordered_by_date(mut self) -> Self {
        self.order_by_date = true;
        self
    }

    pub fn descriptor(&self) -> &'a DatasetDescriptor {
        self.descriptor
    }

    /// SQL text and the values bound to its placeholders, in order
    pub fn render(&self) -> (String, Vec<Value>) {
        let d = self.descriptor;
        let mut params: Vec<Value> = Vec::new();
        let mut predicates: Vec<String> = Vec::new();

        let ticker_column = quote_identifier(d.ticker_column);
        match self.tickers {
            TickerFilter::AnyOf(tickers) if tickers.is_empty() => {
                predicates.push("1 = 0".to_string());
            }
            TickerFilter::AnyOf(tickers) => {
                let placeholders = vec!["?"; tickers.len()].join(", ");
                predicates.push(format!("{} IN ({})", ticker_column, placeholders));
                params.extend(tickers.iter().map(|t| Value::Text(t.clone())));
            }
            TickerFilter::Equals(ticker) => {
                predicates.push(format!("{} = ?", ticker_column));
                params.push(Value::Text(ticker.to_string()));
            }
            TickerFilter::Contains(ticker) => {
                predicates.push(format!("instr({}, ?) > 0", ticker_column));
                params.push(Value::Text(ticker.to_string()));
            }
        }

        if let (Some(date_column), Some(kind)) = (d.date_column, d.date_kind()) {
            let date_column = quote_identifier(date_column);
            if let Some(start) = self.range.start {
                predicates.push(format!("{} >= ?", date_column));
                params.push(Value::Text(kind.encode_bound(start)));
            }
            if let Some(end) = self.range.end {
                predicates.push(format!("{} <= ?", date_column));
                params.push(Value::Text(kind.encode_bound(end)));
            }
        }

        let mut sql = format!(
            "SELECT {} FROM {} WHERE {}",
            select_list(d),
            quote_identifier(d.table),
            predicates.join(" AND ")
        );

        if self.order_by_date {
            if let Some(date_column) = d.date_column {
                sql.push_str(&format!(" ORDER BY {} ASC", quote_identifier(date_column)));
            }
        }

        (sql, params)
    }
}
