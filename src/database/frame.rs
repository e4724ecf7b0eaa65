//! Row-to-DataFrame materialization driven by a descriptor's typed columns.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use rusqlite::types::ValueRef;
use rusqlite::Rows;

use crate::error::Result;
use crate::schema::{ColumnKind, DatasetDescriptor};

// 1970-01-01 counted from 0001-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

enum ColumnBuffer {
    Date(Vec<Option<i32>>),
    Timestamp(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Integer(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
}

impl ColumnBuffer {
    fn for_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Date => ColumnBuffer::Date(Vec::new()),
            ColumnKind::Timestamp => ColumnBuffer::Timestamp(Vec::new()),
            ColumnKind::Float => ColumnBuffer::Float(Vec::new()),
            ColumnKind::Integer => ColumnBuffer::Integer(Vec::new()),
            ColumnKind::Text => ColumnBuffer::Text(Vec::new()),
        }
    }

    fn push(&mut self, row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<()> {
        match self {
            ColumnBuffer::Date(values) => {
                let value: Option<NaiveDate> = row.get(idx)?;
                values.push(value.map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE));
            }
            ColumnBuffer::Timestamp(values) => {
                let value: Option<NaiveDateTime> = row.get(idx)?;
                values.push(value.map(|ts| ts.and_utc().timestamp_millis()));
            }
            ColumnBuffer::Float(values) => values.push(row.get(idx)?),
            ColumnBuffer::Integer(values) => match row.get_ref(idx)? {
                // a fractional value turns the whole column into Float64
                ValueRef::Real(value) => {
                    let mut promoted: Vec<Option<f64>> =
                        values.iter().map(|v| v.map(|i| i as f64)).collect();
                    promoted.push(Some(value));
                    *self = ColumnBuffer::Float(promoted);
                }
                _ => values.push(row.get(idx)?),
            },
            ColumnBuffer::Text(values) => values.push(row.get(idx)?),
        }
        Ok(())
    }

    fn into_column(self, name: &str) -> PolarsResult<Column> {
        let name: PlSmallStr = name.into();
        match self {
            ColumnBuffer::Date(values) => Column::new(name, values).cast(&DataType::Date),
            ColumnBuffer::Timestamp(values) => Column::new(name, values)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None)),
            ColumnBuffer::Float(values) => Ok(Column::new(name, values)),
            ColumnBuffer::Integer(values) => Ok(Column::new(name, values)),
            ColumnBuffer::Text(values) => Ok(Column::new(name, values)),
        }
    }
}

/// Drain the rows of a `SELECT` over `descriptor.columns` (in that order)
/// into a DataFrame with one typed column per descriptor column.
pub fn materialize(descriptor: &DatasetDescriptor, mut rows: Rows<'_>) -> Result<DataFrame> {
    let mut buffers: Vec<ColumnBuffer> = descriptor
        .columns
        .iter()
        .map(|c| ColumnBuffer::for_kind(c.kind))
        .collect();

    while let Some(row) = rows.next()? {
        for (idx, buffer) in buffers.iter_mut().enumerate() {
            buffer.push(row, idx)?;
        }
    }

    let columns = descriptor
        .columns
        .iter()
        .zip(buffers)
        .map(|(spec, buffer)| buffer.into_column(spec.name))
        .collect::<PolarsResult<Vec<Column>>>()?;

    Ok(DataFrame::new(columns)?)
}
