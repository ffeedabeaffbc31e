//! In-memory query results.
//!
//! A [`ResultTable`] lives for a single request: it is produced by a
//! warehouse query, summarised into metrics and charts, and dropped.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;

/// A single decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the cell. Text and temporal values are not coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if f.is_finite() => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Calendar date of a date or timestamp cell.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::Timestamp(ts) => Some(ts.date()),
            Value::TimestampTz(ts) => Some(ts.date_naive()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Value::TimestampTz(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S%:z")),
        }
    }
}

/// Column names plus row-major cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// The substitute result used when a query fails.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn f64_at(&self, row: usize, column: &str) -> Option<f64> {
        self.value(row, column).and_then(Value::as_f64)
    }

    pub fn i64_at(&self, row: usize, column: &str) -> Option<i64> {
        self.value(row, column).and_then(Value::as_i64)
    }

    pub fn text_at(&self, row: usize, column: &str) -> Option<String> {
        match self.value(row, column)? {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn date_at(&self, row: usize, column: &str) -> Option<NaiveDate> {
        self.value(row, column).and_then(Value::as_date)
    }

    pub fn first_f64(&self, column: &str) -> Option<f64> {
        self.f64_at(0, column)
    }

    pub fn first_i64(&self, column: &str) -> Option<i64> {
        self.i64_at(0, column)
    }

    /// Non-null numeric values of a column, in row order.
    pub fn f64_column(&self, column: &str) -> Vec<f64> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row.get(idx).and_then(Value::as_f64))
            .collect()
    }

    /// Display strings of a column, nulls rendered empty.
    pub fn text_column(&self, column: &str) -> Vec<String> {
        let Some(idx) = self.column_index(column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .map(|row| row.get(idx).map(Value::to_string).unwrap_or_default())
            .collect()
    }

    pub fn head(&self, n: usize) -> ResultTable {
        ResultTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Index of the row holding the largest numeric value in `column`.
    pub fn argmax(&self, column: &str) -> Option<usize> {
        let idx = self.column_index(column)?;
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.get(idx).and_then(Value::as_f64).map(|v| (i, v)))
            .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((i, v)),
            })
            .map(|(i, _)| i)
    }
}
