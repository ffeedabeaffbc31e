#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use tradewarehouse::domain::error::DashboardError;
use tradewarehouse::domain::query::QueryParams;
pub use tradewarehouse::domain::table::{ResultTable, Value};
use tradewarehouse::ports::warehouse_port::WarehousePort;

/// Canned warehouse keyed by exact SQL text. Unknown SQL returns an empty
/// table, like a query that matched no rows.
pub struct MockWarehouse {
    pub tables: HashMap<String, ResultTable>,
    pub errors: HashMap<String, String>,
    pub fail_all: Option<String>,
    pub calls: Mutex<Vec<(String, QueryParams)>>,
}

impl MockWarehouse {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
            errors: HashMap::new(),
            fail_all: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_table(mut self, sql: &str, table: ResultTable) -> Self {
        self.tables.insert(sql.to_string(), table);
        self
    }

    pub fn with_error(mut self, sql: &str, reason: &str) -> Self {
        self.errors.insert(sql.to_string(), reason.to_string());
        self
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            fail_all: Some(reason.to_string()),
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, sql: &str) -> Vec<QueryParams> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == sql)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl WarehousePort for MockWarehouse {
    fn query(&self, sql: &str, params: &QueryParams) -> Result<ResultTable, DashboardError> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.clone()));
        if let Some(reason) = self.fail_all.as_ref().or_else(|| self.errors.get(sql)) {
            return Err(DashboardError::DatabaseQuery {
                reason: reason.clone(),
            });
        }
        Ok(self.tables.get(sql).cloned().unwrap_or_else(ResultTable::empty))
    }
}

pub fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> ResultTable {
    ResultTable::new(columns.iter().map(|c| c.to_string()).collect(), rows)
}

pub fn scalar(column: &str, value: Value) -> ResultTable {
    table(&[column], vec![vec![value]])
}

pub fn int(v: i64) -> Value {
    Value::Int(v)
}

pub fn float(v: f64) -> Value {
    Value::Float(v)
}

pub fn text(v: &str) -> Value {
    Value::Text(v.to_string())
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn day(s: &str) -> Value {
    Value::Date(date(s))
}

pub fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
