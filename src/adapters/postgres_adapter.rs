//! PostgreSQL warehouse adapter.
//!
//! Connections come from an r2d2 pool. Every statement runs inside a
//! read-only transaction, so even SQL that slips past the SELECT guard cannot
//! write.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use postgres::types::{FromSql, ToSql, Type};
use postgres::{NoTls, Row};
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::domain::error::DashboardError;
use crate::domain::query::{bind_named, ParamValue, QueryParams};
use crate::domain::settings::DatabaseSettings;
use crate::domain::table::{ResultTable, Value};
use crate::ports::warehouse_port::WarehousePort;

const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(300);

pub struct PostgresWarehouse {
    pool: Pool<PostgresConnectionManager<NoTls>>,
}

impl PostgresWarehouse {
    /// Builds the pool without opening a connection. An unreachable server
    /// shows up as a per-query error instead of failing startup.
    pub fn connect(settings: &DatabaseSettings) -> Result<Self, DashboardError> {
        let mut config: postgres::Config =
            settings
                .url
                .parse()
                .map_err(|e: postgres::Error| DashboardError::ConfigInvalid {
                    section: "database".into(),
                    key: "url".into(),
                    reason: e.to_string(),
                })?;

        config.connect_timeout(settings.connect_timeout);
        let manager = PostgresConnectionManager::new(config, NoTls);
        let pool = Pool::builder()
            .max_size(settings.pool_size)
            .max_lifetime(Some(MAX_CONNECTION_LIFETIME))
            .test_on_check_out(true)
            .connection_timeout(settings.connect_timeout)
            .build_unchecked(manager);

        tracing::info!(
            pool_size = settings.pool_size,
            connect_timeout_secs = settings.connect_timeout.as_secs(),
            "warehouse pool ready"
        );
        Ok(Self { pool })
    }
}

fn query_error(e: postgres::Error) -> DashboardError {
    let reason = match e.as_db_error() {
        Some(db) => db.message().to_string(),
        None => e.to_string(),
    };
    DashboardError::DatabaseQuery { reason }
}

fn to_sql(value: &ParamValue) -> Box<dyn ToSql + Sync> {
    match value {
        ParamValue::Int(i) => Box::new(*i),
        ParamValue::IntList(list) => Box::new(list.clone()),
        ParamValue::Date(d) => Box::new(*d),
        ParamValue::Text(s) => Box::new(s.clone()),
    }
}

/// Raw bytes of any column type, read as UTF-8 with replacement.
struct Lossy(String);

impl<'a> FromSql<'a> for Lossy {
    fn from_sql(
        _ty: &Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        Ok(Lossy(String::from_utf8_lossy(raw).into_owned()))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

fn get<'a, T: FromSql<'a>>(
    row: &'a Row,
    idx: usize,
    wrap: impl FnOnce(T) -> Value,
) -> Result<Value, postgres::Error> {
    Ok(row.try_get::<_, Option<T>>(idx)?.map_or(Value::Null, wrap))
}

fn decode(row: &Row, idx: usize, ty: &Type) -> Result<Value, postgres::Error> {
    if *ty == Type::BOOL {
        get::<bool>(row, idx, Value::Bool)
    } else if *ty == Type::INT2 {
        get::<i16>(row, idx, |v| Value::Int(i64::from(v)))
    } else if *ty == Type::INT4 {
        get::<i32>(row, idx, |v| Value::Int(i64::from(v)))
    } else if *ty == Type::INT8 {
        get::<i64>(row, idx, Value::Int)
    } else if *ty == Type::OID {
        get::<u32>(row, idx, |v| Value::Int(i64::from(v)))
    } else if *ty == Type::FLOAT4 {
        get::<f32>(row, idx, |v| Value::Float(f64::from(v)))
    } else if *ty == Type::FLOAT8 {
        get::<f64>(row, idx, Value::Float)
    } else if *ty == Type::NUMERIC {
        get::<Decimal>(row, idx, |v| {
            v.to_f64().map_or_else(|| Value::Text(v.to_string()), Value::Float)
        })
    } else if *ty == Type::TEXT
        || *ty == Type::VARCHAR
        || *ty == Type::BPCHAR
        || *ty == Type::NAME
        || *ty == Type::UNKNOWN
    {
        get::<String>(row, idx, Value::Text)
    } else if *ty == Type::DATE {
        get::<NaiveDate>(row, idx, Value::Date)
    } else if *ty == Type::TIMESTAMP {
        get::<NaiveDateTime>(row, idx, Value::Timestamp)
    } else if *ty == Type::TIMESTAMPTZ {
        get::<DateTime<Utc>>(row, idx, Value::TimestampTz)
    } else {
        get::<Lossy>(row, idx, |v| Value::Text(v.0))
    }
}

impl WarehousePort for PostgresWarehouse {
    fn query(&self, sql: &str, params: &QueryParams) -> Result<ResultTable, DashboardError> {
        let bound = bind_named(sql, params)?;
        let args: Vec<Box<dyn ToSql + Sync>> = bound.args.iter().map(|v| to_sql(v)).collect();
        let refs: Vec<&(dyn ToSql + Sync)> = args.iter().map(|b| b.as_ref()).collect();

        let mut conn = self
            .pool
            .get()
            .map_err(|e: r2d2::Error| DashboardError::Database {
                reason: e.to_string(),
            })?;
        let mut tx = conn
            .build_transaction()
            .read_only(true)
            .start()
            .map_err(query_error)?;

        let statement = tx.prepare(&bound.sql).map_err(query_error)?;
        let columns: Vec<String> = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let types: Vec<Type> = statement
            .columns()
            .iter()
            .map(|c| c.type_().clone())
            .collect();

        let rows = tx.query(&statement, &refs).map_err(query_error)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut cells = Vec::with_capacity(types.len());
            for (idx, ty) in types.iter().enumerate() {
                cells.push(decode(row, idx, ty).map_err(query_error)?);
            }
            out.push(cells);
        }
        tx.commit().map_err(query_error)?;

        tracing::debug!(rows = out.len(), args = refs.len(), "warehouse query");
        Ok(ResultTable::new(columns, out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(url: &str) -> DatabaseSettings {
        DatabaseSettings {
            url: url.to_string(),
            pool_size: 2,
            connect_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn connect_rejects_malformed_url() {
        let err = PostgresWarehouse::connect(&settings("postgresql://host:notaport/db"))
            .err()
            .unwrap();
        assert!(matches!(err, DashboardError::ConfigInvalid { key, .. } if key == "url"));
    }

    #[test]
    fn connect_is_lazy() {
        // Nothing listens on port 1; the pool must still build.
        assert!(PostgresWarehouse::connect(&settings("postgresql://reader@127.0.0.1:1/trades")).is_ok());
    }

    #[test]
    fn unbound_parameter_fails_before_checkout() {
        let warehouse =
            PostgresWarehouse::connect(&settings("postgresql://reader@127.0.0.1:1/trades")).unwrap();
        let err = warehouse
            .query("SELECT :missing", &QueryParams::new().with_int("other", 1))
            .unwrap_err();
        assert!(matches!(err, DashboardError::UnboundParameter { .. }));
    }

    #[test]
    fn unreachable_server_fails_within_connect_timeout() {
        let warehouse =
            PostgresWarehouse::connect(&settings("postgresql://reader@127.0.0.1:1/trades")).unwrap();
        let started = std::time::Instant::now();
        let err = warehouse.query("SELECT 1", &QueryParams::new()).unwrap_err();
        assert!(matches!(err, DashboardError::Database { .. }));
        assert!(started.elapsed() < Duration::from_secs(5), "{:?}", started.elapsed());
    }

    #[test]
    fn lossy_accepts_every_type() {
        assert!(<Lossy as FromSql>::accepts(&Type::JSONB));
        assert!(<Lossy as FromSql>::accepts(&Type::UUID));
    }
}
