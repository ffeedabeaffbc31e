//! Warehouse SQL used by the view builders.
//!
//! Placeholders are `:name` and bound through `query::bind_named`. Columns read
//! from `information_schema` are cast to plain `text`/`int` so the adapter can
//! decode them without domain-type support.

pub const TOTAL_TRADES: &str = "SELECT COUNT(*) AS count FROM fact_trades";

pub const TOTAL_TRADE_VALUE: &str = "SELECT SUM(trade_value) AS total FROM fact_trades";

pub const UNIQUE_SECURITIES: &str =
    "SELECT COUNT(DISTINCT security_key) AS count FROM fact_trades";

pub const TOTAL_REALIZED_PNL: &str =
    "SELECT SUM(realized_pnl) AS total FROM fact_trades WHERE realized_pnl IS NOT NULL";

pub const DAILY_ACTIVITY: &str = "\
SELECT
    d.date,
    COUNT(*) AS trade_count,
    SUM(ft.trade_value) AS daily_volume,
    SUM(ft.realized_pnl) AS daily_pnl
FROM fact_trades ft
JOIN dim_date d ON ft.date_key = d.date_key
WHERE d.date >= :since::date
GROUP BY d.date
ORDER BY d.date";

pub const TOP_SECURITIES_BY_VOLUME: &str = "\
SELECT
    s.ticker_symbol,
    s.security_name,
    COUNT(*) AS trade_count,
    SUM(ft.trade_value) AS total_volume,
    AVG(ft.price) AS avg_price
FROM fact_trades ft
JOIN dim_security s ON ft.security_key = s.security_key
WHERE s.is_current = TRUE
GROUP BY s.ticker_symbol, s.security_name
ORDER BY total_volume DESC
LIMIT 10";

pub const ACCOUNTS: &str = "\
SELECT account_key, account_name, account_type
FROM dim_account
ORDER BY account_name";

pub const PORTFOLIO_METRICS: &str = "\
SELECT
    COUNT(DISTINCT ft.security_key) AS positions,
    SUM(ft.trade_value) AS total_volume,
    SUM(ft.realized_pnl) AS total_pnl,
    AVG(ft.realized_pnl) AS avg_pnl
FROM fact_trades ft
WHERE ft.account_key = ANY(:accounts::bigint[])";

pub const PORTFOLIO_COMPOSITION: &str = "\
SELECT
    s.ticker_symbol,
    s.security_name,
    SUM(ft.trade_value) AS total_value,
    SUM(ft.realized_pnl) AS total_pnl,
    COUNT(*) AS trade_count
FROM fact_trades ft
JOIN dim_security s ON ft.security_key = s.security_key
WHERE ft.account_key = ANY(:accounts::bigint[])
    AND s.is_current = TRUE
GROUP BY s.ticker_symbol, s.security_name
ORDER BY total_value DESC";

pub const PORTFOLIO_TIMELINE: &str = "\
SELECT
    d.date,
    SUM(ft.trade_value) AS daily_volume,
    SUM(ft.realized_pnl) AS daily_pnl,
    COUNT(*) AS trade_count
FROM fact_trades ft
JOIN dim_date d ON ft.date_key = d.date_key
WHERE ft.account_key = ANY(:accounts::bigint[])
    AND d.date BETWEEN :start_date::date AND :end_date::date
GROUP BY d.date
ORDER BY d.date";

pub const TRADER_PERFORMANCE: &str = "\
SELECT
    trader_key,
    full_name,
    desk_name,
    trading_days,
    total_trades,
    total_volume,
    total_pnl,
    avg_pnl,
    pnl_stddev,
    sharpe_ratio
FROM mv_trader_performance_mtd
ORDER BY total_pnl DESC";

pub const DAILY_PNL: &str = "\
SELECT
    d.date,
    SUM(ft.realized_pnl) AS daily_pnl
FROM fact_trades ft
JOIN dim_date d ON ft.date_key = d.date_key
WHERE ft.realized_pnl IS NOT NULL
GROUP BY d.date
ORDER BY d.date";

pub const ACCOUNT_RISK: &str = "\
SELECT
    a.account_name,
    COUNT(*) AS trade_count,
    SUM(ft.trade_value) AS total_volume,
    SUM(ft.realized_pnl) AS total_pnl,
    STDDEV(ft.realized_pnl) AS pnl_stddev,
    AVG(ft.realized_pnl) AS avg_pnl,
    CASE
        WHEN STDDEV(ft.realized_pnl) > 0
        THEN (AVG(ft.realized_pnl) - 0.03) / STDDEV(ft.realized_pnl)
        ELSE 0
    END AS sharpe_ratio
FROM fact_trades ft
JOIN dim_account a ON ft.account_key = a.account_key
WHERE ft.realized_pnl IS NOT NULL
GROUP BY a.account_key, a.account_name
HAVING COUNT(*) > 10
ORDER BY total_pnl DESC";

pub const TRADED_SECURITIES: &str = "\
SELECT DISTINCT s.security_key, s.ticker_symbol, s.security_name
FROM dim_security s
JOIN fact_trades ft ON s.security_key = ft.security_key
WHERE s.is_current = TRUE
ORDER BY s.ticker_symbol";

pub const SECURITY_TIME_SERIES: &str = "\
SELECT
    d.date,
    ft.trade_timestamp,
    ft.price,
    ft.trade_value,
    ft.quantity,
    ft.realized_pnl
FROM fact_trades ft
JOIN dim_date d ON ft.date_key = d.date_key
WHERE ft.security_key = :security_key::bigint
    AND d.date BETWEEN :start_date::date AND :end_date::date
ORDER BY ft.trade_timestamp";

pub const RECENT_TRADES: &str = "\
SELECT
    ft.trade_timestamp,
    s.ticker_symbol,
    s.security_name,
    t.full_name AS trader,
    a.account_name,
    ft.trade_type,
    ft.quantity,
    ft.price,
    ft.trade_value,
    ft.realized_pnl
FROM fact_trades ft
JOIN dim_security s ON ft.security_key = s.security_key
JOIN dim_trader t ON ft.trader_key = t.trader_key
JOIN dim_account a ON ft.account_key = a.account_key
WHERE s.is_current = TRUE AND t.is_current = TRUE
ORDER BY ft.trade_timestamp DESC
LIMIT :limit::bigint";

pub const TOP_SECURITIES: &str = "\
SELECT
    s.ticker_symbol,
    s.security_name,
    COUNT(*) AS trade_count,
    SUM(ft.trade_value) AS total_volume,
    AVG(ft.price) AS avg_price,
    SUM(ft.realized_pnl) AS total_pnl
FROM fact_trades ft
JOIN dim_security s ON ft.security_key = s.security_key
WHERE s.is_current = TRUE
GROUP BY s.ticker_symbol, s.security_name
ORDER BY total_volume DESC
LIMIT :limit::bigint";

pub const ACCOUNT_SUMMARY: &str = "\
SELECT
    a.account_name,
    a.account_type,
    COUNT(*) AS trade_count,
    SUM(ft.trade_value) AS total_volume,
    SUM(ft.realized_pnl) AS total_pnl,
    AVG(ft.realized_pnl) AS avg_pnl
FROM fact_trades ft
JOIN dim_account a ON ft.account_key = a.account_key
GROUP BY a.account_key, a.account_name, a.account_type
ORDER BY total_volume DESC";

pub const TRADER_ACTIVITY: &str = "\
SELECT
    t.full_name,
    t.desk_name,
    COUNT(*) AS trade_count,
    COUNT(DISTINCT ft.date_key) AS trading_days,
    SUM(ft.trade_value) AS total_volume,
    SUM(ft.realized_pnl) AS total_pnl
FROM fact_trades ft
JOIN dim_trader t ON ft.trader_key = t.trader_key
WHERE t.is_current = TRUE
GROUP BY t.trader_key, t.full_name, t.desk_name
ORDER BY total_pnl DESC";

/// Public tables whose name starts with `:prefix` (`dim_`, `fact_`).
pub const TABLES_WITH_PREFIX: &str = "\
SELECT table_name::text AS table_name
FROM information_schema.tables
WHERE table_schema = 'public'
    AND starts_with(table_name::text, :prefix)
ORDER BY table_name";

pub const BASE_TABLES: &str = "\
SELECT table_name::text AS table_name
FROM information_schema.tables
WHERE table_schema = 'public'
    AND table_type = 'BASE TABLE'
ORDER BY table_name";

pub const COLUMN_METADATA: &str = "\
SELECT
    column_name::text AS column_name,
    data_type::text AS data_type,
    character_maximum_length::int AS character_maximum_length,
    is_nullable::text AS is_nullable,
    column_default::text AS column_default
FROM information_schema.columns
WHERE table_schema = 'public'
    AND table_name::text = :table_name
ORDER BY ordinal_position";

pub const FACT_TRADES_KEY_METRICS: &str = "\
SELECT
    COUNT(*) AS total_trades,
    SUM(trade_value) AS total_volume,
    SUM(realized_pnl) AS total_pnl,
    AVG(trade_value) AS avg_trade_value,
    MIN(trade_timestamp) AS earliest_trade,
    MAX(trade_timestamp) AS latest_trade
FROM fact_trades";

pub const FOREIGN_KEYS: &str = "\
SELECT
    tc.table_name::text AS fact_table,
    kcu.column_name::text AS fact_column,
    ccu.table_name::text AS dimension_table,
    ccu.column_name::text AS dimension_key,
    tc.constraint_name::text AS constraint_name
FROM information_schema.table_constraints AS tc
JOIN information_schema.key_column_usage AS kcu
    ON tc.constraint_name = kcu.constraint_name
JOIN information_schema.constraint_column_usage AS ccu
    ON ccu.constraint_name = tc.constraint_name
WHERE tc.constraint_type = 'FOREIGN KEY'
    AND (tc.table_name::text LIKE 'fact\\_%' OR tc.table_name::text LIKE 'dim\\_%')
ORDER BY tc.table_name, kcu.column_name";

pub const MATERIALIZED_VIEWS: &str = "\
SELECT
    schemaname::text AS schemaname,
    matviewname::text AS matviewname,
    pg_size_pretty(pg_total_relation_size((quote_ident(schemaname) || '.' || quote_ident(matviewname))::regclass)) AS size
FROM pg_matviews
WHERE schemaname = 'public'
ORDER BY matviewname";

pub const COLUMN_DETAILS: &str = "\
SELECT
    c.column_name::text AS column_name,
    c.data_type::text AS data_type,
    c.character_maximum_length::int AS character_maximum_length,
    c.is_nullable::text AS is_nullable,
    CASE
        WHEN pk.column_name IS NOT NULL THEN 'PRIMARY KEY'
        WHEN fk.column_name IS NOT NULL THEN 'FOREIGN KEY'
        ELSE ''
    END AS key_type
FROM information_schema.columns c
LEFT JOIN (
    SELECT DISTINCT ku.column_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage ku
        ON tc.constraint_name = ku.constraint_name
    WHERE tc.table_name::text = :table_name
        AND tc.constraint_type = 'PRIMARY KEY'
) pk ON c.column_name = pk.column_name
LEFT JOIN (
    SELECT DISTINCT ku.column_name
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage ku
        ON tc.constraint_name = ku.constraint_name
    WHERE tc.table_name::text = :table_name
        AND tc.constraint_type = 'FOREIGN KEY'
) fk ON c.column_name = fk.column_name
WHERE c.table_schema = 'public'
    AND c.table_name::text = :table_name
ORDER BY c.ordinal_position";

pub const HEALTH_CHECK: &str = "SELECT 1 AS ok";

/// `SELECT COUNT(*)` over a catalog-checked table.
pub fn row_count(quoted_table: &str) -> String {
    format!("SELECT COUNT(*) AS count FROM {quoted_table}")
}

/// Row count plus on-disk size. `:table_name` is the unquoted name.
pub fn table_stats(quoted_table: &str) -> String {
    format!(
        "SELECT COUNT(*) AS row_count, \
         pg_size_pretty(pg_total_relation_size(quote_ident(:table_name)::regclass)) AS table_size \
         FROM {quoted_table}"
    )
}

pub fn sample_rows(quoted_table: &str) -> String {
    format!("SELECT * FROM {quoted_table} LIMIT :limit::bigint")
}

pub fn all_rows(quoted_table: &str) -> String {
    format!("SELECT * FROM {quoted_table}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{bind_named, QueryParams};
    use chrono::NaiveDate;

    #[test]
    fn account_filters_bind_as_one_array() {
        let params = QueryParams::new().with_ints("accounts", &[1, 2, 3]);
        let bound = bind_named(PORTFOLIO_COMPOSITION, &params).unwrap();
        assert!(bound.sql.contains("ANY($1::bigint[])"));
        assert_eq!(bound.args.len(), 1);
    }

    #[test]
    fn timeline_binds_dates_after_accounts() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let params = QueryParams::new()
            .with_ints("accounts", &[1])
            .with_date("start_date", d)
            .with_date("end_date", d);
        let bound = bind_named(PORTFOLIO_TIMELINE, &params).unwrap();
        assert!(bound.sql.contains("BETWEEN $2::date AND $3::date"));
    }

    #[test]
    fn column_details_reuses_table_name_position() {
        let params = QueryParams::new().with_text("table_name", "dim_trader");
        let bound = bind_named(COLUMN_DETAILS, &params).unwrap();
        assert_eq!(bound.args.len(), 1);
        assert_eq!(bound.sql.matches("$1").count(), 3);
    }

    #[test]
    fn like_patterns_are_not_placeholders() {
        let params = QueryParams::new().with_int("unused", 1);
        let bound = bind_named(FOREIGN_KEYS, &params).unwrap();
        assert!(bound.sql.contains("LIKE 'fact\\_%'"));
        assert!(bound.args.is_empty());
    }

    #[test]
    fn table_helpers_interpolate_quoted_names_only() {
        assert_eq!(row_count("\"dim_date\""), "SELECT COUNT(*) AS count FROM \"dim_date\"");
        assert!(sample_rows("\"dim_date\"").ends_with("LIMIT :limit::bigint"));
    }
}
