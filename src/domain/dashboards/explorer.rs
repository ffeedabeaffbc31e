//! Preset queries and guarded free-text SQL.

use chrono::NaiveDate;

use crate::domain::dashboard::{Block, Choice, Control, Dashboard, NoticeLevel, TableBlock};
use crate::domain::error::DashboardError;
use crate::domain::format::ColumnFormat;
use crate::domain::query::{clamp_limit, is_select_statement, QueryParams};
use crate::domain::sql;
use crate::domain::table::ResultTable;
use crate::domain::view::{ExplorerQuery, Selection, View};
use crate::ports::warehouse_port::WarehousePort;

pub const SELECT_ONLY: &str = "Only SELECT queries are allowed for security reasons.";
pub const CUSTOM_SQL_CAUTION: &str =
    "⚠️ Be careful with custom SQL queries. Only SELECT statements are recommended.";

/// Runs free-text SQL after the SELECT guard. Errors propagate to the caller.
pub fn run_select(port: &dyn WarehousePort, text: &str) -> Result<ResultTable, DashboardError> {
    if !is_select_statement(text) {
        return Err(DashboardError::Rejected {
            reason: SELECT_ONLY.to_string(),
        });
    }
    port.query(text, &QueryParams::new())
}

fn show(dash: &mut Dashboard, table: &ResultTable, formats: &[(&str, ColumnFormat)]) {
    if table.is_empty() {
        dash.info(&["The query returned no rows."]);
    } else {
        dash.push(Block::Table(TableBlock::from_table(table, formats)));
    }
}

pub fn build(port: &dyn WarehousePort, sel: &Selection, _today: NaiveDate) -> Dashboard {
    let mut dash = Dashboard::new(View::Explorer);
    let query = sel.query_type.unwrap_or(ExplorerQuery::RecentTrades);
    dash.controls.push(Control::select(
        "query_type",
        "Select Query Type",
        ExplorerQuery::ALL
            .iter()
            .map(|q| Choice::new(q.key(), q.label(), *q == query))
            .collect(),
    ));
    dash.heading("📝 Custom Query Builder");

    match query {
        ExplorerQuery::RecentTrades => {
            let limit = clamp_limit(sel.limit, 10, 1000, 100);
            dash.controls
                .push(Control::range("limit", "Number of rows", 10, 1000, limit));
            let table = dash.fetch(
                port,
                sql::RECENT_TRADES,
                &QueryParams::new().with_int("limit", limit),
            );
            show(&mut dash, &table, &[]);
        }
        ExplorerQuery::TopSecurities => {
            let limit = clamp_limit(sel.limit, 10, 100, 20);
            dash.controls
                .push(Control::range("limit", "Number of securities", 10, 100, limit));
            let table = dash.fetch(
                port,
                sql::TOP_SECURITIES,
                &QueryParams::new().with_int("limit", limit),
            );
            show(
                &mut dash,
                &table,
                &[
                    ("total_volume", ColumnFormat::Money0),
                    ("avg_price", ColumnFormat::Money2),
                    ("total_pnl", ColumnFormat::Money2),
                ],
            );
        }
        ExplorerQuery::AccountSummary => {
            let table = dash.fetch(port, sql::ACCOUNT_SUMMARY, &QueryParams::new());
            show(
                &mut dash,
                &table,
                &[
                    ("total_volume", ColumnFormat::Money0),
                    ("total_pnl", ColumnFormat::Money2),
                    ("avg_pnl", ColumnFormat::Money2),
                ],
            );
        }
        ExplorerQuery::TraderActivity => {
            let table = dash.fetch(port, sql::TRADER_ACTIVITY, &QueryParams::new());
            show(
                &mut dash,
                &table,
                &[
                    ("total_volume", ColumnFormat::Money0),
                    ("total_pnl", ColumnFormat::Money2),
                ],
            );
        }
        ExplorerQuery::CustomSql => {
            dash.notice(NoticeLevel::Warning, CUSTOM_SQL_CAUTION);
            let text = sel.sql.clone().unwrap_or_default();
            dash.controls
                .push(Control::text_area("sql", "Enter SQL Query", &text));
            if sel.execute {
                if is_select_statement(&text) {
                    let table = dash.fetch(port, &text, &QueryParams::new());
                    show(&mut dash, &table, &[]);
                } else {
                    tracing::info!("rejected non-SELECT custom query");
                    dash.notice(NoticeLevel::Error, SELECT_ONLY);
                }
            }
        }
    }

    dash
}
