//! Per-account portfolio analytics.

use chrono::NaiveDate;

use super::{column_or_zero, series};
use crate::domain::chart::{Chart, ChartKind};
use crate::domain::dashboard::{Block, Choice, Control, Dashboard, Metric};
use crate::domain::format;
use crate::domain::query::QueryParams;
use crate::domain::sql;
use crate::domain::stats;
use crate::domain::view::{Selection, View};
use crate::ports::warehouse_port::WarehousePort;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 90;
const TOP_HOLDINGS: usize = 10;

pub fn build(port: &dyn WarehousePort, sel: &Selection, today: NaiveDate) -> Dashboard {
    let mut dash = Dashboard::new(View::Portfolio);

    let accounts = dash.fetch(port, sql::ACCOUNTS, &QueryParams::new());
    if accounts.is_empty() {
        dash.info(&["No accounts found in dim_account."]);
        return dash;
    }
    let options = (0..accounts.len())
        .filter_map(|row| {
            let key = accounts.i64_at(row, "account_key")?;
            let name = accounts
                .text_at(row, "account_name")
                .unwrap_or_else(|| key.to_string());
            Some(Choice::new(key.to_string(), name, sel.accounts.contains(&key)))
        })
        .collect();
    dash.controls
        .push(Control::multi_select("account", "Select Accounts", options));

    if sel.accounts.is_empty() {
        dash.info(&["Select one or more accounts to view portfolio analytics."]);
        return dash;
    }

    let (start, end) = sel.date_range(today, DEFAULT_LOOKBACK_DAYS);
    dash.controls
        .push(Control::date("start", "Start Date", start, today));
    dash.controls.push(Control::date("end", "End Date", end, today));

    let by_account = QueryParams::new().with_ints("accounts", &sel.accounts);

    dash.heading("📊 Portfolio Metrics");
    let metrics = dash.fetch(port, sql::PORTFOLIO_METRICS, &by_account);
    dash.push(Block::Metrics(vec![
        Metric::new(
            "Positions",
            format::count(metrics.first_i64("positions").unwrap_or(0)),
        ),
        Metric::new(
            "Total Volume",
            format::money(metrics.first_f64("total_volume").unwrap_or(0.0), 0),
        ),
        Metric::new(
            "Total P&L",
            format::money(metrics.first_f64("total_pnl").unwrap_or(0.0), 0),
        ),
        Metric::new(
            "Avg P&L per Trade",
            format::money(metrics.first_f64("avg_pnl").unwrap_or(0.0), 2),
        ),
    ]));

    dash.heading("📊 Portfolio Composition by Security");
    let composition = dash.fetch(port, sql::PORTFOLIO_COMPOSITION, &by_account);
    if composition.is_empty() {
        dash.info(&["No trades for the selected accounts."]);
    } else {
        let top = composition.head(TOP_HOLDINGS);
        dash.push(Block::Chart(Chart::new(
            "Top 10 Holdings by Value",
            ChartKind::Pie {
                slices: series(&top, "ticker_symbol", "total_value"),
            },
        )));
        dash.push(Block::Chart(
            Chart::bar(
                "P&L by Security (Top 10)",
                series(&top, "ticker_symbol", "total_pnl"),
            )
            .labels("Ticker", "Total P&L ($)"),
        ));
    }

    dash.heading("📈 Portfolio Performance Over Time");
    let timeline = dash.fetch(
        port,
        sql::PORTFOLIO_TIMELINE,
        &by_account
            .clone()
            .with_date("start_date", start)
            .with_date("end_date", end),
    );
    if timeline.is_empty() {
        dash.info(&["No trades in the selected date range."]);
    } else {
        let dates = timeline.text_column("date");
        let cumulative = stats::cumulative_sum(&column_or_zero(&timeline, "daily_pnl"));
        dash.push(Block::Chart(
            Chart::line("Daily Volume", series(&timeline, "date", "daily_volume"))
                .labels("Date", "Volume ($)"),
        ));
        dash.push(Block::Chart(
            Chart::area("Cumulative P&L", dates.into_iter().zip(cumulative).collect())
                .labels("Date", "Cumulative P&L ($)"),
        ));
    }

    dash
}
