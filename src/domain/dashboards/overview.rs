//! Landing page: headline totals, the last 30 days and the top securities.

use chrono::{Duration, NaiveDate};

use super::series;
use crate::domain::chart::Chart;
use crate::domain::dashboard::{Block, Dashboard, Metric};
use crate::domain::format;
use crate::domain::query::QueryParams;
use crate::domain::sql;
use crate::domain::view::{Selection, View};
use crate::ports::warehouse_port::WarehousePort;

pub const ACTIVITY_WINDOW_DAYS: i64 = 30;

pub fn build(port: &dyn WarehousePort, _sel: &Selection, today: NaiveDate) -> Dashboard {
    let mut dash = Dashboard::new(View::Overview);
    dash.title = "Financial Trading Data Warehouse".to_string();
    let none = QueryParams::new();

    dash.heading("📊 Key Metrics");
    let trades = dash
        .fetch(port, sql::TOTAL_TRADES, &none)
        .first_i64("count")
        .unwrap_or(0);
    let value = dash
        .fetch(port, sql::TOTAL_TRADE_VALUE, &none)
        .first_f64("total")
        .unwrap_or(0.0);
    let securities = dash
        .fetch(port, sql::UNIQUE_SECURITIES, &none)
        .first_i64("count")
        .unwrap_or(0);
    let pnl = dash
        .fetch(port, sql::TOTAL_REALIZED_PNL, &none)
        .first_f64("total")
        .unwrap_or(0.0);
    dash.push(Block::Metrics(vec![
        Metric::new("Total Trades", format::count(trades)),
        Metric::new("Total Trade Value", format::money(value, 0)),
        Metric::new("Unique Securities", format::count(securities)),
        Metric::new("Total Realized P&L", format::money(pnl, 0))
            .with_delta(format::millions_delta(pnl)),
    ]));

    dash.heading("📈 Daily Trading Activity (Last 30 Days)");
    let since = today - Duration::days(ACTIVITY_WINDOW_DAYS);
    let daily = dash.fetch(
        port,
        sql::DAILY_ACTIVITY,
        &QueryParams::new().with_date("since", since),
    );
    if daily.is_empty() {
        dash.info(&["No trading activity in the last 30 days."]);
    } else {
        dash.push(Block::Chart(
            Chart::area("Daily Trade Volume", series(&daily, "date", "daily_volume"))
                .labels("Date", "Volume ($)"),
        ));
        dash.push(Block::Chart(
            Chart::area("Daily Realized P&L", series(&daily, "date", "daily_pnl"))
                .labels("Date", "P&L ($)"),
        ));
    }

    dash.heading("🏆 Top 10 Securities by Volume");
    let top = dash.fetch(port, sql::TOP_SECURITIES_BY_VOLUME, &none);
    if top.is_empty() {
        dash.info(&["No securities traded yet."]);
    } else {
        dash.push(Block::Chart(
            Chart::bar(
                "Top 10 Securities by Volume",
                series(&top, "ticker_symbol", "total_volume"),
            )
            .labels("Ticker", "Total Volume ($)"),
        ));
    }

    dash
}
