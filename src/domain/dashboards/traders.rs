//! Month-to-date trader performance from `mv_trader_performance_mtd`.

use chrono::NaiveDate;

use super::series;
use crate::domain::chart::{Chart, ChartKind, ScatterPoint};
use crate::domain::dashboard::{Block, Dashboard, Metric, TableBlock};
use crate::domain::format::{self, ColumnFormat};
use crate::domain::query::QueryParams;
use crate::domain::sql;
use crate::domain::table::ResultTable;
use crate::domain::view::{Selection, View};
use crate::ports::warehouse_port::WarehousePort;

const CHART_TRADERS: usize = 20;

fn leader(table: &ResultTable, column: &str, label: &str, value: fn(f64) -> String) -> Metric {
    match table.argmax(column) {
        Some(row) => Metric::new(label, value(table.f64_at(row, column).unwrap_or(0.0)))
            .with_delta(table.text_at(row, "full_name").unwrap_or_default()),
        None => Metric::new(label, value(0.0)),
    }
}

fn risk_return_points(table: &ResultTable) -> Vec<ScatterPoint> {
    (0..table.len())
        .filter_map(|row| {
            Some(ScatterPoint {
                x: table.f64_at(row, "pnl_stddev")?,
                y: table.f64_at(row, "total_pnl")?,
                size: table.f64_at(row, "total_trades").unwrap_or(1.0),
                color: table.f64_at(row, "sharpe_ratio").unwrap_or(0.0),
                label: format!(
                    "{} ({})",
                    table.text_at(row, "full_name").unwrap_or_default(),
                    table.text_at(row, "desk_name").unwrap_or_default()
                ),
            })
        })
        .collect()
}

pub fn build(port: &dyn WarehousePort, _sel: &Selection, _today: NaiveDate) -> Dashboard {
    let mut dash = Dashboard::new(View::Traders);
    dash.title = "👥 Trader Performance Metrics".to_string();

    let perf = dash.fetch(port, sql::TRADER_PERFORMANCE, &QueryParams::new());
    if perf.is_empty() {
        dash.info(&["No trader performance data available. Refresh mv_trader_performance_mtd."]);
        return dash;
    }

    dash.heading("🏆 Top Performers");
    dash.push(Block::Metrics(vec![
        leader(&perf, "total_pnl", "Highest P&L", |v| format::money(v, 0)),
        leader(&perf, "sharpe_ratio", "Best Sharpe Ratio", format::ratio),
        leader(&perf, "total_volume", "Highest Volume", |v| format::money(v, 0)),
    ]));

    let top = perf.head(CHART_TRADERS);
    dash.push(Block::Chart(
        Chart::bar("P&L by Trader", series(&top, "full_name", "total_pnl"))
            .labels("Trader", "Total P&L ($)"),
    ));
    dash.push(Block::Chart(
        Chart::bar(
            "Sharpe Ratio by Trader",
            series(&top, "full_name", "sharpe_ratio"),
        )
        .labels("Trader", "Sharpe Ratio"),
    ));

    dash.heading("Risk-Return Analysis");
    dash.push(Block::Chart(
        Chart::new(
            "Risk vs Return by Trader",
            ChartKind::Scatter {
                points: risk_return_points(&perf),
            },
        )
        .labels("Risk (Std Dev of P&L)", "Total P&L ($)"),
    ));

    dash.push(Block::Table(
        TableBlock::from_table(
            &perf,
            &[
                ("total_volume", ColumnFormat::Money0),
                ("total_pnl", ColumnFormat::Money2),
                ("avg_pnl", ColumnFormat::Money2),
                ("pnl_stddev", ColumnFormat::Money2),
                ("sharpe_ratio", ColumnFormat::Ratio2),
            ],
        )
        .titled("📋 Detailed Performance Table"),
    ));

    dash
}
