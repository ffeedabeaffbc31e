//! Historical Value at Risk and per-account risk/return.

use chrono::NaiveDate;

use super::series;
use crate::domain::chart::{Chart, ChartKind, Marker, ScatterPoint};
use crate::domain::dashboard::{Block, Choice, Control, Dashboard, Metric};
use crate::domain::format;
use crate::domain::query::QueryParams;
use crate::domain::sql;
use crate::domain::stats;
use crate::domain::view::{Selection, View, CONFIDENCE_LEVELS};
use crate::ports::warehouse_port::WarehousePort;

pub const HISTOGRAM_BINS: usize = 50;
const SCATTER_ACCOUNTS: usize = 20;

pub fn build(port: &dyn WarehousePort, sel: &Selection, _today: NaiveDate) -> Dashboard {
    let mut dash = Dashboard::new(View::Risk);
    let level = sel.confidence_level();
    dash.controls.push(Control::select(
        "confidence",
        "Confidence Level",
        CONFIDENCE_LEVELS
            .iter()
            .map(|c| Choice::new(c.to_string(), format!("{c}%"), *c == level))
            .collect(),
    ));

    dash.heading("📊 Value at Risk (VaR) Analysis");
    let daily = dash.fetch(port, sql::DAILY_PNL, &QueryParams::new());
    let values = daily.f64_column("daily_pnl");
    let var = stats::value_at_risk(&values, level).unwrap_or(0.0);
    let var_label = format!("VaR ({level}%)");

    dash.push(Block::Metrics(vec![
        Metric::new(var_label.clone(), format::money(var, 0)),
        Metric::new(
            "Mean Daily P&L",
            format::money(stats::mean(&values).unwrap_or(0.0), 0),
        ),
        Metric::new("Std Dev", format::money(stats::std_dev(&values), 0)),
        Metric::new(
            "Min Daily P&L",
            format::money(stats::min(&values).unwrap_or(0.0), 0),
        ),
    ]));

    if values.is_empty() {
        dash.info(&["No realized P&L recorded yet."]);
    } else {
        dash.heading("📈 Daily P&L Distribution");
        dash.push(Block::Chart(
            Chart::new(
                "Distribution of Daily P&L",
                ChartKind::Histogram {
                    bins: stats::histogram(&values, HISTOGRAM_BINS),
                },
            )
            .labels("Daily P&L ($)", "Frequency")
            .marker(Marker::Vertical {
                x: var,
                label: var_label.clone(),
            }),
        ));

        dash.heading("📊 Daily P&L Time Series");
        dash.push(Block::Chart(
            Chart::area(
                "Daily P&L Over Time with VaR Threshold",
                series(&daily, "date", "daily_pnl"),
            )
            .labels("Date", "Daily P&L ($)")
            .marker(Marker::Horizontal {
                y: var,
                label: var_label,
            }),
        ));
    }

    dash.heading("📊 Portfolio Risk Metrics by Account");
    let accounts = dash
        .fetch(port, sql::ACCOUNT_RISK, &QueryParams::new())
        .head(SCATTER_ACCOUNTS);
    if accounts.is_empty() {
        dash.info(&["No account has more than 10 trades with realized P&L."]);
    } else {
        let points = (0..accounts.len())
            .filter_map(|row| {
                Some(ScatterPoint {
                    x: accounts.f64_at(row, "pnl_stddev")?,
                    y: accounts.f64_at(row, "total_pnl")?,
                    size: accounts.f64_at(row, "total_volume").unwrap_or(1.0),
                    color: accounts.f64_at(row, "sharpe_ratio").unwrap_or(0.0),
                    label: format!(
                        "{} ({} trades)",
                        accounts.text_at(row, "account_name").unwrap_or_default(),
                        accounts.i64_at(row, "trade_count").unwrap_or(0)
                    ),
                })
            })
            .collect();
        dash.push(Block::Chart(
            Chart::new("Risk-Return Profile by Account", ChartKind::Scatter { points })
                .labels("Risk (Std Dev)", "Total P&L ($)"),
        ));
    }

    dash
}
