//! Price, volume and P&L history of one security.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::chart::Chart;
use crate::domain::dashboard::{Block, Choice, Control, Dashboard, Metric};
use crate::domain::format;
use crate::domain::query::QueryParams;
use crate::domain::sql;
use crate::domain::stats;
use crate::domain::table::ResultTable;
use crate::domain::view::{Selection, View};
use crate::ports::warehouse_port::WarehousePort;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 180;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyTotals {
    pub volume: f64,
    pub quantity: f64,
    pub pnl: f64,
}

/// Sums trade value, quantity and realized P&L per calendar date.
pub fn daily_totals(trades: &ResultTable) -> BTreeMap<NaiveDate, DailyTotals> {
    let mut out: BTreeMap<NaiveDate, DailyTotals> = BTreeMap::new();
    for row in 0..trades.len() {
        let Some(date) = trades
            .date_at(row, "date")
            .or_else(|| trades.date_at(row, "trade_timestamp"))
        else {
            continue;
        };
        let totals = out.entry(date).or_default();
        totals.volume += trades.f64_at(row, "trade_value").unwrap_or(0.0);
        totals.quantity += trades.f64_at(row, "quantity").unwrap_or(0.0);
        totals.pnl += trades.f64_at(row, "realized_pnl").unwrap_or(0.0);
    }
    out
}

pub fn build(port: &dyn WarehousePort, sel: &Selection, today: NaiveDate) -> Dashboard {
    let mut dash = Dashboard::new(View::TimeSeries);
    dash.title = "📈 Time Series Analysis".to_string();

    let securities = dash.fetch(port, sql::TRADED_SECURITIES, &QueryParams::new());
    let listed: Vec<(i64, String, String)> = (0..securities.len())
        .filter_map(|row| {
            Some((
                securities.i64_at(row, "security_key")?,
                securities.text_at(row, "ticker_symbol").unwrap_or_default(),
                securities.text_at(row, "security_name").unwrap_or_default(),
            ))
        })
        .collect();
    let Some(first) = listed.first() else {
        dash.info(&["No securities with trades found."]);
        return dash;
    };

    // An unknown key falls back to the first listed security.
    let (security_key, ticker) = sel
        .security
        .and_then(|key| listed.iter().find(|(k, _, _)| *k == key))
        .map(|(k, t, _)| (*k, t.clone()))
        .unwrap_or_else(|| (first.0, first.1.clone()));

    dash.controls.push(Control::select(
        "security",
        "Select Security",
        listed
            .iter()
            .map(|(k, t, n)| Choice::new(k.to_string(), format!("{t} - {n}"), *k == security_key))
            .collect(),
    ));
    let (start, end) = sel.date_range(today, DEFAULT_LOOKBACK_DAYS);
    dash.controls
        .push(Control::date("start", "Start Date", start, today));
    dash.controls.push(Control::date("end", "End Date", end, today));

    let trades = dash.fetch(
        port,
        sql::SECURITY_TIME_SERIES,
        &QueryParams::new()
            .with_int("security_key", security_key)
            .with_date("start_date", start)
            .with_date("end_date", end),
    );
    if trades.is_empty() {
        dash.info(&["No trades for this security in the selected date range."]);
        return dash;
    }

    dash.heading("💰 Price Over Time");
    let prices = (0..trades.len())
        .filter_map(|row| {
            Some((
                trades.text_at(row, "trade_timestamp")?,
                trades.f64_at(row, "price")?,
            ))
        })
        .collect();
    dash.push(Block::Chart(
        Chart::line(format!("Price Movement: {ticker}"), prices).labels("Time", "Price ($)"),
    ));

    dash.heading("📊 Trading Volume Over Time");
    let daily = daily_totals(&trades);
    let day_label = |d: &NaiveDate| d.format("%Y-%m-%d").to_string();
    dash.push(Block::Chart(
        Chart::bar(
            "Daily Volume",
            daily.iter().map(|(d, t)| (day_label(d), t.volume)).collect(),
        )
        .labels("Date", "Volume ($)"),
    ));
    dash.push(Block::Chart(
        Chart::bar(
            "Daily P&L",
            daily.iter().map(|(d, t)| (day_label(d), t.pnl)).collect(),
        )
        .labels("Date", "P&L ($)"),
    ));

    let price_values = trades.f64_column("price");
    dash.push(Block::Metrics(vec![
        Metric::new(
            "Avg Price",
            format::money(stats::mean(&price_values).unwrap_or(0.0), 2),
        ),
        Metric::new(
            "Total Volume",
            format::money(stats::sum(&trades.f64_column("trade_value")), 0),
        ),
        Metric::new(
            "Total P&L",
            format::money(stats::sum(&trades.f64_column("realized_pnl")), 0),
        ),
        Metric::new("Trade Count", format::count(trades.len() as i64)),
    ]));

    dash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Value;

    #[test]
    fn daily_totals_group_by_date() {
        let d1 = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        let trades = ResultTable::new(
            vec![
                "date".into(),
                "trade_value".into(),
                "quantity".into(),
                "realized_pnl".into(),
            ],
            vec![
                vec![Value::Date(d1), Value::Float(100.0), Value::Int(10), Value::Float(5.0)],
                vec![Value::Date(d2), Value::Float(50.0), Value::Int(5), Value::Null],
                vec![Value::Date(d1), Value::Float(25.0), Value::Int(1), Value::Float(-2.0)],
            ],
        );
        let totals = daily_totals(&trades);
        assert_eq!(totals.len(), 2);
        assert_eq!(
            totals[&d1],
            DailyTotals {
                volume: 125.0,
                quantity: 11.0,
                pnl: 3.0
            }
        );
        assert_eq!(totals[&d2].pnl, 0.0);
    }
}
