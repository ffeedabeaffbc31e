//! The seven dashboard views.
//!
//! Each builder takes the warehouse port, the parsed selection and today's
//! date, and returns a fully assembled [`Dashboard`]. Builders never fail:
//! query errors surface as notices (see [`crate::domain::dashboard::fetch`]).

pub mod explorer;
pub mod overview;
pub mod portfolio;
pub mod risk;
pub mod timeseries;
pub mod traders;
pub mod warehouse;

use chrono::NaiveDate;

use crate::domain::dashboard::Dashboard;
use crate::domain::table::ResultTable;
use crate::domain::view::{Selection, View};
use crate::ports::warehouse_port::WarehousePort;

/// Dispatches on the selected view.
pub fn build(view: View, port: &dyn WarehousePort, sel: &Selection, today: NaiveDate) -> Dashboard {
    tracing::debug!(view = view.slug(), "building dashboard");
    match view {
        View::Overview => overview::build(port, sel, today),
        View::Portfolio => portfolio::build(port, sel, today),
        View::Traders => traders::build(port, sel, today),
        View::Risk => risk::build(port, sel, today),
        View::TimeSeries => timeseries::build(port, sel, today),
        View::Explorer => explorer::build(port, sel, today),
        View::Warehouse => warehouse::build(port, sel, today),
    }
}

/// `(label, value)` pairs for charting. Null values plot as zero.
fn series(table: &ResultTable, label: &str, value: &str) -> Vec<(String, f64)> {
    (0..table.len())
        .map(|row| {
            (
                table.text_at(row, label).unwrap_or_default(),
                table.f64_at(row, value).unwrap_or(0.0),
            )
        })
        .collect()
}

/// Every row's value in `column`, nulls as zero, so it lines up with `series`.
fn column_or_zero(table: &ResultTable, column: &str) -> Vec<f64> {
    (0..table.len())
        .map(|row| table.f64_at(row, column).unwrap_or(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Value;

    #[test]
    fn series_keeps_rows_with_null_values() {
        let table = ResultTable::new(
            vec!["date".into(), "daily_pnl".into()],
            vec![
                vec![Value::Text("2024-01-02".into()), Value::Float(5.0)],
                vec![Value::Text("2024-01-03".into()), Value::Null],
            ],
        );
        assert_eq!(
            series(&table, "date", "daily_pnl"),
            vec![("2024-01-02".to_string(), 5.0), ("2024-01-03".to_string(), 0.0)]
        );
        assert_eq!(column_or_zero(&table, "daily_pnl"), vec![5.0, 0.0]);
    }
}
