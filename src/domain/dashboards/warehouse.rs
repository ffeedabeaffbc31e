//! Schema introspection: star schema, dimensions, facts, relationships and
//! a table explorer with CSV export.
//!
//! Table names reach SQL only after they have been matched against the
//! catalog listing, and then only through [`quote_ident`].

use chrono::NaiveDate;

use crate::domain::chart::{Chart, ChartKind};
use crate::domain::dashboard::{Block, Choice, Control, Dashboard, Metric, NoticeLevel, TableBlock};
use crate::domain::error::DashboardError;
use crate::domain::format;
use crate::domain::query::{clamp_limit, quote_ident, QueryParams};
use crate::domain::sql;
use crate::domain::table::ResultTable;
use crate::domain::view::{Selection, View, WarehouseTab};
use crate::ports::warehouse_port::WarehousePort;

pub const FACT_TABLE: &str = "fact_trades";
pub const DIMENSIONS: [&str; 8] = [
    "dim_date",
    "dim_time",
    "dim_security",
    "dim_trader",
    "dim_account",
    "dim_exchange",
    "dim_counterparty",
    "dim_strategy",
];
const SCD2_TABLES: [&str; 2] = ["dim_security", "dim_trader"];
const SAMPLE_ROWS: i64 = 10;

/// All public base tables, straight from the catalog.
pub fn base_tables(port: &dyn WarehousePort) -> Result<Vec<String>, DashboardError> {
    Ok(port
        .query(sql::BASE_TABLES, &QueryParams::new())?
        .text_column("table_name"))
}

/// Every row of a catalog-listed base table.
pub fn export_table(port: &dyn WarehousePort, table: &str) -> Result<ResultTable, DashboardError> {
    if !base_tables(port)?.iter().any(|t| t == table) {
        return Err(DashboardError::TableNotFound {
            table: table.to_string(),
        });
    }
    tracing::info!(table, "exporting table");
    port.query(&sql::all_rows(&quote_ident(table)), &QueryParams::new())
}

/// The requested table when the catalog lists it, otherwise the first one.
fn pick_table(dash: &mut Dashboard, listed: &[String], requested: Option<&str>) -> Option<String> {
    let first = listed.first()?;
    match requested {
        Some(name) if listed.iter().any(|t| t == name) => Some(name.to_string()),
        Some(name) => {
            dash.notice(
                NoticeLevel::Warning,
                format!("Table {name:?} is not in the catalog; showing {first}."),
            );
            Some(first.clone())
        }
        None => Some(first.clone()),
    }
}

fn table_choices(listed: &[String], selected: &str) -> Vec<Choice> {
    listed
        .iter()
        .map(|t| Choice::new(t.as_str(), t.as_str(), t == selected))
        .collect()
}

fn show_or_info(dash: &mut Dashboard, table: &ResultTable) {
    if table.is_empty() {
        dash.info(&["No data available in this table."]);
    } else {
        dash.push(Block::Table(TableBlock::from_table(table, &[])));
    }
}

pub fn build(port: &dyn WarehousePort, sel: &Selection, _today: NaiveDate) -> Dashboard {
    let mut dash = Dashboard::new(View::Warehouse);
    let tab = sel.tab.unwrap_or(WarehouseTab::StarSchema);
    dash.tabs = WarehouseTab::ALL
        .iter()
        .map(|t| Choice::new(t.key(), t.label(), *t == tab))
        .collect();
    dash.controls.push(Control::hidden("tab", tab.key()));

    match tab {
        WarehouseTab::StarSchema => star_schema(&mut dash),
        WarehouseTab::Dimensions => table_tab(&mut dash, port, sel, "dim_"),
        WarehouseTab::Facts => table_tab(&mut dash, port, sel, "fact_"),
        WarehouseTab::Relationships => relationships(&mut dash, port),
        WarehouseTab::Tables => table_explorer(&mut dash, port, sel),
    }
    dash
}

fn star_schema(dash: &mut Dashboard) {
    dash.heading("📐 Star Schema Overview");
    dash.push(Block::Text(vec![
        "The Financial Trading Data Warehouse uses a Star Schema design pattern:".into(),
        "1 central fact table: fact_trades (transactional grain).".into(),
        "Multiple dimension tables providing descriptive context for analysis.".into(),
    ]));
    dash.push(Block::Chart(Chart::new(
        "Star Schema Visualization",
        ChartKind::Schema {
            center: FACT_TABLE.to_string(),
            satellites: DIMENSIONS.iter().map(|d| d.to_string()).collect(),
        },
    )));
    dash.heading("Fact Table");
    dash.push(Block::Text(vec![
        "fact_trades: central transactional table.".into(),
        "Grain: one row per executed trade.".into(),
        "Measures: quantity, price, trade_value, commission, realized_pnl.".into(),
        "Partitioned: monthly RANGE partitioning on trade_timestamp.".into(),
    ]));
    dash.heading("Dimension Tables");
    dash.push(Block::Text(vec![
        "Time dimensions: dim_date, dim_time.".into(),
        "Entity dimensions: dim_security, dim_trader, dim_account.".into(),
        "Reference dimensions: dim_exchange, dim_counterparty, dim_strategy.".into(),
        "SCD Type 2: dim_security, dim_trader (temporal tracking).".into(),
    ]));
}

fn table_tab(dash: &mut Dashboard, port: &dyn WarehousePort, sel: &Selection, prefix: &str) {
    let is_fact = prefix == "fact_";
    dash.heading(if is_fact {
        "📈 Fact Tables"
    } else {
        "📊 Dimension Tables"
    });
    let listed = dash
        .fetch(
            port,
            sql::TABLES_WITH_PREFIX,
            &QueryParams::new().with_text("prefix", prefix),
        )
        .text_column("table_name");
    let Some(table) = pick_table(dash, &listed, sel.table.as_deref()) else {
        dash.info(&[if is_fact {
            "No fact tables found."
        } else {
            "No dimension tables found."
        }]);
        return;
    };
    let label = if is_fact {
        "Select Fact Table to Explore"
    } else {
        "Select Dimension Table to Explore"
    };
    dash.controls
        .push(Control::select("table", label, table_choices(&listed, &table)));

    let quoted = quote_ident(&table);
    let by_name = QueryParams::new().with_text("table_name", table.as_str());
    let columns = dash.fetch(port, sql::COLUMN_METADATA, &by_name);
    let rows = dash
        .fetch(port, &sql::row_count(&quoted), &QueryParams::new())
        .first_i64("count")
        .unwrap_or(0);
    dash.push(Block::Metrics(vec![
        Metric::new("Table Name", table.as_str()),
        Metric::new("Row Count", format::count(rows)),
        Metric::new("Columns", format::count(columns.len() as i64)),
    ]));

    dash.heading("Column Information");
    dash.push(Block::Table(TableBlock::from_table(&columns, &[])));

    if table == FACT_TABLE {
        dash.heading("Key Metrics");
        let m = dash.fetch(port, sql::FACT_TRADES_KEY_METRICS, &QueryParams::new());
        let day = |column: &str| {
            m.date_at(0, column)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        let metrics = vec![
            Metric::new(
                "Total Trades",
                format::count(m.first_i64("total_trades").unwrap_or(0)),
            ),
            Metric::new(
                "Total Volume",
                format::money(m.first_f64("total_volume").unwrap_or(0.0), 0),
            ),
            Metric::new(
                "Total P&L",
                format::money(m.first_f64("total_pnl").unwrap_or(0.0), 0),
            ),
            Metric::new(
                "Avg Trade Value",
                format::money(m.first_f64("avg_trade_value").unwrap_or(0.0), 2),
            ),
            Metric::new("Earliest Trade", day("earliest_trade")),
            Metric::new("Latest Trade", day("latest_trade")),
        ];
        dash.push(Block::Metrics(metrics));
    }

    dash.heading("Sample Data (First 10 Rows)");
    let sample = dash.fetch(
        port,
        &sql::sample_rows(&quoted),
        &QueryParams::new().with_int("limit", SAMPLE_ROWS),
    );
    show_or_info(dash, &sample);

    if SCD2_TABLES.contains(&table.as_str()) {
        dash.info(&[
            "SCD Type 2 (Slowly Changing Dimension)",
            "This table uses Type 2 tracking to maintain historical versions:",
            "is_current: flag marking the current version",
            "effective_date: when this version became active",
            "expiry_date: when this version was superseded (NULL for current)",
            "version_number: sequential version identifier",
        ]);
    }
    if table == FACT_TABLE {
        dash.info(&[
            "Table Partitioning",
            "This table is partitioned by month using RANGE partitioning on trade_timestamp.",
            "Partition pruning keeps date-bounded queries fast.",
            "Each partition contains one month of trading data.",
        ]);
    }
}

fn relationships(dash: &mut Dashboard, port: &dyn WarehousePort) {
    dash.heading("🔗 Table Relationships");
    let fks = dash.fetch(port, sql::FOREIGN_KEYS, &QueryParams::new());
    if fks.is_empty() {
        dash.info(&["No foreign key relationships found in the schema."]);
    } else {
        dash.heading("Foreign Key Relationships");
        dash.push(Block::Table(TableBlock::from_table(&fks, &[])));

        dash.heading("Relationship Diagram");
        // Rows arrive ordered by table, so consecutive grouping suffices.
        let mut current: Option<(String, Vec<String>)> = None;
        for row in 0..fks.len() {
            let table = fks.text_at(row, "fact_table").unwrap_or_default();
            let line = format!(
                "{} → {}.{}",
                fks.text_at(row, "fact_column").unwrap_or_default(),
                fks.text_at(row, "dimension_table").unwrap_or_default(),
                fks.text_at(row, "dimension_key").unwrap_or_default()
            );
            if let Some((name, lines)) = current.as_mut() {
                if *name == table {
                    lines.push(line);
                    continue;
                }
            }
            if let Some((name, lines)) = current.replace((table, vec![line])) {
                dash.heading(name);
                dash.push(Block::Text(lines));
            }
        }
        if let Some((name, lines)) = current {
            dash.heading(name);
            dash.push(Block::Text(lines));
        }
    }

    dash.heading("Materialized Views");
    let views = dash.fetch(port, sql::MATERIALIZED_VIEWS, &QueryParams::new());
    if views.is_empty() {
        dash.info(&["No materialized views found."]);
    } else {
        dash.push(Block::Table(TableBlock::from_table(&views, &[])));
    }
}

fn table_explorer(dash: &mut Dashboard, port: &dyn WarehousePort, sel: &Selection) {
    dash.heading("📋 Interactive Table Explorer");
    let listed = dash
        .fetch(port, sql::BASE_TABLES, &QueryParams::new())
        .text_column("table_name");
    let Some(table) = pick_table(dash, &listed, sel.table.as_deref()) else {
        dash.info(&["No tables found."]);
        return;
    };
    let preview = clamp_limit(sel.rows, 5, 100, 20);
    dash.controls.push(Control::select(
        "table",
        "Select Table",
        table_choices(&listed, &table),
    ));
    dash.controls.push(Control::range(
        "rows",
        "Number of rows to display",
        5,
        100,
        preview,
    ));

    let quoted = quote_ident(&table);
    let by_name = QueryParams::new().with_text("table_name", table.as_str());
    let stats = dash.fetch(port, &sql::table_stats(&quoted), &by_name);
    dash.push(Block::Metrics(vec![
        Metric::new(
            "Row Count",
            format::count(stats.first_i64("row_count").unwrap_or(0)),
        ),
        Metric::new(
            "Table Size",
            stats.text_at(0, "table_size").unwrap_or_else(|| "-".into()),
        ),
    ]));

    dash.heading("Column Details");
    let details = dash.fetch(port, sql::COLUMN_DETAILS, &by_name);
    dash.push(Block::Table(TableBlock::from_table(&details, &[])));

    dash.heading("Data Preview");
    let rows = dash.fetch(
        port,
        &sql::sample_rows(&quoted),
        &QueryParams::new().with_int("limit", preview),
    );
    show_or_info(dash, &rows);

    dash.push(Block::Export { table });
}
