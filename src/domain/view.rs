//! Dashboard views and the filter selections that drive them.

use chrono::NaiveDate;

use super::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Overview,
    Portfolio,
    Traders,
    Risk,
    TimeSeries,
    Explorer,
    Warehouse,
}

impl View {
    /// Side-menu order.
    pub const ALL: [View; 7] = [
        View::Overview,
        View::Portfolio,
        View::Traders,
        View::Risk,
        View::TimeSeries,
        View::Explorer,
        View::Warehouse,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::Portfolio => "portfolio",
            View::Traders => "traders",
            View::Risk => "risk",
            View::TimeSeries => "time-series",
            View::Explorer => "explorer",
            View::Warehouse => "warehouse",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Portfolio => "Portfolio Analytics",
            View::Traders => "Trader Performance",
            View::Risk => "Risk Analysis",
            View::TimeSeries => "Time Series",
            View::Explorer => "Data Explorer",
            View::Warehouse => "Data Warehouse Architecture",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            View::Overview => "🏠",
            View::Portfolio => "💼",
            View::Traders => "👥",
            View::Risk => "⚠️",
            View::TimeSeries => "📈",
            View::Explorer => "🔍",
            View::Warehouse => "🏗️",
        }
    }

    pub fn from_slug(slug: &str) -> Option<View> {
        View::ALL.into_iter().find(|v| v.slug() == slug)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerQuery {
    RecentTrades,
    TopSecurities,
    AccountSummary,
    TraderActivity,
    CustomSql,
}

impl ExplorerQuery {
    pub const ALL: [ExplorerQuery; 5] = [
        ExplorerQuery::RecentTrades,
        ExplorerQuery::TopSecurities,
        ExplorerQuery::AccountSummary,
        ExplorerQuery::TraderActivity,
        ExplorerQuery::CustomSql,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ExplorerQuery::RecentTrades => "recent_trades",
            ExplorerQuery::TopSecurities => "top_securities",
            ExplorerQuery::AccountSummary => "account_summary",
            ExplorerQuery::TraderActivity => "trader_activity",
            ExplorerQuery::CustomSql => "custom_sql",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExplorerQuery::RecentTrades => "Recent Trades",
            ExplorerQuery::TopSecurities => "Top Securities",
            ExplorerQuery::AccountSummary => "Account Summary",
            ExplorerQuery::TraderActivity => "Trader Activity",
            ExplorerQuery::CustomSql => "Custom SQL",
        }
    }

    pub fn from_key(key: &str) -> Option<ExplorerQuery> {
        ExplorerQuery::ALL.into_iter().find(|q| q.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarehouseTab {
    StarSchema,
    Dimensions,
    Facts,
    Relationships,
    Tables,
}

impl WarehouseTab {
    pub const ALL: [WarehouseTab; 5] = [
        WarehouseTab::StarSchema,
        WarehouseTab::Dimensions,
        WarehouseTab::Facts,
        WarehouseTab::Relationships,
        WarehouseTab::Tables,
    ];

    pub fn key(self) -> &'static str {
        match self {
            WarehouseTab::StarSchema => "star-schema",
            WarehouseTab::Dimensions => "dimensions",
            WarehouseTab::Facts => "facts",
            WarehouseTab::Relationships => "relationships",
            WarehouseTab::Tables => "tables",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WarehouseTab::StarSchema => "📐 Star Schema",
            WarehouseTab::Dimensions => "📊 Dimension Tables",
            WarehouseTab::Facts => "📈 Fact Tables",
            WarehouseTab::Relationships => "🔗 Relationships",
            WarehouseTab::Tables => "📋 Table Explorer",
        }
    }

    pub fn from_key(key: &str) -> Option<WarehouseTab> {
        WarehouseTab::ALL.into_iter().find(|t| t.key() == key)
    }
}

pub const CONFIDENCE_LEVELS: [u8; 3] = [90, 95, 99];

/// Filter inputs of a single render. Every field is optional; view builders
/// fill in their own defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub accounts: Vec<i64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub security: Option<i64>,
    pub confidence: Option<u8>,
    pub query_type: Option<ExplorerQuery>,
    pub limit: Option<i64>,
    pub sql: Option<String>,
    pub execute: bool,
    pub tab: Option<WarehouseTab>,
    pub table: Option<String>,
    pub rows: Option<i64>,
}

fn parse_int(field: &str, value: &str) -> Result<i64, DashboardError> {
    value
        .trim()
        .parse()
        .map_err(|_| DashboardError::invalid(field, format!("expected an integer, got {value:?}")))
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, DashboardError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DashboardError::invalid(field, "invalid date format (expected YYYY-MM-DD)"))
}

impl Selection {
    /// Parses repeated `key=value` pairs from a query string. Empty values
    /// count as absent; unknown keys are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, DashboardError> {
        let mut sel = Selection::default();
        for (key, value) in pairs {
            if value.trim().is_empty() && key != "sql" {
                continue;
            }
            match key.as_str() {
                "account" => {
                    let id = parse_int("account", value)?;
                    if !sel.accounts.contains(&id) {
                        sel.accounts.push(id);
                    }
                }
                "start" => sel.start = Some(parse_date("start", value)?),
                "end" => sel.end = Some(parse_date("end", value)?),
                "security" => sel.security = Some(parse_int("security", value)?),
                "confidence" => {
                    let level = parse_int("confidence", value)?;
                    let level = u8::try_from(level)
                        .ok()
                        .filter(|l| CONFIDENCE_LEVELS.contains(l))
                        .ok_or_else(|| {
                            DashboardError::invalid("confidence", "must be one of 90, 95, 99")
                        })?;
                    sel.confidence = Some(level);
                }
                "query_type" => {
                    sel.query_type = Some(ExplorerQuery::from_key(value).ok_or_else(|| {
                        DashboardError::invalid("query_type", format!("unknown query type {value:?}"))
                    })?)
                }
                "limit" => sel.limit = Some(parse_int("limit", value)?),
                "sql" => sel.sql = Some(value.clone()),
                "execute" => sel.execute = true,
                "tab" => {
                    sel.tab = Some(WarehouseTab::from_key(value).ok_or_else(|| {
                        DashboardError::invalid("tab", format!("unknown tab {value:?}"))
                    })?)
                }
                "table" => sel.table = Some(value.trim().to_string()),
                "rows" => sel.rows = Some(parse_int("rows", value)?),
                _ => {}
            }
        }

        if let (Some(start), Some(end)) = (sel.start, sel.end) {
            if start > end {
                return Err(DashboardError::invalid("start", "start date is after end date"));
            }
        }
        Ok(sel)
    }

    /// Date range with a default look-back. The end never passes `today`.
    pub fn date_range(&self, today: NaiveDate, lookback_days: i64) -> (NaiveDate, NaiveDate) {
        let end = self.end.map(|e| e.min(today)).unwrap_or(today);
        let start = self
            .start
            .unwrap_or_else(|| today - chrono::Duration::days(lookback_days))
            .min(end);
        (start, end)
    }

    pub fn confidence_level(&self) -> u8 {
        self.confidence.unwrap_or(95)
    }
}
