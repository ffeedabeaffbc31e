//! Page model assembled by the view builders and rendered by the web layer.

use chrono::NaiveDate;

use super::chart::Chart;
use super::format::ColumnFormat;
use super::query::QueryParams;
use super::table::ResultTable;
use super::view::View;
use crate::ports::warehouse_port::WarehousePort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Warning,
    Info,
}

impl NoticeLevel {
    pub fn css_class(self) -> &'static str {
        match self {
            NoticeLevel::Error => "notice-error",
            NoticeLevel::Warning => "notice-warning",
            NoticeLevel::Info => "notice-info",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectInput {
    pub name: String,
    pub label: String,
    pub options: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateInput {
    pub name: String,
    pub label: String,
    pub value: NaiveDate,
    pub max: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeInput {
    pub name: String,
    pub label: String,
    pub min: i64,
    pub max: i64,
    pub step: i64,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextInput {
    pub name: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HiddenInput {
    pub name: String,
    pub value: String,
}

/// A filter input in the view's control bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    MultiSelect(SelectInput),
    Select(SelectInput),
    Date(DateInput),
    Range(RangeInput),
    TextArea(TextInput),
    Hidden(HiddenInput),
}

impl Control {
    pub fn select(name: &str, label: &str, options: Vec<Choice>) -> Self {
        Control::Select(SelectInput {
            name: name.to_string(),
            label: label.to_string(),
            options,
        })
    }

    pub fn multi_select(name: &str, label: &str, options: Vec<Choice>) -> Self {
        Control::MultiSelect(SelectInput {
            name: name.to_string(),
            label: label.to_string(),
            options,
        })
    }

    pub fn date(name: &str, label: &str, value: NaiveDate, max: NaiveDate) -> Self {
        Control::Date(DateInput {
            name: name.to_string(),
            label: label.to_string(),
            value,
            max,
        })
    }

    pub fn range(name: &str, label: &str, min: i64, max: i64, value: i64) -> Self {
        Control::Range(RangeInput {
            name: name.to_string(),
            label: label.to_string(),
            min,
            max,
            step: 1,
            value,
        })
    }

    pub fn text_area(name: &str, label: &str, value: &str) -> Self {
        Control::TextArea(TextInput {
            name: name.to_string(),
            label: label.to_string(),
            value: value.to_string(),
        })
    }

    pub fn hidden(name: &str, value: &str) -> Self {
        Control::Hidden(HiddenInput {
            name: name.to_string(),
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: String,
    pub value: String,
    pub delta: Option<String>,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            delta: None,
        }
    }

    pub fn with_delta(mut self, delta: impl Into<String>) -> Self {
        self.delta = Some(delta.into());
        self
    }
}

/// A result table with its cells already formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub title: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Columns without an entry in `formats` are shown as-is.
    pub fn from_table(table: &ResultTable, formats: &[(&str, ColumnFormat)]) -> Self {
        let per_column: Vec<ColumnFormat> = table
            .columns
            .iter()
            .map(|c| {
                formats
                    .iter()
                    .find(|(name, _)| name == c)
                    .map(|(_, f)| *f)
                    .unwrap_or(ColumnFormat::Plain)
            })
            .collect();
        let rows = table
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&per_column)
                    .map(|(value, format)| format.apply(value))
                    .collect()
            })
            .collect();
        Self {
            title: None,
            columns: table.columns.clone(),
            rows,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(String),
    Metrics(Vec<Metric>),
    Chart(Chart),
    Table(TableBlock),
    Text(Vec<String>),
    Info(Vec<String>),
    /// Download link for a whole base table.
    Export { table: String },
}

/// Everything one view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub view: View,
    pub title: String,
    pub tabs: Vec<Choice>,
    pub controls: Vec<Control>,
    pub notices: Vec<Notice>,
    pub blocks: Vec<Block>,
}

impl Dashboard {
    pub fn new(view: View) -> Self {
        Self {
            view,
            title: format!("{} {}", view.icon(), view.title()),
            tabs: Vec::new(),
            controls: Vec::new(),
            notices: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn heading(&mut self, text: impl Into<String>) {
        self.blocks.push(Block::Heading(text.into()));
    }

    pub fn info(&mut self, lines: &[&str]) {
        self.blocks
            .push(Block::Info(lines.iter().map(|l| l.to_string()).collect()));
    }

    pub fn notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice {
            level,
            message: message.into(),
        });
    }

    pub fn error_notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(|n| n.level == NoticeLevel::Error)
    }

    /// Runs a query through [`fetch`], collecting failures as notices.
    pub fn fetch(
        &mut self,
        port: &dyn WarehousePort,
        sql: &str,
        params: &QueryParams,
    ) -> ResultTable {
        fetch(port, sql, params, &mut self.notices)
    }
}

/// The one guarded call site for warehouse queries.
///
/// A failure is logged, reported to the user as an error notice and replaced
/// by an empty table so the rest of the view still renders.
pub fn fetch(
    port: &dyn WarehousePort,
    sql: &str,
    params: &QueryParams,
    notices: &mut Vec<Notice>,
) -> ResultTable {
    match port.query(sql, params) {
        Ok(table) => table,
        Err(err) => {
            tracing::warn!(error = %err, "warehouse query failed");
            notices.push(Notice {
                level: NoticeLevel::Error,
                message: err.to_string(),
            });
            ResultTable::empty()
        }
    }
}
