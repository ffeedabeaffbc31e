//! Askama templates and the view model they render.

use askama::Template;

use crate::adapters::chart_svg;
use crate::domain::dashboard::{Block, Choice, Control, Dashboard, Metric, Notice, TableBlock};
use crate::domain::view::View;

pub struct NavLink {
    pub slug: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub active: bool,
}

fn nav(current: View) -> Vec<NavLink> {
    View::ALL
        .iter()
        .map(|v| NavLink {
            slug: v.slug(),
            title: v.title(),
            icon: v.icon(),
            active: *v == current,
        })
        .collect()
}

/// A [`Block`] with its chart already drawn.
pub enum BlockView {
    Heading(String),
    Metrics(Vec<Metric>),
    Chart(String),
    Table(TableBlock),
    Text(Vec<String>),
    Info(Vec<String>),
    Export(String),
}

impl From<Block> for BlockView {
    fn from(block: Block) -> Self {
        match block {
            Block::Heading(text) => BlockView::Heading(text),
            Block::Metrics(metrics) => BlockView::Metrics(metrics),
            Block::Chart(chart) => BlockView::Chart(chart_svg::render(&chart)),
            Block::Table(table) => BlockView::Table(table),
            Block::Text(lines) => BlockView::Text(lines),
            Block::Info(lines) => BlockView::Info(lines),
            Block::Export { table } => BlockView::Export(table),
        }
    }
}

pub struct PageView {
    pub view: View,
    pub slug: &'static str,
    pub title: String,
    pub tabs: Vec<Choice>,
    pub controls: Vec<Control>,
    pub notices: Vec<Notice>,
    pub blocks: Vec<BlockView>,
}

impl PageView {
    /// True when a control needs a submit button.
    pub fn has_inputs(&self) -> bool {
        self.controls
            .iter()
            .any(|c| !matches!(c, Control::Hidden(_)))
    }

    pub fn has_sql_input(&self) -> bool {
        self.controls
            .iter()
            .any(|c| matches!(c, Control::TextArea(_)))
    }
}

impl From<Dashboard> for PageView {
    fn from(dash: Dashboard) -> Self {
        Self {
            view: dash.view,
            slug: dash.view.slug(),
            title: dash.title,
            tabs: dash.tabs,
            controls: dash.controls,
            notices: dash.notices,
            blocks: dash.blocks.into_iter().map(BlockView::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "page.html")]
pub struct PageTemplate<'a> {
    pub nav: Vec<NavLink>,
    pub page: &'a PageView,
}

impl<'a> PageTemplate<'a> {
    pub fn new(page: &'a PageView) -> Self {
        Self {
            nav: nav(page.view),
            page,
        }
    }
}

/// The `#content` fragment swapped in by HTMX.
#[derive(Template)]
#[template(path = "content.html")]
pub struct ContentTemplate<'a> {
    pub page: &'a PageView,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub status: u16,
    pub reason: &'a str,
    pub message: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::Chart;
    use crate::domain::dashboard::NoticeLevel;

    fn page() -> PageView {
        let mut dash = Dashboard::new(View::Risk);
        dash.notice(NoticeLevel::Error, "query error: <boom>");
        dash.push(Block::Metrics(vec![Metric::new("VaR (95%)", "$1,200")]));
        dash.push(Block::Chart(Chart::bar("Account Risk", Vec::new())));
        PageView::from(dash)
    }

    #[test]
    fn charts_are_rendered_to_svg() {
        let page = page();
        assert!(matches!(&page.blocks[1], BlockView::Chart(svg) if svg.contains("No data available.")));
    }

    #[test]
    fn fragment_escapes_notice_text() {
        let html = ContentTemplate { page: &page() }.render().unwrap();
        assert!(html.contains("query error: &lt;boom&gt;"));
        assert!(html.contains("notice-error"));
        assert!(html.contains("<svg"));
        assert!(!html.contains("<nav"));
    }

    #[test]
    fn full_page_marks_active_view() {
        let page = page();
        let html = PageTemplate::new(&page).render().unwrap();
        assert!(html.contains("<nav"));
        assert!(html.contains(r#"class="active" href="/view/risk""#));
        assert!(html.contains("VaR (95%)"));
    }
}
