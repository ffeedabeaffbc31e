//! Chart configurations produced by the view builders.
//!
//! These are pure data; rendering lives in `adapters::chart_svg`.

use super::stats::Bin;

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Relative marker size, typically a trade count.
    pub size: f64,
    /// Value mapped onto the continuous color scale.
    pub color: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    /// Category or date labels along x. `fill` shades the area under the line.
    Line {
        points: Vec<(String, f64)>,
        fill: bool,
    },
    Bar {
        bars: Vec<(String, f64)>,
    },
    Scatter {
        points: Vec<ScatterPoint>,
    },
    Pie {
        slices: Vec<(String, f64)>,
    },
    Histogram {
        bins: Vec<Bin>,
    },
    /// A hub-and-spoke diagram: one central node and its satellites.
    Schema {
        center: String,
        satellites: Vec<String>,
    },
}

/// Reference lines drawn over a chart.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    Vertical { x: f64, label: String },
    Horizontal { y: f64, label: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub markers: Vec<Marker>,
}

impl Chart {
    pub fn new(title: impl Into<String>, kind: ChartKind) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            kind,
            markers: Vec::new(),
        }
    }

    pub fn line(title: impl Into<String>, points: Vec<(String, f64)>) -> Self {
        Self::new(title, ChartKind::Line { points, fill: false })
    }

    pub fn area(title: impl Into<String>, points: Vec<(String, f64)>) -> Self {
        Self::new(title, ChartKind::Line { points, fill: true })
    }

    pub fn bar(title: impl Into<String>, bars: Vec<(String, f64)>) -> Self {
        Self::new(title, ChartKind::Bar { bars })
    }

    pub fn labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = x.into();
        self.y_label = y.into();
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// True when there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            ChartKind::Line { points, .. } => points.is_empty(),
            ChartKind::Bar { bars } => bars.is_empty(),
            ChartKind::Scatter { points } => points.is_empty(),
            ChartKind::Pie { slices } => slices.iter().all(|(_, v)| *v <= 0.0),
            ChartKind::Histogram { bins } => bins.is_empty(),
            ChartKind::Schema { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_kind_and_labels() {
        let chart = Chart::area("Cumulative P&L", vec![("2024-01-02".into(), 10.0)])
            .labels("Date", "P&L ($)");
        assert!(matches!(chart.kind, ChartKind::Line { fill: true, .. }));
        assert_eq!(chart.y_label, "P&L ($)");
        assert!(!chart.is_empty());
    }

    #[test]
    fn pie_of_zero_slices_is_empty() {
        let chart = Chart::new(
            "Holdings",
            ChartKind::Pie {
                slices: vec![("AAPL".into(), 0.0)],
            },
        );
        assert!(chart.is_empty());
    }

    #[test]
    fn markers_accumulate() {
        let chart = Chart::bar("x", Vec::new())
            .marker(Marker::Horizontal {
                y: -90.0,
                label: "VaR".into(),
            })
            .marker(Marker::Vertical {
                x: 0.0,
                label: "zero".into(),
            });
        assert_eq!(chart.markers.len(), 2);
        assert!(chart.is_empty());
    }
}
