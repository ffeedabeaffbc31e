//! Inline SVG rendering for dashboard charts.

use crate::domain::chart::{Chart, ChartKind, Marker, ScatterPoint};
use crate::domain::stats::Bin;

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 44.0;
const MARGIN_BOTTOM: f64 = 64.0;
const PLOT_WIDTH: f64 = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
const PLOT_HEIGHT: f64 = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;

pub const NAVY: &str = "#1e3a8a";
pub const BLUE: &str = "#3b82f6";
pub const GOLD: &str = "#f59e0b";
const TEXT: &str = "#e2e8f0";
const MUTED: &str = "#94a3b8";
const GRID: &str = "#334155";
const LINK: &str = "#475569";
const EDGE: &str = "#0f172a";
const WHITE: &str = "#ffffff";

const PIE_COLORS: [&str; 10] = [
    "#1e3a8a", "#3b82f6", "#f59e0b", "#60a5fa", "#fbbf24", "#1d4ed8", "#d97706", "#93c5fd",
    "#fcd34d", "#2563eb",
];

const MAX_X_LABELS: usize = 10;
const MAX_POINT_MARKERS: usize = 60;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Continuous navy → blue → gold scale for `t` in `[0, 1]`.
pub fn color_scale(t: f64) -> String {
    const STOPS: [(f64, f64, f64); 3] = [(30.0, 58.0, 138.0), (59.0, 130.0, 246.0), (245.0, 158.0, 11.0)];
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let (a, b, local) = if t <= 0.5 {
        (STOPS[0], STOPS[1], t / 0.5)
    } else {
        (STOPS[1], STOPS[2], (t - 0.5) / 0.5)
    };
    let lerp = |x: f64, y: f64| (x + (y - x) * local).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        lerp(a.0, b.0),
        lerp(a.1, b.1),
        lerp(a.2, b.2)
    )
}

/// Tick label shorthand: `1.2M`, `350K`, `0.25`.
fn compact(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.1}K", v / 1e3)
    } else if a >= 10.0 || a == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn short_label(text: &str) -> String {
    if text.chars().count() > 16 {
        let mut s: String = text.chars().take(15).collect();
        s.push('…');
        s
    } else {
        text.to_string()
    }
}

#[derive(Debug, Clone, Copy)]
struct Scale {
    min: f64,
    max: f64,
}

impl Scale {
    fn new(min: f64, max: f64) -> Self {
        if !(min.is_finite() && max.is_finite()) {
            return Self { min: 0.0, max: 1.0 };
        }
        if (max - min).abs() < f64::EPSILON {
            return Self {
                min: min - 1.0,
                max: max + 1.0,
            };
        }
        Self { min, max }
    }

    fn covering(values: impl IntoIterator<Item = f64>) -> Self {
        let (lo, hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        Self::new(lo, hi)
    }

    fn frac(&self, v: f64) -> f64 {
        (v - self.min) / (self.max - self.min)
    }

    fn py(&self, v: f64) -> f64 {
        MARGIN_TOP + PLOT_HEIGHT * (1.0 - self.frac(v))
    }

    fn px(&self, v: f64) -> f64 {
        MARGIN_LEFT + PLOT_WIDTH * self.frac(v)
    }

    fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.min, self.max)
    }
}

fn category_x(i: usize, n: usize) -> f64 {
    MARGIN_LEFT + PLOT_WIDTH * (i as f64 + 0.5) / n.max(1) as f64
}

fn open(chart: &Chart) -> String {
    let title = escape(&chart.title);
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" class="chart" role="img" aria-label="{title}"><text x="{:.1}" y="24" fill="{TEXT}" font-size="15" font-weight="600" text-anchor="middle">{title}</text>"#,
        CHART_WIDTH / 2.0
    )
}

fn placeholder(chart: &Chart) -> String {
    let mut svg = open(chart);
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" fill="{MUTED}" font-size="14" text-anchor="middle">No data available.</text></svg>"#,
        CHART_WIDTH / 2.0,
        CHART_HEIGHT / 2.0
    ));
    svg
}

fn y_axis(svg: &mut String, y: &Scale, label: &str) {
    for i in 0..=4 {
        let v = y.min + (y.max - y.min) * f64::from(i) / 4.0;
        let py = y.py(v);
        svg.push_str(&format!(
            r#"<line x1="{MARGIN_LEFT}" y1="{py:.1}" x2="{:.1}" y2="{py:.1}" stroke="{GRID}" stroke-width="1"/><text x="{:.1}" y="{:.1}" fill="{MUTED}" font-size="11" text-anchor="end">{}</text>"#,
            MARGIN_LEFT + PLOT_WIDTH,
            MARGIN_LEFT - 8.0,
            py + 4.0,
            compact(v)
        ));
    }
    if !label.is_empty() {
        let cy = MARGIN_TOP + PLOT_HEIGHT / 2.0;
        svg.push_str(&format!(
            r#"<text x="16" y="{cy:.1}" fill="{MUTED}" font-size="12" text-anchor="middle" transform="rotate(-90 16 {cy:.1})">{}</text>"#,
            escape(label)
        ));
    }
}

fn x_title(svg: &mut String, label: &str) {
    if !label.is_empty() {
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" fill="{MUTED}" font-size="12" text-anchor="middle">{}</text>"#,
            MARGIN_LEFT + PLOT_WIDTH / 2.0,
            CHART_HEIGHT - 8.0,
            escape(label)
        ));
    }
}

fn category_labels(svg: &mut String, labels: &[&str]) {
    let n = labels.len();
    let step = n.div_ceil(MAX_X_LABELS).max(1);
    let base = MARGIN_TOP + PLOT_HEIGHT + 14.0;
    for (i, label) in labels.iter().enumerate().filter(|(i, _)| i % step == 0) {
        let x = category_x(i, n);
        svg.push_str(&format!(
            r#"<text x="{x:.1}" y="{base:.1}" fill="{MUTED}" font-size="10" text-anchor="end" transform="rotate(-35 {x:.1} {base:.1})">{}</text>"#,
            escape(&short_label(label))
        ));
    }
}

fn numeric_labels(svg: &mut String, x: &Scale) {
    let base = MARGIN_TOP + PLOT_HEIGHT + 16.0;
    for i in 0..=4 {
        let v = x.min + (x.max - x.min) * f64::from(i) / 4.0;
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{base:.1}" fill="{MUTED}" font-size="11" text-anchor="middle">{}</text>"#,
            x.px(v),
            compact(v)
        ));
    }
}

fn markers(svg: &mut String, chart: &Chart, x: Option<&Scale>, y: &Scale) {
    for marker in &chart.markers {
        match marker {
            Marker::Horizontal { y: value, label } => {
                let py = y.py(y.clamp(*value));
                svg.push_str(&format!(
                    r#"<line x1="{MARGIN_LEFT}" y1="{py:.1}" x2="{:.1}" y2="{py:.1}" stroke="{GOLD}" stroke-width="2" stroke-dasharray="6 4"/><text x="{:.1}" y="{:.1}" fill="{GOLD}" font-size="11" text-anchor="end">{}</text>"#,
                    MARGIN_LEFT + PLOT_WIDTH,
                    MARGIN_LEFT + PLOT_WIDTH - 4.0,
                    py - 6.0,
                    escape(label)
                ));
            }
            Marker::Vertical { x: value, label } => {
                let Some(x) = x else { continue };
                let px = x.px(x.clamp(*value));
                svg.push_str(&format!(
                    r#"<line x1="{px:.1}" y1="{MARGIN_TOP}" x2="{px:.1}" y2="{:.1}" stroke="{GOLD}" stroke-width="2" stroke-dasharray="6 4"/><text x="{:.1}" y="{:.1}" fill="{GOLD}" font-size="11">{}</text>"#,
                    MARGIN_TOP + PLOT_HEIGHT,
                    px + 4.0,
                    MARGIN_TOP + 12.0,
                    escape(label)
                ));
            }
        }
    }
}

fn horizontal_marker_values(chart: &Chart) -> impl Iterator<Item = f64> + '_ {
    chart.markers.iter().filter_map(|m| match m {
        Marker::Horizontal { y, .. } => Some(*y),
        Marker::Vertical { .. } => None,
    })
}

fn render_line(chart: &Chart, points: &[(String, f64)], fill: bool) -> String {
    let mut svg = open(chart);
    let zero = if fill { Some(0.0) } else { None };
    let y = Scale::covering(
        points
            .iter()
            .map(|p| p.1)
            .chain(horizontal_marker_values(chart))
            .chain(zero),
    );
    y_axis(&mut svg, &y, &chart.y_label);

    let n = points.len();
    let coords: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (category_x(i, n), y.py(*v)))
        .collect();
    let path: Vec<String> = coords
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect();
    let stroke = if fill { GOLD } else { BLUE };

    if fill {
        if let (Some(first), Some(last)) = (coords.first(), coords.last()) {
            let base = y.py(y.clamp(0.0));
            svg.push_str(&format!(
                r#"<polygon points="{:.1},{base:.1} {} {:.1},{base:.1}" fill="{stroke}" fill-opacity="0.15" stroke="none"/>"#,
                first.0,
                path.join(" "),
                last.0
            ));
        }
    }
    svg.push_str(&format!(
        r#"<polyline points="{}" fill="none" stroke="{stroke}" stroke-width="2.5" stroke-linejoin="round"/>"#,
        path.join(" ")
    ));
    if n <= MAX_POINT_MARKERS {
        for ((label, v), (x, py)) in points.iter().zip(&coords) {
            svg.push_str(&format!(
                r#"<circle cx="{x:.1}" cy="{py:.1}" r="3" fill="{stroke}"><title>{}: {}</title></circle>"#,
                escape(label),
                compact(*v)
            ));
        }
    }

    let labels: Vec<&str> = points.iter().map(|p| p.0.as_str()).collect();
    category_labels(&mut svg, &labels);
    markers(&mut svg, chart, None, &y);
    x_title(&mut svg, &chart.x_label);
    svg.push_str("</svg>");
    svg
}

fn render_bars(chart: &Chart, bars: &[(String, f64)]) -> String {
    let mut svg = open(chart);
    let y = Scale::covering(
        bars.iter()
            .map(|b| b.1)
            .chain(horizontal_marker_values(chart))
            .chain(Some(0.0)),
    );
    let shade = Scale::covering(bars.iter().map(|b| b.1));
    y_axis(&mut svg, &y, &chart.y_label);

    let n = bars.len();
    let width = PLOT_WIDTH / n.max(1) as f64 * 0.7;
    let base = y.py(y.clamp(0.0));
    for (i, (label, v)) in bars.iter().enumerate() {
        let top = y.py(*v);
        svg.push_str(&format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{width:.1}" height="{:.1}" fill="{}" rx="2"><title>{}: {}</title></rect>"#,
            category_x(i, n) - width / 2.0,
            top.min(base),
            (top - base).abs().max(0.5),
            color_scale(shade.frac(*v)),
            escape(label),
            compact(*v)
        ));
    }

    let labels: Vec<&str> = bars.iter().map(|b| b.0.as_str()).collect();
    category_labels(&mut svg, &labels);
    markers(&mut svg, chart, None, &y);
    x_title(&mut svg, &chart.x_label);
    svg.push_str("</svg>");
    svg
}

fn render_histogram(chart: &Chart, bins: &[Bin]) -> String {
    let mut svg = open(chart);
    let lo = bins.first().map_or(0.0, |b| b.lower);
    let hi = bins.last().map_or(1.0, |b| b.upper);
    let x = Scale::new(lo, hi);
    let y = Scale::new(0.0, bins.iter().map(|b| b.count).max().unwrap_or(1).max(1) as f64);
    y_axis(&mut svg, &y, &chart.y_label);

    for bin in bins {
        let left = x.px(bin.lower);
        let right = x.px(bin.upper);
        let top = y.py(bin.count as f64);
        svg.push_str(&format!(
            r#"<rect x="{left:.1}" y="{top:.1}" width="{:.1}" height="{:.1}" fill="{NAVY}" stroke="{BLUE}" stroke-width="0.5"><title>{} to {}: {}</title></rect>"#,
            (right - left - 1.0).max(0.5),
            (MARGIN_TOP + PLOT_HEIGHT - top).max(0.0),
            compact(bin.lower),
            compact(bin.upper),
            bin.count
        ));
    }

    numeric_labels(&mut svg, &x);
    markers(&mut svg, chart, Some(&x), &y);
    x_title(&mut svg, &chart.x_label);
    svg.push_str("</svg>");
    svg
}

fn render_scatter(chart: &Chart, points: &[ScatterPoint]) -> String {
    let mut svg = open(chart);
    let x = Scale::covering(points.iter().map(|p| p.x));
    let y = Scale::covering(points.iter().map(|p| p.y).chain(horizontal_marker_values(chart)));
    let size = Scale::covering(points.iter().map(|p| p.size));
    let color = Scale::covering(points.iter().map(|p| p.color));
    y_axis(&mut svg, &y, &chart.y_label);

    for p in points {
        let r = 4.0 + 14.0 * size.frac(p.size).clamp(0.0, 1.0).sqrt();
        svg.push_str(&format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{r:.1}" fill="{}" fill-opacity="0.8" stroke="{TEXT}" stroke-width="0.5"><title>{}</title></circle>"#,
            x.px(p.x),
            y.py(p.y),
            color_scale(color.frac(p.color)),
            escape(&p.label)
        ));
    }

    numeric_labels(&mut svg, &x);
    markers(&mut svg, chart, Some(&x), &y);
    x_title(&mut svg, &chart.x_label);
    svg.push_str("</svg>");
    svg
}

fn render_pie(chart: &Chart, slices: &[(String, f64)]) -> String {
    let mut svg = open(chart);
    let total: f64 = slices.iter().map(|s| s.1).filter(|v| *v > 0.0).sum();
    let (cx, cy, r) = (CHART_WIDTH * 0.32, CHART_HEIGHT / 2.0 + 12.0, 130.0);
    let mut angle = -std::f64::consts::FRAC_PI_2;

    for (i, (label, v)) in slices.iter().filter(|s| s.1 > 0.0).enumerate() {
        let frac = v / total;
        let color = PIE_COLORS[i % PIE_COLORS.len()];
        let tip = format!("{}: {:.1}%", escape(label), frac * 100.0);
        if frac >= 0.9999 {
            svg.push_str(&format!(
                r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="{r:.1}" fill="{color}"><title>{tip}</title></circle>"#
            ));
        } else {
            let end = angle + frac * std::f64::consts::TAU;
            let large = if frac > 0.5 { 1 } else { 0 };
            svg.push_str(&format!(
                r#"<path d="M {cx:.1} {cy:.1} L {:.2} {:.2} A {r:.1} {r:.1} 0 {large} 1 {:.2} {:.2} Z" fill="{color}" stroke="{EDGE}" stroke-width="1"><title>{tip}</title></path>"#,
                cx + r * angle.cos(),
                cy + r * angle.sin(),
                cx + r * end.cos(),
                cy + r * end.sin()
            ));
            angle = end;
        }

        let ly = 70.0 + i as f64 * 22.0;
        let lx = CHART_WIDTH * 0.62;
        svg.push_str(&format!(
            r#"<rect x="{lx:.1}" y="{:.1}" width="12" height="12" fill="{color}"/><text x="{:.1}" y="{ly:.1}" fill="{TEXT}" font-size="12">{tip}</text>"#,
            ly - 10.0,
            lx + 18.0
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn render_schema(chart: &Chart, center: &str, satellites: &[String]) -> String {
    let mut svg = open(chart);
    let (cx, cy) = (CHART_WIDTH / 2.0, CHART_HEIGHT / 2.0 + 14.0);
    let (rx, ry) = (260.0, 120.0);
    let n = satellites.len().max(1) as f64;

    let nodes: Vec<(f64, f64, &String)> = satellites
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let a = std::f64::consts::TAU * i as f64 / n - std::f64::consts::FRAC_PI_2;
            (cx + rx * a.cos(), cy + ry * a.sin(), name)
        })
        .collect();

    for (x, y, _) in &nodes {
        svg.push_str(&format!(
            r#"<line x1="{x:.1}" y1="{y:.1}" x2="{cx:.1}" y2="{cy:.1}" stroke="{LINK}" stroke-width="2" stroke-dasharray="3 4"/>"#
        ));
    }
    for (x, y, name) in &nodes {
        let short = name.strip_prefix("dim_").unwrap_or(name);
        svg.push_str(&format!(
            r#"<g><title>{} (dimension table)</title><circle cx="{x:.1}" cy="{y:.1}" r="38" fill="{NAVY}" stroke="{BLUE}" stroke-width="1.5"/><text x="{x:.1}" y="{:.1}" fill="{TEXT}" font-size="11" text-anchor="middle">{}</text></g>"#,
            escape(name),
            y + 4.0,
            escape(short)
        ));
    }
    svg.push_str(&format!(
        r#"<g><title>{0} (fact table)</title><rect x="{1:.1}" y="{2:.1}" width="140" height="48" rx="6" fill="{GOLD}"/><text x="{cx:.1}" y="{3:.1}" fill="{WHITE}" font-size="14" font-weight="700" text-anchor="middle">{0}</text></g>"#,
        escape(center),
        cx - 70.0,
        cy - 24.0,
        cy + 5.0
    ));
    svg.push_str("</svg>");
    svg
}

/// Renders a chart as a standalone `<svg>` element.
pub fn render(chart: &Chart) -> String {
    if chart.is_empty() {
        return placeholder(chart);
    }
    match &chart.kind {
        ChartKind::Line { points, fill } => render_line(chart, points, *fill),
        ChartKind::Bar { bars } => render_bars(chart, bars),
        ChartKind::Scatter { points } => render_scatter(chart, points),
        ChartKind::Pie { slices } => render_pie(chart, slices),
        ChartKind::Histogram { bins } => render_histogram(chart, bins),
        ChartKind::Schema { center, satellites } => render_schema(chart, center, satellites),
    }
}
