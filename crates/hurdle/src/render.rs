//! Render description for a screened forward-return histogram.
//!
//! The core computation emits a [`HistogramRender`]: title, axis labels, and
//! the bin geometry, enough for any plotting backend to draw the figure
//! without recomputing anything. A self-contained SVG backend is included so
//! the CLI can persist plots without a graphics dependency.

use serde::{Deserialize, Serialize};

use crate::histogram::BinnedHistogram;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 480.0;
const PADDING: f64 = 48.0;
const BAR_COLOR: &str = "#0504aa";
const GRID_COLOR: &str = "#000000";
// Fraction of each bin's width occupied by its bar.
const BAR_WIDTH_FRACTION: f64 = 0.85;

/// A complete, renderable description of a screened histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramRender {
    /// Figure title.
    pub title: String,
    /// X-axis label.
    pub x_label: String,
    /// Y-axis label.
    pub y_label: String,
    /// Bin boundaries, ascending (`bins + 1` values).
    pub edges: Vec<f64>,
    /// Per-bin frequencies.
    pub counts: Vec<u64>,
}

impl HistogramRender {
    /// Build the render description for a screening run.
    ///
    /// The title reproduces the reference wording verbatim, double space
    /// included: `"12 months forward return for price/epsNtm  > 30"`.
    pub fn new(
        histogram: &BinnedHistogram,
        metric_expr: &str,
        threshold: f64,
        timeframe: usize,
    ) -> Self {
        Self {
            title: format!(
                "{} months forward return for {}  > {}",
                timeframe, metric_expr, threshold
            ),
            x_label: "Return %".to_string(),
            y_label: "Frequency".to_string(),
            edges: histogram.edges().to_vec(),
            counts: histogram.counts().to_vec(),
        }
    }

    /// Render the histogram as a standalone SVG document.
    ///
    /// An empty histogram still yields a valid figure: title and axes with
    /// no bars.
    pub fn to_svg(&self) -> String {
        let mut svg = svg_header(WIDTH, HEIGHT);

        svg.push_str(&format!(
            r##"<text x="{x}" y="20" text-anchor="middle" font-size="13" fill="#333">{title}</text>"##,
            x = WIDTH / 2.0,
            title = xml_escape(&self.title)
        ));

        let plot_w = WIDTH - 2.0 * PADDING;
        let plot_h = HEIGHT - 2.0 * PADDING;
        let x0 = PADDING;
        let y0 = HEIGHT - PADDING;

        let max_count = self.counts.iter().copied().max().unwrap_or(0).max(1) as f64;

        // Dashed horizontal gridlines with y tick labels.
        for i in 0..=4 {
            let frac = i as f64 / 4.0;
            let y = y0 - plot_h * frac;
            svg.push_str(&format!(
                r#"<line x1="{x1}" y1="{y}" x2="{x2}" y2="{y}" stroke="{color}" stroke-opacity="0.5" stroke-dasharray="4 3" stroke-width="0.5"/>"#,
                x1 = x0,
                x2 = x0 + plot_w,
                y = y,
                color = GRID_COLOR
            ));
            svg.push_str(&format!(
                r#"<text x="{x}" y="{y}" text-anchor="end">{v:.0}</text>"#,
                x = x0 - 6.0,
                y = y + 3.0,
                v = max_count * frac
            ));
        }

        // Bars.
        if !self.counts.is_empty() {
            let lo = self.edges[0];
            let span = self.edges[self.counts.len()] - lo;
            for (i, &count) in self.counts.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                let left = x0 + (self.edges[i] - lo) / span * plot_w;
                let bin_w = (self.edges[i + 1] - self.edges[i]) / span * plot_w;
                let bar_w = bin_w * BAR_WIDTH_FRACTION;
                let h = count as f64 / max_count * plot_h;
                svg.push_str(&format!(
                    r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{color}" fill-opacity="0.7"/>"#,
                    x = left + (bin_w - bar_w) / 2.0,
                    y = y0 - h,
                    w = bar_w,
                    h = h,
                    color = BAR_COLOR
                ));
            }

            // X tick labels at up to six evenly spaced edges.
            let n_edges = self.edges.len();
            let step = ((n_edges - 1) / 5).max(1);
            for i in (0..n_edges).step_by(step) {
                let x = x0 + (self.edges[i] - lo) / span * plot_w;
                svg.push_str(&format!(
                    r#"<text x="{x:.2}" y="{y}" text-anchor="middle">{v:.2}</text>"#,
                    x = x,
                    y = y0 + 14.0,
                    v = self.edges[i]
                ));
            }
        }

        // Axis lines and labels.
        svg.push_str(&format!(
            r##"<line x1="{x0}" y1="{y0}" x2="{x1}" y2="{y0}" stroke="#666" stroke-width="1"/>"##,
            x0 = x0,
            x1 = x0 + plot_w,
            y0 = y0
        ));
        svg.push_str(&format!(
            r##"<line x1="{x0}" y1="{y1}" x2="{x0}" y2="{y0}" stroke="#666" stroke-width="1"/>"##,
            x0 = x0,
            y1 = y0 - plot_h,
            y0 = y0
        ));
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" text-anchor="middle" font-size="11">{label}</text>"#,
            x = WIDTH / 2.0,
            y = HEIGHT - 12.0,
            label = xml_escape(&self.x_label)
        ));
        svg.push_str(&format!(
            r#"<text x="14" y="{y}" text-anchor="middle" font-size="11" transform="rotate(-90 14 {y})">{label}</text>"#,
            y = HEIGHT / 2.0,
            label = xml_escape(&self.y_label)
        ));

        svg.push_str(svg_footer());
        svg
    }
}

fn svg_header(width: f64, height: f64) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#666}}</style>"#,
        w = width,
        h = height
    )
}

const fn svg_footer() -> &'static str {
    "</svg>"
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
