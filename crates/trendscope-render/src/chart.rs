//! SVG line chart of interest over time, one line per term.

use html_escape::encode_text;
use trendscope_core::TimeSeries;

use crate::table::timestamp_format;

/// Line colours, assigned to terms in query order and cycled.
pub const SERIES_COLORS: &[&str] = &["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 320,
            margin: 48,
        }
    }
}

/// Renders `series` as a standalone SVG document.
///
/// The y axis spans 0 to 100 (or the largest value if the upstream ever
/// exceeds 100). A series with a single row is drawn as a centred point.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn line_chart_svg(series: &TimeSeries, options: &ChartOptions) -> String {
    let width = f64::from(options.width);
    let height = f64::from(options.height);
    let margin = f64::from(options.margin);
    let plot_w = (width - 2.0 * margin).max(1.0);
    let plot_h = (height - 2.0 * margin).max(1.0);
    let y_max = series
        .rows
        .iter()
        .flat_map(|row| row.values.iter().copied())
        .max()
        .unwrap_or(0)
        .max(100);
    let y_max = f64::from(y_max);
    let n = series.len();

    let x_at = |i: usize| {
        if n <= 1 {
            margin + plot_w / 2.0
        } else {
            margin + plot_w * i as f64 / (n - 1) as f64
        }
    };
    let y_at = |v: f64| height - margin - plot_h * v / y_max;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" role=\"img\" aria-label=\"Interest over time\">\n",
        w = options.width,
        h = options.height
    );
    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");

    for step in 0..=4 {
        let value = y_max * f64::from(step) / 4.0;
        let y = y_at(value);
        svg.push_str(&format!(
            "<line x1=\"{margin:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#e0e0e0\"/>\n",
            width - margin
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{y:.1}\" font-size=\"11\" text-anchor=\"end\" dominant-baseline=\"middle\" fill=\"#555\">{value:.0}</text>\n",
            margin - 6.0
        ));
    }

    let fmt = timestamp_format(series);
    let tick_rows: Vec<usize> = match n {
        0 => Vec::new(),
        1 => vec![0],
        2 => vec![0, 1],
        _ => vec![0, (n - 1) / 2, n - 1],
    };
    for i in tick_rows {
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\" fill=\"#555\">{}</text>\n",
            x_at(i),
            height - margin + 18.0,
            series.rows[i].timestamp.format(fmt)
        ));
    }

    for (idx, term) in series.terms.iter().enumerate() {
        let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
        let points: Vec<String> = series
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                row.values
                    .get(idx)
                    .map(|v| format!("{:.1},{:.1}", x_at(i), y_at(f64::from(*v))))
            })
            .collect();
        if points.len() == 1 {
            let (cx, cy) = points[0].split_once(',').unwrap_or(("0", "0"));
            svg.push_str(&format!(
                "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"3\" fill=\"{color}\"/>\n"
            ));
        } else if !points.is_empty() {
            svg.push_str(&format!(
                "<polyline fill=\"none\" stroke=\"{color}\" stroke-width=\"2\" points=\"{}\"/>\n",
                points.join(" ")
            ));
        }

        let legend_x = margin + 140.0 * idx as f64;
        svg.push_str(&format!(
            "<rect x=\"{legend_x:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{color}\"/>\n",
            margin / 2.0 - 10.0
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" dominant-baseline=\"middle\">{}</text>\n",
            legend_x + 18.0,
            margin / 2.0 - 4.0,
            encode_text(term)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}
