//! Log-log comparison chart
//!
//! ratatui charts only have linear axes, so points are plotted as `log10`
//! values and the axis labels show the decade they stand for.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition},
    Frame,
};

use crate::analysis::Comparison;

/// Line colors, assigned to countries in order
const PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::LightRed,
    Color::LightBlue,
    Color::White,
    Color::LightGreen,
];

/// Decimal places kept in tick labels
const TICK_DECIMALS: i32 = 4;

/// One country's line in log space
#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub country: String,
    pub points: Vec<(f64, f64)>,
}

/// A comparison prepared for drawing on log-log axes
#[derive(Debug, Clone, PartialEq)]
pub struct LogPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub lines: Vec<LogLine>,
    /// Bounds in log10 units, snapped to whole decades
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl LogPlot {
    /// Converts a comparison to log space
    pub fn from_comparison(comparison: &Comparison) -> Self {
        let lines: Vec<LogLine> = comparison
            .series
            .iter()
            .map(|series| LogLine {
                country: series.country.clone(),
                points: log_points(&series.points),
            })
            .collect();

        let x_bounds = decade_bounds(lines.iter().flat_map(|l| l.points.iter().map(|p| p.0)));
        let y_bounds = decade_bounds(lines.iter().flat_map(|l| l.points.iter().map(|p| p.1)));

        Self {
            title: comparison.title().to_string(),
            x_label: comparison.x_label().to_string(),
            y_label: comparison.y_label(),
            lines,
            x_bounds,
            y_bounds,
        }
    }
}

/// Maps points to `log10` space, dropping those that can't be shown on a log axis
pub fn log_points(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    points
        .iter()
        .filter(|(x, y)| x.is_finite() && y.is_finite() && *x > 0.0 && *y > 0.0)
        .map(|(x, y)| (x.log10(), y.log10()))
        .collect()
}

/// Smallest range of whole decades covering all values
///
/// Falls back to `[0, 1]` when there is nothing to show.
pub fn decade_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }

    let lo = min.floor();
    let hi = max.ceil();
    if hi > lo {
        [lo, hi]
    } else {
        [lo, lo + 1.0]
    }
}

/// Formats a tick value rounded to four decimals, without trailing zeros
pub fn format_tick(value: f64) -> String {
    let scale = 10f64.powi(TICK_DECIMALS);
    let rounded = (value * scale).round() / scale;
    let text = format!("{:.*}", TICK_DECIMALS as usize, rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}

/// Labels for every decade in `bounds`, evenly spread along the axis
pub fn decade_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    let lo = bounds[0] as i32;
    let hi = bounds[1] as i32;
    (lo..=hi)
        .map(|exp| Span::raw(format_tick(10f64.powi(exp))))
        .collect()
}

/// Renders a log-log chart into `area`
pub fn render(frame: &mut Frame, area: Rect, plot: &LogPlot) {
    let datasets: Vec<Dataset> = plot
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            Dataset::default()
                .name(line.country.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                .data(&line.points)
        })
        .collect();

    let block = Block::default()
        .title(format!(" {} ", plot.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let axis_style = Style::default().fg(Color::Gray);
    let title_style = Style::default().add_modifier(Modifier::BOLD);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(Span::styled(plot.x_label.clone(), title_style))
                .style(axis_style)
                .bounds(plot.x_bounds)
                .labels(decade_labels(plot.x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(plot.y_label.clone(), title_style))
                .style(axis_style)
                .bounds(plot.y_bounds)
                .labels(decade_labels(plot.y_bounds)),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));

    frame.render_widget(chart, area);
}
