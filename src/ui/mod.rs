//! UI rendering module for covidplot
//!
//! This module contains the rendering logic for the terminal chart viewer,
//! using the ratatui library for TUI components.

pub mod chart_view;
pub mod help_overlay;

pub use chart_view::LogPlot;
pub use help_overlay::render as render_help_overlay;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

/// Renders the selected chart, the status bar and, when toggled, the help overlay
pub fn render_app(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(frame.area());

    match app.selected_plot() {
        Some(plot) => chart_view::render(frame, chunks[0], plot),
        None => {
            let empty = Paragraph::new("No data to chart")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, chunks[0]);
        }
    }

    frame.render_widget(status_line(app), chunks[1]);

    if app.show_help {
        render_help_overlay(frame);
    }
}

/// Bottom status line with chart position and key hints
fn status_line(app: &App) -> Paragraph<'static> {
    let position = if app.plots.is_empty() {
        "chart 0/0".to_string()
    } else {
        format!("chart {}/{}", app.selected + 1, app.plots.len())
    };

    Paragraph::new(Line::from(vec![
        Span::styled(format!(" {} ", position), Style::default().fg(Color::Cyan)),
        Span::styled(
            " Tab: next  ?: help  q: quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Comparison, CountrySeries};
    use crate::data::Dataset;
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(90, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render_app(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn comparisons() -> Vec<Comparison> {
        Dataset::ALL
            .iter()
            .map(|dataset| Comparison {
                dataset: *dataset,
                window_days: 7,
                series: vec![CountrySeries {
                    country: "Italy".to_string(),
                    points: vec![(1.0, 1.0), (100.0, 20.0)],
                }],
            })
            .collect()
    }

    #[test]
    fn test_render_app_shows_selected_chart_and_status() {
        let app = App::new(&comparisons());
        let content = render_to_string(&app);

        assert!(content.contains("Confirmed cases per country"));
        assert!(content.contains("chart 1/2"));
    }

    #[test]
    fn test_render_app_without_charts() {
        let app = App::new(&[]);
        let content = render_to_string(&app);

        assert!(content.contains("No data to chart"));
        assert!(content.contains("chart 0/0"));
    }

    #[test]
    fn test_render_app_with_help_overlay() {
        let mut app = App::new(&comparisons());
        app.show_help = true;
        let content = render_to_string(&app);

        assert!(content.contains("Keyboard Shortcuts"));
    }
}
