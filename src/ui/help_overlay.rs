//! Help overlay listing the chart viewer's key bindings
//!
//! The rows come from `app::CHART_KEYS` and `app::OTHER_KEYS`, so the overlay
//! always shows what `App::handle_key` understands.

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{KeyBinding, CHART_KEYS, OTHER_KEYS};

const OVERLAY_WIDTH: u16 = 50;

/// Renders the help overlay centered over the current view
pub fn render(frame: &mut Frame) {
    let lines = help_lines();
    // Two rows for the border
    let height = lines.len() as u16 + 2;
    let area = centered_rect(OVERLAY_WIDTH, height, frame.area());

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

fn help_lines() -> Vec<Line<'static>> {
    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)))
    };
    let hint = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        heading("Charts"),
    ];
    lines.extend(CHART_KEYS.iter().map(binding_line));
    lines.push(Line::from(""));
    lines.push(heading("Other"));
    lines.extend(OTHER_KEYS.iter().map(binding_line));
    lines.push(Line::from(""));
    lines.push(hint("Axes are log10; points at zero are hidden"));
    lines.push(hint("Press Esc or ? to close"));
    lines
}

fn binding_line(binding: &KeyBinding) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {:<12}", binding.keys),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(binding.action),
    ])
}

/// Centers a `width` x `height` rect in `area`, shrinking it to fit
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}
