//! Reusable widget rendering functions.
//!
//! Pure functions that produce ratatui widgets from data.
//! No state mutation happens here.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::layout::centered_rect;

/// First row to draw so that `selected` stays inside `height` rows.
pub fn scroll_offset(selected: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    selected.saturating_sub(height - 1)
}

/// Highlighted list rows, windowed to `height`.
pub fn list_lines<'a>(items: &'a [String], selected: usize, height: usize) -> Vec<Line<'a>> {
    let offset = scroll_offset(selected, height);
    items
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(idx, label)| {
            let style = if idx == selected {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(label.as_str(), style))
        })
        .collect()
}

/// Render a centered list overlay (quick select, file browser).
pub fn render_list_overlay(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: &[String],
    selected: usize,
    message: Option<&str>,
) {
    let overlay_rect = centered_rect(60, 50, area);
    frame.render_widget(Clear, overlay_rect);
    // Border rows.
    let height = usize::from(overlay_rect.height.saturating_sub(2));
    let lines = match message {
        Some(msg) => vec![Line::raw(msg.to_string())],
        None => list_lines(items, selected, height),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .style(Style::default().bg(Color::Black));
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .style(Style::default().bg(Color::Black)),
        overlay_rect,
    );
}
