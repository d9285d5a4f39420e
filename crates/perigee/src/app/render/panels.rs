use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::editor::TextSurface;
use crate::focus::FocusTarget;
use crate::ui::scroll_offset;

use super::super::state::App;

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Render the editor buffer and place the cursor when it has focus.
pub(super) fn render_editor(app: &mut App, frame: &mut ratatui::Frame, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let focused = *app.focus.focus() == FocusTarget::Editor;
    let title = app
        .editor
        .path()
        .and_then(|path| path.file_name())
        .map_or_else(|| "untitled".to_string(), |name| name.to_string_lossy().to_string());
    let title = if app.editor.is_dirty() {
        format!(" {title} [+] ")
    } else {
        format!(" {title} ")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style(focused));
    let inner = block.inner(area);

    let scroll = app.editor.scroll_for(usize::from(inner.height));
    // One cell per char keeps cursor columns honest.
    let lines: Vec<Line> = app
        .editor
        .lines()
        .iter()
        .skip(scroll)
        .take(usize::from(inner.height))
        .map(|line| Line::raw(line.replace('\t', " ")))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);

    if focused {
        let (row, col) = app.editor.cursor_position();
        let y = row.saturating_sub(scroll);
        if y < usize::from(inner.height) && col < usize::from(inner.width) {
            frame.set_cursor_position(Position::new(
                inner.x + col as u16,
                inner.y + y as u16,
            ));
        }
    }
}

/// Render the active console, newest output at the bottom.
pub(super) fn render_console(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let Some(name) = app.focus.active_console() else {
        return;
    };
    let Some(console) = app.console(name) else {
        return;
    };
    let focused = matches!(app.focus.focus(), FocusTarget::Console(_));
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.console_title(console)))
        .border_style(border_style(focused));
    let inner = block.inner(area);
    let lines: Vec<Line> = console
        .view(usize::from(inner.height))
        .iter()
        .map(|line| Line::raw(line.as_str()))
        .collect();
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .style(Style::default().fg(Color::Gray)),
        area,
    );
}

/// Render the selected visual inside a bordered panel.
pub(super) fn render_visuals(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let name = app.visuals.selected_name().unwrap_or("none");
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Visuals: {name} "))
        .border_style(border_style(false));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if let Some(visual) = app.visuals.selected() {
        visual.render(inner, frame.buffer_mut());
    }
}

/// Render the sample list with its filter prompt.
pub(super) fn render_samples(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let browser = &app.sample_browser;
    let focused = *app.focus.focus() == FocusTarget::SampleBrowser;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Samples ({}) ", browser.visible_len()))
        .border_style(border_style(focused));
    let inner = block.inner(area);

    let mut lines = Vec::new();
    let prompt_style = if browser.is_filtering() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::from(Span::styled(
        format!("/{}", browser.query()),
        prompt_style,
    )));

    let rows = usize::from(inner.height.saturating_sub(1));
    let offset = scroll_offset(browser.selected(), rows);
    let dim = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::DIM);
    for (idx, sample) in browser.visible().enumerate().skip(offset).take(rows) {
        let name_style = if idx == browser.selected() {
            Style::default().fg(Color::Black).bg(Color::White)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<16}", sample.reference), name_style),
            Span::styled(format!(" {:>4} {:>8}", sample.kind, sample.size), dim),
        ]));
    }
    if browser.is_scanning() {
        lines.push(Line::from(Span::styled(
            format!("scanning {}", browser.root().display()),
            dim,
        )));
    } else if browser.visible_len() == 0 {
        lines.push(Line::from(Span::styled(
            format!("no samples under {}", browser.root().display()),
            dim,
        )));
    }
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Render the status line: mode, file, eval target and last message.
pub(super) fn render_status(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let mode = app.editor.mode().label();
    let mode_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::DIM);

    let mut spans = vec![
        Span::styled(format!(" {mode} "), mode_style),
        Span::styled(format!(" {} ", app.eval_target()), dim),
    ];
    if let Some(output) = &app.output {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            output.lines().next().unwrap_or_default().to_string(),
            Style::default().fg(Color::Gray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
