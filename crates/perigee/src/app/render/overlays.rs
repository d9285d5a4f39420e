use ratatui::layout::Rect;

use crate::ui::render_list_overlay;

use super::super::state::App;

/// Render console picker overlay.
pub(super) fn render_quick_select(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let items: Vec<String> = app
        .quick_select
        .items()
        .iter()
        .map(|item| {
            if app.focus.active_console() == Some(item.value.as_str()) {
                format!("{} (active)", item.label)
            } else {
                item.label.clone()
            }
        })
        .collect();
    render_list_overlay(
        frame,
        area,
        " Consoles ",
        &items,
        app.quick_select.selected(),
        None,
    );
}

/// Render file browser overlay.
pub(super) fn render_file_browser(app: &App, frame: &mut ratatui::Frame, area: Rect) {
    let browser = &app.file_browser;
    let items: Vec<String> = browser
        .entries()
        .iter()
        .map(|entry| {
            if entry.is_dir {
                format!("{}/", entry.name)
            } else {
                entry.name.clone()
            }
        })
        .collect();
    let title = format!(" {} ", browser.dir().display());
    let message = items.is_empty().then_some("empty directory");
    render_list_overlay(frame, area, &title, &items, browser.selected(), message);
}
