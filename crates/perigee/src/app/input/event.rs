use crossterm::event::{KeyEvent, KeyEventKind};

use crate::editor::TextSurface;
use crate::events::AppEvent;
use crate::focus::{FocusTarget, KeyRoute};

use super::editor::handle_editor_key;
use super::view::{handle_browser_key, handle_console_key};
use crate::app::state::App;

/// Main event dispatcher.
pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Input(key) => handle_key(app, key),
        AppEvent::Resize(cols, rows) => app.resize(cols, rows),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    let capturing = is_capturing(app);
    match app.focus.route_key(key, capturing) {
        KeyRoute::Handled(effects) => app.apply_effects(effects),
        KeyRoute::View(FocusTarget::Editor) => handle_editor_key(app, key),
        KeyRoute::View(FocusTarget::Console(name)) => handle_console_key(app, &name, key),
        KeyRoute::View(target) => handle_browser_key(app, &target, key),
    }
}

/// Whether the focused view is taking raw text, so global bindings
/// must not fire.
fn is_capturing(app: &App) -> bool {
    match app.focus.focus() {
        FocusTarget::Editor => app.editor.is_editing(),
        FocusTarget::SampleBrowser => app.sample_browser.is_filtering(),
        _ => false,
    }
}
