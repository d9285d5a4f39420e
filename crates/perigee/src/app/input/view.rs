use crossterm::event::{KeyCode, KeyEvent};
use tracing::warn;

use crate::browser::player::play_sample;
use crate::browser::ViewAction;
use crate::focus::FocusTarget;

use crate::app::state::App;

pub(super) fn handle_console_key(app: &mut App, name: &str, key: KeyEvent) {
    // Border rows.
    let page = app
        .layout
        .console
        .map_or(1, |rect| usize::from(rect.height.saturating_sub(2)).max(1));
    let Some(console) = app.console_mut(name) else {
        return;
    };
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => console.scroll_up(1),
        KeyCode::Down | KeyCode::Char('j') => console.scroll_down(1),
        KeyCode::PageUp => console.scroll_up(page),
        KeyCode::PageDown => console.scroll_down(page),
        KeyCode::End | KeyCode::Char('G') => console.scroll_to_bottom(),
        KeyCode::Char('c') => console.reset(),
        _ => {}
    }
}

pub(super) fn handle_browser_key(app: &mut App, target: &FocusTarget, key: KeyEvent) {
    let action = match target {
        FocusTarget::QuickSelect => app.quick_select.handle_key(key),
        FocusTarget::FileBrowser => app.file_browser.handle_key(key),
        FocusTarget::SampleBrowser => app.sample_browser.handle_key(key),
        FocusTarget::Editor | FocusTarget::Console(_) => ViewAction::None,
    };
    apply_view_action(app, action);
}

fn apply_view_action(app: &mut App, action: ViewAction) {
    match action {
        ViewAction::None => {}
        ViewAction::Close => {
            let effects = app.focus.close_view();
            app.apply_effects(effects);
        }
        ViewAction::SelectConsole(name) => {
            let effects = app.focus.show_console(&name);
            app.apply_effects(effects);
        }
        ViewAction::OpenFile(path) => {
            let effects = app.focus.focus_editor();
            app.apply_effects(effects);
            match app.editor.load(&path) {
                Ok(()) => app.set_output(format!("opened {}", path.display())),
                Err(err) => {
                    warn!("failed to open {}: {err}", path.display());
                    app.set_output(format!("failed to open {}: {err}", path.display()));
                }
            }
        }
        ViewAction::PlaySample(path) => {
            let player = &app.config.player;
            let message = match play_sample(&player.command, &player.args, &path) {
                Ok(()) => format!("playing {}", path.display()),
                Err(err) => {
                    warn!("failed to play {}: {err}", path.display());
                    format!("failed to play {}: {err}", path.display())
                }
            };
            app.set_output(message);
        }
    }
}
