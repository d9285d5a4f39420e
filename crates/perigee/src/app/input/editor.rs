use crossterm::event::KeyEvent;
use tracing::{debug, warn};

use crate::editor::{block_text, toggle_comment, TextSurface};
use crate::keymap::EditorAction;

use crate::app::state::App;

/// Editor commands fire only in normal mode; insert mode takes every key
/// as text.
pub(super) fn handle_editor_key(app: &mut App, key: KeyEvent) {
    if !app.editor.is_editing() {
        if let Some(action) = app.focus.keymap().editor_action_for(key) {
            run_editor_action(app, action);
            return;
        }
    }
    app.editor.handle_key(key);
}

pub(super) fn run_editor_action(app: &mut App, action: EditorAction) {
    debug!(?action, "editor action");
    match action {
        EditorAction::EvalBlock => eval_block(app),
        EditorAction::Hush => hush(app),
        EditorAction::Save => match app.editor.save() {
            Ok(path) => app.set_output(format!("saved {}", path.display())),
            Err(err) => {
                warn!("save failed: {err}");
                app.set_output(format!("save failed: {err}"));
            }
        },
        EditorAction::ToggleComment => {
            let prefix = app
                .sessions
                .get(app.eval_target())
                .map_or("-- ", |session| session.profile().comment_prefix());
            let (row, _) = app.editor.cursor_position();
            toggle_comment(&mut app.editor, row, prefix);
        }
    }
}

fn eval_block(app: &mut App) {
    let (row, _) = app.editor.cursor_position();
    let Some(text) = block_text(app.editor.lines(), row) else {
        app.set_output("nothing to evaluate".to_string());
        return;
    };
    let target = app.eval_target();
    let message = match send_to(app, target, &text) {
        Ok(()) => format!("sent to {target}"),
        Err(message) => message,
    };
    app.set_output(message);
}

fn hush(app: &mut App) {
    let target = app.eval_target();
    let command = app
        .sessions
        .get(target)
        .and_then(|session| session.profile().hush_command());
    let Some(command) = command else {
        app.set_output(format!("{target} has no hush command"));
        return;
    };
    let message = match send_to(app, target, command) {
        Ok(()) => "hush".to_string(),
        Err(message) => message,
    };
    app.set_output(message);
}

fn send_to(app: &mut App, target: &str, text: &str) -> Result<(), String> {
    let Some(session) = app.sessions.get_mut(target) else {
        return Err(format!("{target} is disabled"));
    };
    session.send(text).map_err(|err| {
        warn!("{err}");
        err.to_string()
    })
}
