//! Key chord parsing and matching.
//!
//! Parses key chord strings like "ctrl+t" or "alt+shift+p" from config
//! and matches them against crossterm KeyEvents at runtime. [`Keymap`]
//! resolves a key event to the global or editor action bound to it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::config::KeymapConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub key: KeyCode,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

pub fn parse_key_chord(input: &str) -> Option<KeyChord> {
    let trimmed = input.trim().to_lowercase();
    if trimmed.is_empty() {
        return None;
    }

    // A lone "+" is a key, not a separator.
    if trimmed == "+" {
        return Some(plain(KeyCode::Char('+')));
    }

    let parts: Vec<&str> = trimmed
        .split('+')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        return None;
    }

    let mut chord = plain(KeyCode::Null);

    for part in parts {
        match part {
            "ctrl" | "control" => chord.ctrl = true,
            "alt" | "option" => chord.alt = true,
            "shift" => chord.shift = true,
            "meta" | "cmd" | "super" => chord.meta = true,
            key => {
                if chord.key != KeyCode::Null {
                    return None;
                }
                chord.key = parse_key(key)?;
            }
        }
    }

    if chord.key == KeyCode::Null {
        return None;
    }

    Some(chord)
}

fn plain(key: KeyCode) -> KeyChord {
    KeyChord {
        key,
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    }
}

fn parse_key(key: &str) -> Option<KeyCode> {
    match key {
        "esc" | "escape" => Some(KeyCode::Esc),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        "backspace" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "space" | "spacebar" => Some(KeyCode::Char(' ')),
        _ => {
            if let Some(number) = key.strip_prefix('f') {
                if let Ok(n) = number.parse::<u8>() {
                    return (1..=12).contains(&n).then_some(KeyCode::F(n));
                }
            }
            let mut chars = key.chars();
            let first = chars.next()?;
            if chars.next().is_none() {
                Some(KeyCode::Char(first))
            } else {
                None
            }
        }
    }
}

/// Legacy terminals report some control chords as a digit: the byte for
/// ctrl+/ and ctrl+_ (0x1f) arrives as ctrl+7, 0x1c as ctrl+4, and so on.
fn legacy_control_digit(ch: char) -> Option<char> {
    match ch {
        '\\' => Some('4'),
        ']' => Some('5'),
        '^' => Some('6'),
        '/' | '_' => Some('7'),
        _ => None,
    }
}

pub fn matches_chord(event: KeyEvent, chord: &KeyChord) -> bool {
    let modifiers = event.modifiers;
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);
    let shift = modifiers.contains(KeyModifiers::SHIFT);
    let meta = modifiers.contains(KeyModifiers::SUPER) || modifiers.contains(KeyModifiers::META);

    let key_matches = match (event.code, chord.key) {
        (KeyCode::Char(got), KeyCode::Char(want)) => {
            got.eq_ignore_ascii_case(&want)
                || (chord.ctrl && legacy_control_digit(want) == Some(got))
        }
        (got, want) => got == want,
    };
    if !key_matches {
        return false;
    }

    // Shifted characters ("?", "A") carry SHIFT implicitly; only enforce it
    // when the chord names a letter or a non-character key.
    let shift_matters = match chord.key {
        KeyCode::Char(ch) => ch.is_ascii_alphabetic() || chord.shift,
        _ => true,
    };

    ctrl == chord.ctrl
        && alt == chord.alt
        && meta == chord.meta
        && (!shift_matters || shift == chord.shift)
}

/// Global actions handled by the focus controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    FocusEditor,
    FocusConsole,
    ToggleConsole(String),
    FocusQuickSelect,
    FocusFileBrowser,
    ToggleSampleBrowser,
    ToggleVisuals,
}

/// Actions that only apply while the editor has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    EvalBlock,
    Hush,
    Save,
    ToggleComment,
}

#[derive(Debug, Clone, Default)]
pub struct Keymap {
    actions: Vec<(KeyChord, Action)>,
    editor: Vec<(KeyChord, EditorAction)>,
}

impl Keymap {
    pub fn from_config(config: &KeymapConfig) -> Self {
        let mut keymap = Self::default();
        let global = [
            (&config.quit, Action::Quit),
            (&config.focus_editor, Action::FocusEditor),
            (&config.focus_console, Action::FocusConsole),
            (
                &config.toggle_tidal_console,
                Action::ToggleConsole("tidal".to_string()),
            ),
            (
                &config.toggle_sclang_console,
                Action::ToggleConsole("sclang".to_string()),
            ),
            (
                &config.toggle_osc_console,
                Action::ToggleConsole("osc".to_string()),
            ),
            (&config.focus_quick_select, Action::FocusQuickSelect),
            (&config.focus_file_browser, Action::FocusFileBrowser),
            (&config.toggle_sample_browser, Action::ToggleSampleBrowser),
            (&config.toggle_visuals, Action::ToggleVisuals),
        ];
        for (chord, action) in global {
            match parse_key_chord(chord) {
                Some(parsed) => keymap.actions.push((parsed, action)),
                None => warn!("ignoring unparsable key binding {chord:?} for {action:?}"),
            }
        }

        let editor = [
            (&config.eval_block, EditorAction::EvalBlock),
            (&config.hush, EditorAction::Hush),
            (&config.save, EditorAction::Save),
            (&config.toggle_comment, EditorAction::ToggleComment),
        ];
        for (chord, action) in editor {
            match parse_key_chord(chord) {
                Some(parsed) => keymap.editor.push((parsed, action)),
                None => warn!("ignoring unparsable key binding {chord:?} for {action:?}"),
            }
        }
        keymap
    }

    pub fn action_for(&self, event: KeyEvent) -> Option<Action> {
        self.actions
            .iter()
            .find(|(chord, _)| matches_chord(event, chord))
            .map(|(_, action)| action.clone())
    }

    pub fn editor_action_for(&self, event: KeyEvent) -> Option<EditorAction> {
        self.editor
            .iter()
            .find(|(chord, _)| matches_chord(event, chord))
            .map(|(_, action)| *action)
    }
}
