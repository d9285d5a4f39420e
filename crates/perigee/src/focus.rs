//! Input focus state machine.
//!
//! Exactly one view owns the keyboard at a time. Global bindings are
//! resolved here before a key reaches that view, except while the focused
//! view is capturing text (the editor in insert mode, a filter prompt):
//! then every key, including quit, goes straight to the view.

use crossterm::event::KeyEvent;
use tracing::debug;

use crate::keymap::{Action, Keymap};

pub const DEFAULT_CONSOLE: &str = "tidal";
pub const OSC_CONSOLE: &str = "osc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget {
    Editor,
    Console(String),
    QuickSelect,
    FileBrowser,
    SampleBrowser,
}

/// What the orchestrator must do after a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects {
    pub relayout: bool,
    pub quit: bool,
    pub reset_visuals: bool,
    pub status: Option<String>,
}

impl Effects {
    fn relayout() -> Self {
        Self {
            relayout: true,
            ..Self::default()
        }
    }

    fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRoute {
    /// A global binding consumed the key.
    Handled(Effects),
    /// Deliver the key to the focused view.
    View(FocusTarget),
}

#[derive(Debug)]
pub struct FocusController {
    keymap: Keymap,
    consoles: Vec<String>,
    focus: FocusTarget,
    active_console: Option<String>,
    sample_browser_open: bool,
    visuals_overlay: bool,
    visuals_started: bool,
}

impl FocusController {
    /// Starts on the editor with the default console visible.
    pub fn new(keymap: Keymap, consoles: &[&str]) -> Self {
        let consoles: Vec<String> = consoles.iter().map(|name| name.to_string()).collect();
        let active_console = consoles
            .iter()
            .find(|name| name.as_str() == DEFAULT_CONSOLE)
            .cloned();
        Self {
            keymap,
            consoles,
            focus: FocusTarget::Editor,
            active_console,
            sample_browser_open: false,
            visuals_overlay: false,
            visuals_started: false,
        }
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn focus(&self) -> &FocusTarget {
        &self.focus
    }

    pub fn active_console(&self) -> Option<&str> {
        self.active_console.as_deref()
    }

    pub fn sample_browser_open(&self) -> bool {
        self.sample_browser_open
    }

    pub fn visuals_overlay(&self) -> bool {
        self.visuals_overlay
    }

    /// The network source is drained while its console is visible or the
    /// visuals overlay is consuming it.
    pub fn network_drained(&self) -> bool {
        self.visuals_overlay || self.active_console.as_deref() == Some(OSC_CONSOLE)
    }

    /// Decide who gets `event`. `capturing` is the focused view's report
    /// that it is taking raw text input.
    pub fn route_key(&mut self, event: KeyEvent, capturing: bool) -> KeyRoute {
        if capturing {
            return KeyRoute::View(self.focus.clone());
        }
        match self.keymap.action_for(event) {
            Some(action) => KeyRoute::Handled(self.apply(action)),
            None => KeyRoute::View(self.focus.clone()),
        }
    }

    pub fn apply(&mut self, action: Action) -> Effects {
        debug!(?action, focus = ?self.focus, "focus action");
        match action {
            Action::Quit => Effects {
                quit: true,
                ..Effects::default()
            },
            Action::FocusEditor => self.focus_editor(),
            Action::FocusConsole => {
                let name = match &self.active_console {
                    Some(name) => name.clone(),
                    None => {
                        self.active_console = Some(DEFAULT_CONSOLE.to_string());
                        DEFAULT_CONSOLE.to_string()
                    }
                };
                self.focus = FocusTarget::Console(name.clone());
                Effects::relayout().with_status(name)
            }
            Action::ToggleConsole(name) => self.toggle_console(&name),
            Action::FocusQuickSelect => {
                self.focus = FocusTarget::QuickSelect;
                Effects::relayout()
            }
            Action::FocusFileBrowser => {
                self.focus = FocusTarget::FileBrowser;
                Effects::relayout().with_status("file browser")
            }
            Action::ToggleSampleBrowser => {
                self.sample_browser_open = !self.sample_browser_open;
                if self.sample_browser_open {
                    self.focus = FocusTarget::SampleBrowser;
                    Effects::relayout().with_status("sample browser")
                } else {
                    self.focus = FocusTarget::Editor;
                    Effects::relayout()
                }
            }
            Action::ToggleVisuals => {
                self.visuals_overlay = !self.visuals_overlay;
                let mut effects = Effects::relayout();
                if self.visuals_overlay {
                    effects.reset_visuals = !self.visuals_started;
                    self.visuals_started = true;
                    effects.status = Some("visuals enabled".to_string());
                }
                effects
            }
        }
    }

    /// Focus the editor. Quick select and the file browser only exist
    /// while focused, so this closes them too.
    pub fn focus_editor(&mut self) -> Effects {
        self.focus = FocusTarget::Editor;
        Effects::relayout().with_status("")
    }

    /// Close the focused view. The sample browser also hides its panel.
    pub fn close_view(&mut self) -> Effects {
        if self.focus == FocusTarget::SampleBrowser {
            self.sample_browser_open = false;
        }
        self.focus_editor()
    }

    /// Show `name` without toggling, as picked from quick select.
    pub fn show_console(&mut self, name: &str) -> Effects {
        if !self.consoles.iter().any(|known| known == name) {
            return Effects::default().with_status(format!("no console named {name}"));
        }
        self.active_console = Some(name.to_string());
        self.focus = FocusTarget::Console(name.to_string());
        Effects::relayout().with_status(name)
    }

    fn toggle_console(&mut self, name: &str) -> Effects {
        if !self.consoles.iter().any(|known| known == name) {
            return Effects::default().with_status(format!("no console named {name}"));
        }
        if self.active_console.as_deref() == Some(name) {
            self.active_console = None;
            return self.focus_editor();
        }
        self.active_console = Some(name.to_string());
        self.focus = FocusTarget::Console(name.to_string());
        Effects::relayout().with_status(name)
    }
}

#[cfg(test)]
mod tests {
    use super::{Effects, FocusController, FocusTarget, KeyRoute, DEFAULT_CONSOLE};
    use crate::config::KeymapConfig;
    use crate::keymap::{Action, Keymap};
    use crate::test_utils::{ctrl, key};
    use crossterm::event::KeyCode;

    fn keymap() -> Keymap {
        Keymap::from_config(&KeymapConfig {
            quit: "ctrl+c".to_string(),
            focus_editor: "esc".to_string(),
            focus_console: "2".to_string(),
            toggle_tidal_console: "ctrl+t".to_string(),
            toggle_sclang_console: "ctrl+l".to_string(),
            toggle_osc_console: "ctrl+o".to_string(),
            focus_quick_select: "ctrl+g".to_string(),
            focus_file_browser: "ctrl+f".to_string(),
            toggle_sample_browser: "ctrl+w".to_string(),
            toggle_visuals: "ctrl+p".to_string(),
            eval_block: "ctrl+e".to_string(),
            hush: "ctrl+h".to_string(),
            save: "ctrl+s".to_string(),
            toggle_comment: "ctrl+/".to_string(),
        })
    }

    fn controller() -> FocusController {
        FocusController::new(keymap(), &["tidal", "sclang", "osc"])
    }

    fn toggle(name: &str) -> Action {
        Action::ToggleConsole(name.to_string())
    }

    #[test]
    fn starts_on_editor_with_default_console_visible() {
        let focus = controller();
        assert_eq!(focus.focus(), &FocusTarget::Editor);
        assert_eq!(focus.active_console(), Some(DEFAULT_CONSOLE));
        assert!(!focus.network_drained());
    }

    #[test]
    fn toggling_active_console_hides_it_and_returns_to_editor() {
        let mut focus = controller();
        let effects = focus.apply(toggle("tidal"));
        assert!(effects.relayout);
        assert_eq!(focus.active_console(), None);
        assert_eq!(focus.focus(), &FocusTarget::Editor);
    }

    #[test]
    fn toggling_another_console_switches_to_it() {
        let mut focus = controller();
        focus.apply(toggle("sclang"));
        assert_eq!(focus.active_console(), Some("sclang"));
        assert_eq!(focus.focus(), &FocusTarget::Console("sclang".to_string()));

        focus.apply(toggle("sclang"));
        assert_eq!(focus.active_console(), None);
        assert_eq!(focus.focus(), &FocusTarget::Editor);

        focus.apply(toggle("osc"));
        assert_eq!(focus.focus(), &FocusTarget::Console("osc".to_string()));
        assert!(focus.network_drained());
    }

    #[test]
    fn unknown_console_changes_nothing() {
        let mut focus = controller();
        let effects = focus.apply(toggle("midi"));
        assert!(!effects.relayout);
        assert_eq!(effects.status.as_deref(), Some("no console named midi"));
        assert_eq!(focus.active_console(), Some("tidal"));
    }

    #[test]
    fn focus_console_shows_default_when_none_visible() {
        let mut focus = controller();
        focus.apply(toggle("tidal"));
        assert_eq!(focus.active_console(), None);

        focus.apply(Action::FocusConsole);
        assert_eq!(focus.active_console(), Some("tidal"));
        assert_eq!(focus.focus(), &FocusTarget::Console("tidal".to_string()));
    }

    #[test]
    fn insert_mode_guard_beats_every_binding() {
        let mut focus = controller();
        assert_eq!(
            focus.route_key(ctrl('c'), true),
            KeyRoute::View(FocusTarget::Editor)
        );
        assert_eq!(
            focus.route_key(key(KeyCode::Char('2')), true),
            KeyRoute::View(FocusTarget::Editor)
        );

        match focus.route_key(ctrl('c'), false) {
            KeyRoute::Handled(effects) => assert!(effects.quit),
            other => panic!("expected quit, got {other:?}"),
        }
    }

    #[test]
    fn unbound_keys_go_to_the_focused_view() {
        let mut focus = controller();
        focus.apply(Action::FocusFileBrowser);
        assert_eq!(
            focus.route_key(key(KeyCode::Down), false),
            KeyRoute::View(FocusTarget::FileBrowser)
        );
        assert!(matches!(
            focus.route_key(key(KeyCode::Esc), false),
            KeyRoute::Handled(Effects { relayout: true, .. })
        ));
        assert_eq!(focus.focus(), &FocusTarget::Editor);
    }

    #[test]
    fn sample_browser_toggle_moves_focus_both_ways() {
        let mut focus = controller();
        focus.apply(Action::ToggleSampleBrowser);
        assert!(focus.sample_browser_open());
        assert_eq!(focus.focus(), &FocusTarget::SampleBrowser);

        focus.apply(Action::ToggleSampleBrowser);
        assert!(!focus.sample_browser_open());
        assert_eq!(focus.focus(), &FocusTarget::Editor);
    }

    #[test]
    fn closing_sample_browser_view_hides_panel() {
        let mut focus = controller();
        focus.apply(Action::ToggleSampleBrowser);
        focus.close_view();
        assert!(!focus.sample_browser_open());
        assert_eq!(focus.focus(), &FocusTarget::Editor);
    }

    #[test]
    fn visuals_overlay_keeps_focus_and_resets_once() {
        let mut focus = controller();
        focus.apply(toggle("sclang"));

        let first = focus.apply(Action::ToggleVisuals);
        assert!(first.reset_visuals);
        assert!(focus.visuals_overlay());
        assert!(focus.network_drained());
        assert_eq!(focus.focus(), &FocusTarget::Console("sclang".to_string()));

        let off = focus.apply(Action::ToggleVisuals);
        assert!(!off.reset_visuals);
        assert!(!focus.network_drained());

        let again = focus.apply(Action::ToggleVisuals);
        assert!(!again.reset_visuals);
    }

    #[test]
    fn show_console_never_toggles_off() {
        let mut focus = controller();
        focus.show_console("tidal");
        focus.show_console("tidal");
        assert_eq!(focus.active_console(), Some("tidal"));
        assert_eq!(focus.focus(), &FocusTarget::Console("tidal".to_string()));
    }

    #[test]
    fn exactly_one_target_after_any_sequence() {
        let mut focus = controller();
        let actions = [
            Action::FocusQuickSelect,
            toggle("osc"),
            Action::ToggleSampleBrowser,
            Action::FocusFileBrowser,
            Action::FocusEditor,
            Action::FocusConsole,
            Action::ToggleVisuals,
        ];
        for action in actions {
            focus.apply(action);
            // The focused console is always the visible one.
            if let FocusTarget::Console(name) = focus.focus() {
                assert_eq!(focus.active_console(), Some(name.as_str()));
            }
        }
        assert_eq!(focus.focus(), &FocusTarget::Console("osc".to_string()));
    }
}
