//! Application state types and core data structures.
//!
//! Defines the App struct which holds all mutable application state.
//! Only the event loop thread touches it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use ratatui::layout::Rect;

use crate::browser::{FileBrowser, QuickSelect, SampleBrowser};
use crate::config::Config;
use crate::console::Console;
use crate::focus::{Effects, FocusController, FocusTarget, OSC_CONSOLE};
use crate::router::OutputRouter;
use crate::session::ProcessSession;
use crate::ui::{compute_panels, PanelLayout, PanelVisibility};
use crate::visuals::VisualRegistry;

pub const TIDAL: &str = "tidal";
pub const SCLANG: &str = "sclang";

/// Console names and titles, in quick-select order.
pub const CONSOLES: [(&str, &str); 3] = [(TIDAL, "Tidal"), (SCLANG, "SCLang"), (OSC_CONSOLE, "OSC")];

/// Main application state container.
///
/// Methods are split across runner.rs (construction, startup),
/// input (event handling) and render (UI drawing).
pub struct App {
    pub config: Config,
    pub cwd: PathBuf,
    pub focus: FocusController,
    pub editor: crate::editor::LineEditor,
    pub sessions: BTreeMap<String, ProcessSession>,
    pub consoles: Vec<Console>,
    pub router: OutputRouter,
    pub visuals: VisualRegistry,
    pub quick_select: QuickSelect,
    pub file_browser: FileBrowser,
    pub sample_browser: SampleBrowser,
    pub area: Rect,
    pub layout: PanelLayout,
    pub output: Option<String>,
    pub should_quit: bool,
}

impl App {
    /// Set the message shown in the status line.
    pub fn set_output(&mut self, message: String) {
        let trimmed = message.trim().to_string();
        if trimmed.is_empty() {
            self.output = None;
        } else {
            self.output = Some(trimmed);
        }
    }

    pub fn console(&self, name: &str) -> Option<&Console> {
        self.consoles.iter().find(|console| console.name() == name)
    }

    pub fn console_mut(&mut self, name: &str) -> Option<&mut Console> {
        self.consoles
            .iter_mut()
            .find(|console| console.name() == name)
    }

    /// Panel title for a console: the pid of its running interpreter, or
    /// the overflow count for a lossy network source.
    pub fn console_title(&self, console: &Console) -> String {
        let name = console.name();
        if let Some(pid) = self.sessions.get(name).and_then(ProcessSession::pid) {
            return format!("{} (pid {pid})", console.title());
        }
        match self.router.dropped(name) {
            0 => console.title().to_string(),
            dropped => format!("{} ({dropped} dropped)", console.title()),
        }
    }

    /// The session editor commands go to, picked by file extension:
    /// `.scd` buffers talk to sclang, everything else to Tidal.
    pub fn eval_target(&self) -> &'static str {
        let is_sclang = self
            .editor
            .path()
            .and_then(|path| path.extension())
            .is_some_and(|ext| ext == "scd");
        if is_sclang {
            SCLANG
        } else {
            TIDAL
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.area = Rect::new(0, 0, width, height);
        self.relayout();
    }

    /// Recompute panels from the focus state and push the result into
    /// the views that depend on it.
    pub fn relayout(&mut self) {
        let visible = PanelVisibility {
            console: self.focus.active_console().is_some(),
            visuals: self.focus.visuals_overlay(),
            samples: self.focus.sample_browser_open(),
        };
        self.layout = compute_panels(self.area, visible);

        if let Some(rect) = self.layout.visuals {
            // Inside the border.
            self.visuals
                .set_size(rect.width.saturating_sub(2), rect.height.saturating_sub(2));
        }
        let active = self.focus.active_console().map(str::to_string);
        for console in &mut self.consoles {
            let visible = active.as_deref() == Some(console.name());
            console.set_visible(visible);
        }
        self.router
            .set_armed(OSC_CONSOLE, self.focus.network_drained());
    }

    pub fn apply_effects(&mut self, effects: Effects) {
        if effects.quit {
            self.should_quit = true;
        }
        if effects.reset_visuals {
            self.visuals.reset();
        }
        if let Some(status) = effects.status {
            self.set_output(status);
        }
        if self.focus.sample_browser_open() {
            self.sample_browser.ensure_loaded();
        }
        if *self.focus.focus() == FocusTarget::FileBrowser {
            self.file_browser.refresh();
        }
        if effects.relayout {
            self.relayout();
        }
    }

    /// Stop every interpreter. Called once on the way out.
    pub fn shutdown(&mut self) {
        for session in self.sessions.values_mut() {
            session.stop();
        }
    }
}
