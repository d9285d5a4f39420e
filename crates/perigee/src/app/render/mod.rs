//! UI rendering methods.
//!
//! Handles all drawing for the TUI:
//! - Panels (editor, visuals, sample browser, console, status line)
//! - Overlays (quick select, file browser)

mod overlays;
mod panels;

use crate::focus::FocusTarget;

use super::state::App;

/// Main render entry point. Called each frame by the event loop.
pub fn render(app: &mut App, frame: &mut ratatui::Frame) {
    let area = frame.area();
    if area != app.area {
        app.resize(area.width, area.height);
    }
    let layout = app.layout;

    panels::render_editor(app, frame, layout.editor);
    if let Some(rect) = layout.visuals {
        panels::render_visuals(app, frame, rect);
    }
    if let Some(rect) = layout.samples {
        panels::render_samples(app, frame, rect);
    }
    if let Some(rect) = layout.console {
        panels::render_console(app, frame, rect);
    }
    panels::render_status(app, frame, layout.status);

    // Render overlays on top if focused
    match app.focus.focus() {
        FocusTarget::QuickSelect => overlays::render_quick_select(app, frame, area),
        FocusTarget::FileBrowser => overlays::render_file_browser(app, frame, area),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tempfile::TempDir;

    use super::render;
    use crate::app::state::App;
    use crate::config::Config;
    use crate::editor::LineEditor;
    use crate::focus::OSC_CONSOLE;
    use crate::keymap::Action;
    use crate::queue::line_queue;
    use crate::router::SourceKind;

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app(dir: &TempDir) -> App {
        let mut config = Config::default();
        config.tidal.enabled = false;
        config.sclang.enabled = false;
        config.osc.enabled = false;
        App::new(config, dir.path().to_path_buf(), None)
    }

    #[test]
    fn draws_editor_text_and_status() {
        let dir = TempDir::new().expect("tempdir");
        let mut app = app(&dir);
        app.editor = LineEditor::from_text("d1 $ s \"bd*2\"\n");
        app.set_output("ready".to_string());

        let mut terminal = Terminal::new(TestBackend::new(60, 30)).expect("terminal");
        terminal
            .draw(|frame| render(&mut app, frame))
            .expect("draw");
        let text = screen(&terminal);

        assert!(text.contains("d1 $ s \"bd*2\""));
        assert!(text.contains("NORMAL"));
        assert!(text.contains("ready"));
    }

    #[test]
    fn console_and_quick_select_appear_when_opened() {
        let dir = TempDir::new().expect("tempdir");
        let mut app = app(&dir);
        // The tidal console starts visible.
        if let Some(console) = app.console_mut("tidal") {
            console.push("tidal> loaded");
        }
        let effects = app.focus.apply(Action::FocusQuickSelect);
        app.apply_effects(effects);

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).expect("terminal");
        terminal
            .draw(|frame| render(&mut app, frame))
            .expect("draw");
        let text = screen(&terminal);

        assert!(text.contains("tidal> loaded"));
        assert!(text.contains("Consoles"));
        assert!(text.contains("SCLang"));
    }

    #[test]
    fn osc_console_title_counts_dropped_messages() {
        let dir = TempDir::new().expect("tempdir");
        let mut app = app(&dir);
        let (tx, sub) = line_queue(OSC_CONSOLE, 1);
        app.router.attach(sub, SourceKind::Network);
        tx.offer("/play ,s bd".to_string());
        tx.offer("/play ,s sn".to_string());
        tx.offer("/play ,s hh".to_string());

        let effects = app.focus.show_console(OSC_CONSOLE);
        app.apply_effects(effects);

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).expect("terminal");
        terminal
            .draw(|frame| render(&mut app, frame))
            .expect("draw");
        assert!(screen(&terminal).contains(" OSC (2 dropped) "));
    }
}
