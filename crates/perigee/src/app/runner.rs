//! Application runner and event loop.
//!
//! Handles terminal setup/teardown and the main event loop.
//! Events are read from an mpsc channel and dispatched to handlers;
//! between events the loop drains interpreter and OSC output on a
//! fixed tick so animations keep moving while the keyboard is idle.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use tracing::{info, warn};

use crate::browser::{FileBrowser, QuickSelect, SampleBrowser};
use crate::config::{Config, InterpreterConfig};
use crate::console::Console;
use crate::editor::LineEditor;
use crate::events::AppEvent;
use crate::focus::{FocusController, OSC_CONSOLE};
use crate::keymap::Keymap;
use crate::osc::spawn_listener;
use crate::queue::{line_queue, QUEUE_CAPACITY};
use crate::router::{OutputRouter, SourceKind};
use crate::session::boot::expand_home;
use crate::session::{resolve_boot_file, InterpreterProfile, ProcessSession};
use crate::ui::{compute_panels, PanelVisibility};
use crate::visuals::VisualRegistry;

use super::state::{App, CONSOLES, SCLANG, TIDAL};

/// Roughly 30 frames a second.
const TICK: Duration = Duration::from_millis(33);

/// Entry point: set up terminal and run the event loop.
pub fn run(config: Config, file: Option<PathBuf>) -> io::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut app = App::new(config, cwd, file);

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(PushKeyboardEnhancementFlags(
        KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
            | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS,
    ))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);
    app.shutdown();

    disable_raw_mode()?;
    terminal
        .backend_mut()
        .execute(PopKeyboardEnhancementFlags)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main event loop: process events until quit.
fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    spawn_input_thread(event_tx);

    let size = terminal.size()?;
    app.resize(size.width, size.height);
    app.start_background();

    terminal.clear()?;
    terminal.draw(|frame| super::render::render(app, frame))?;

    while !app.should_quit {
        match event_rx.recv_timeout(TICK) {
            Ok(event) => super::input::handle_event(app, event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        // Drain any pending events before redraw
        while let Ok(event) = event_rx.try_recv() {
            super::input::handle_event(app, event);
        }
        if app.should_quit {
            break;
        }

        super::output::pump_output(app);
        app.sample_browser.poll_scan();
        app.visuals.tick(Instant::now());
        terminal.draw(|frame| super::render::render(app, frame))?;
    }
    Ok(())
}

/// Spawn a thread to read terminal input events.
fn spawn_input_thread(sender: Sender<AppEvent>) {
    std::thread::spawn(move || loop {
        match event::read() {
            Ok(Event::Key(key)) => {
                if sender.send(AppEvent::Input(key)).is_err() {
                    break;
                }
            }
            Ok(Event::Resize(cols, rows)) => {
                if sender.send(AppEvent::Resize(cols, rows)).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    });
}

impl App {
    /// Build the application state. Nothing is spawned yet; see
    /// [`App::start_background`].
    pub fn new(config: Config, cwd: PathBuf, file: Option<PathBuf>) -> Self {
        let keymap = Keymap::from_config(&config.keymap);
        let names: Vec<&str> = CONSOLES.iter().map(|(name, _)| *name).collect();
        let focus = FocusController::new(keymap, &names);

        let mut status = None;
        let mut sessions = BTreeMap::new();
        if config.tidal.enabled {
            let boot = match resolve_boot_file(config.tidal.boot_file.as_deref(), &cwd) {
                Ok(path) => Some(path),
                Err(err) => {
                    warn!("{err}; starting tidal without a boot script");
                    status = Some(format!("{err}"));
                    None
                }
            };
            let profile = configured(InterpreterProfile::tidal(boot), &config.tidal);
            sessions.insert(TIDAL.to_string(), ProcessSession::new(TIDAL, profile));
        }
        if config.sclang.enabled {
            let profile = configured(InterpreterProfile::sclang(), &config.sclang);
            sessions.insert(SCLANG.to_string(), ProcessSession::new(SCLANG, profile));
        }

        let mut router = OutputRouter::new();
        for session in sessions.values_mut() {
            if let Some(subscription) = session.subscribe() {
                router.attach(subscription, SourceKind::Session);
            }
        }

        let consoles = CONSOLES
            .iter()
            .map(|(name, title)| Console::new(name, title))
            .collect();

        let mut editor = LineEditor::new();
        let start_file = file.unwrap_or_else(|| PathBuf::from(&config.paths.startup_file));
        let start_file = resolve_path(&cwd, &start_file);
        if start_file.is_file() {
            if let Err(err) = editor.load(&start_file) {
                warn!("failed to open {}: {err}", start_file.display());
                status = Some(format!("failed to open {}: {err}", start_file.display()));
                editor.set_path(&start_file);
            }
        } else {
            editor.set_path(&start_file);
        }

        let files_dir = resolve_path(&cwd, &expand_home(&config.paths.tidal_files_dir));
        let samples_dir = resolve_path(&cwd, &expand_home(&config.paths.samples_dir));
        let area = Rect::new(0, 0, 80, 24);

        let mut visuals = VisualRegistry::with_defaults();
        let status = if visuals.select(&config.visuals.selected) {
            status
        } else {
            let available: Vec<&str> = visuals.names().collect();
            Some(format!(
                "unknown visual {}, available: {}",
                config.visuals.selected,
                available.join(", ")
            ))
        };

        let mut app = Self {
            config,
            cwd,
            focus,
            editor,
            sessions,
            consoles,
            router,
            visuals,
            quick_select: QuickSelect::for_consoles(CONSOLES),
            file_browser: FileBrowser::new(files_dir),
            sample_browser: SampleBrowser::new(samples_dir),
            area,
            layout: compute_panels(area, PanelVisibility::default()),
            output: None,
            should_quit: false,
        };
        if let Some(status) = status {
            app.set_output(status);
        }
        app.relayout();
        app
    }

    /// Launch the interpreters and the OSC listener. Failures end up in
    /// the status line; the UI keeps running without that source.
    pub fn start_background(&mut self) {
        let mut failures = Vec::new();
        for session in self.sessions.values_mut() {
            if let Err(err) = session.start() {
                warn!("{err}");
                failures.push(err.to_string());
            }
        }

        if self.config.osc.enabled {
            let (sender, subscription) = line_queue(OSC_CONSOLE, QUEUE_CAPACITY);
            match spawn_listener(self.config.osc.port, sender) {
                Ok(addr) => {
                    info!("listening for OSC on {addr}");
                    self.router.attach(subscription, SourceKind::Network);
                    self.router
                        .set_armed(OSC_CONSOLE, self.focus.network_drained());
                }
                Err(err) => {
                    warn!("{err}");
                    failures.push(err.to_string());
                }
            }
        }

        if !failures.is_empty() {
            self.set_output(failures.join("; "));
        }
    }
}

fn configured(profile: InterpreterProfile, config: &InterpreterConfig) -> InterpreterProfile {
    profile.with_command(config.command.as_deref(), &config.args)
}

fn resolve_path(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
