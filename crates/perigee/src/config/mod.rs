//! Configuration loading and merging.
//!
//! Config is loaded from two sources with the project taking precedence:
//! 1. User-level: `$XDG_CONFIG_HOME/perigee/config.toml`
//!    (or the platform config dir)
//! 2. Project-level: `<cwd>/.perigee/config.toml`
//!
//! Every field is merged individually, so a project file only needs the
//! keys it changes. Missing or unparsable files fall back to defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::osc::DEFAULT_OSC_PORT;

const DEFAULT_QUIT: &str = "ctrl+c";
const DEFAULT_FOCUS_EDITOR: &str = "esc";
const DEFAULT_FOCUS_CONSOLE: &str = "2";
const DEFAULT_TOGGLE_TIDAL_CONSOLE: &str = "ctrl+t";
const DEFAULT_TOGGLE_SCLANG_CONSOLE: &str = "ctrl+l";
const DEFAULT_TOGGLE_OSC_CONSOLE: &str = "ctrl+o";
const DEFAULT_FOCUS_QUICK_SELECT: &str = "ctrl+g";
const DEFAULT_FOCUS_FILE_BROWSER: &str = "ctrl+f";
const DEFAULT_TOGGLE_SAMPLE_BROWSER: &str = "ctrl+w";
const DEFAULT_TOGGLE_VISUALS: &str = "ctrl+p";
const DEFAULT_EVAL_BLOCK: &str = "ctrl+e";
const DEFAULT_HUSH: &str = "ctrl+h";
const DEFAULT_SAVE: &str = "ctrl+s";
const DEFAULT_TOGGLE_COMMENT: &str = "ctrl+/";

const DEFAULT_TIDAL_FILES_DIR: &str = ".";
const DEFAULT_SAMPLES_DIR: &str = "~/.local/share/SuperCollider/downloaded-quarks/Dirt-Samples";
const DEFAULT_STARTUP_FILE: &str = "perigee.tidal";
const DEFAULT_PLAYER: &str = "mpv";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_VISUAL: &str = "pulses";

#[derive(Debug, Clone)]
pub struct Config {
    pub keymap: KeymapConfig,
    pub tidal: InterpreterConfig,
    pub sclang: InterpreterConfig,
    pub osc: OscConfig,
    pub paths: PathsConfig,
    pub player: PlayerConfig,
    pub visuals: VisualsConfig,
    pub log: LogConfig,
}

/// One chord string per bindable action (e.g. `"ctrl+t"`).
#[derive(Debug, Clone)]
pub struct KeymapConfig {
    pub quit: String,
    pub focus_editor: String,
    pub focus_console: String,
    pub toggle_tidal_console: String,
    pub toggle_sclang_console: String,
    pub toggle_osc_console: String,
    pub focus_quick_select: String,
    pub focus_file_browser: String,
    pub toggle_sample_browser: String,
    pub toggle_visuals: String,
    pub eval_block: String,
    pub hush: String,
    pub save: String,
    pub toggle_comment: String,
}

#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    pub enabled: bool,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub boot_file: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OscConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct PathsConfig {
    pub tidal_files_dir: String,
    pub samples_dir: String,
    pub startup_file: String,
}

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub command: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct VisualsConfig {
    /// Renderer shown in the visuals panel.
    pub selected: String,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    keymap: Option<RawKeymap>,
    tidal: Option<RawInterpreter>,
    sclang: Option<RawInterpreter>,
    osc: Option<RawOsc>,
    paths: Option<RawPaths>,
    player: Option<RawPlayer>,
    visuals: Option<RawVisuals>,
    log: Option<RawLog>,
}

#[derive(Debug, Default, Deserialize)]
struct RawKeymap {
    quit: Option<String>,
    #[serde(alias = "focusEditor")]
    focus_editor: Option<String>,
    #[serde(alias = "focusConsole")]
    focus_console: Option<String>,
    #[serde(alias = "toggleTidalConsole")]
    toggle_tidal_console: Option<String>,
    #[serde(alias = "toggleSclangConsole")]
    toggle_sclang_console: Option<String>,
    #[serde(alias = "toggleOscConsole")]
    toggle_osc_console: Option<String>,
    #[serde(alias = "focusQuickSelect")]
    focus_quick_select: Option<String>,
    #[serde(alias = "focusFileBrowser")]
    focus_file_browser: Option<String>,
    #[serde(alias = "toggleSampleBrowser")]
    toggle_sample_browser: Option<String>,
    #[serde(alias = "toggleVisuals")]
    toggle_visuals: Option<String>,
    #[serde(alias = "evalBlock")]
    eval_block: Option<String>,
    hush: Option<String>,
    save: Option<String>,
    #[serde(alias = "toggleComment")]
    toggle_comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawInterpreter {
    enabled: Option<bool>,
    command: Option<String>,
    args: Option<Vec<String>>,
    #[serde(alias = "bootFile", alias = "bootfile")]
    boot_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOsc {
    enabled: Option<bool>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPaths {
    #[serde(alias = "tidalFilesDir")]
    tidal_files_dir: Option<String>,
    #[serde(alias = "samplesDir")]
    samples_dir: Option<String>,
    #[serde(alias = "startupFile")]
    startup_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPlayer {
    command: Option<String>,
    args: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawVisuals {
    selected: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLog {
    level: Option<String>,
    file: Option<String>,
}

fn read_toml(path: &Path) -> Option<RawConfig> {
    let contents = fs::read_to_string(path).ok()?;
    if contents.trim().is_empty() {
        return None;
    }
    match toml::from_str::<RawConfig>(&contents) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!("ignoring invalid config {}: {err}", path.display());
            None
        }
    }
}

/// Project value, else user value, else nothing.
fn pick<S, T>(
    project: Option<&S>,
    user: Option<&S>,
    field: impl Fn(&S) -> Option<T>,
) -> Option<T> {
    project
        .and_then(&field)
        .or_else(|| user.and_then(&field))
}

fn merge_keymap(project: Option<&RawKeymap>, user: Option<&RawKeymap>) -> KeymapConfig {
    let chord = |field: fn(&RawKeymap) -> Option<String>, default: &str| {
        pick(project, user, field).unwrap_or_else(|| default.to_string())
    };
    KeymapConfig {
        quit: chord(|k| k.quit.clone(), DEFAULT_QUIT),
        focus_editor: chord(|k| k.focus_editor.clone(), DEFAULT_FOCUS_EDITOR),
        focus_console: chord(|k| k.focus_console.clone(), DEFAULT_FOCUS_CONSOLE),
        toggle_tidal_console: chord(
            |k| k.toggle_tidal_console.clone(),
            DEFAULT_TOGGLE_TIDAL_CONSOLE,
        ),
        toggle_sclang_console: chord(
            |k| k.toggle_sclang_console.clone(),
            DEFAULT_TOGGLE_SCLANG_CONSOLE,
        ),
        toggle_osc_console: chord(|k| k.toggle_osc_console.clone(), DEFAULT_TOGGLE_OSC_CONSOLE),
        focus_quick_select: chord(|k| k.focus_quick_select.clone(), DEFAULT_FOCUS_QUICK_SELECT),
        focus_file_browser: chord(|k| k.focus_file_browser.clone(), DEFAULT_FOCUS_FILE_BROWSER),
        toggle_sample_browser: chord(
            |k| k.toggle_sample_browser.clone(),
            DEFAULT_TOGGLE_SAMPLE_BROWSER,
        ),
        toggle_visuals: chord(|k| k.toggle_visuals.clone(), DEFAULT_TOGGLE_VISUALS),
        eval_block: chord(|k| k.eval_block.clone(), DEFAULT_EVAL_BLOCK),
        hush: chord(|k| k.hush.clone(), DEFAULT_HUSH),
        save: chord(|k| k.save.clone(), DEFAULT_SAVE),
        toggle_comment: chord(|k| k.toggle_comment.clone(), DEFAULT_TOGGLE_COMMENT),
    }
}

fn merge_interpreter(
    project: Option<&RawInterpreter>,
    user: Option<&RawInterpreter>,
) -> InterpreterConfig {
    InterpreterConfig {
        enabled: pick(project, user, |i| i.enabled).unwrap_or(true),
        command: pick(project, user, |i| i.command.clone()),
        args: pick(project, user, |i| i.args.clone()).unwrap_or_default(),
        boot_file: pick(project, user, |i| i.boot_file.clone()),
    }
}

fn merge_config(user: Option<RawConfig>, project: Option<RawConfig>) -> Config {
    let user = user.as_ref();
    let project = project.as_ref();

    let keymap = merge_keymap(
        project.and_then(|c| c.keymap.as_ref()),
        user.and_then(|c| c.keymap.as_ref()),
    );
    let tidal = merge_interpreter(
        project.and_then(|c| c.tidal.as_ref()),
        user.and_then(|c| c.tidal.as_ref()),
    );
    let sclang = merge_interpreter(
        project.and_then(|c| c.sclang.as_ref()),
        user.and_then(|c| c.sclang.as_ref()),
    );

    let project_osc = project.and_then(|c| c.osc.as_ref());
    let user_osc = user.and_then(|c| c.osc.as_ref());
    let osc = OscConfig {
        enabled: pick(project_osc, user_osc, |o| o.enabled).unwrap_or(true),
        port: pick(project_osc, user_osc, |o| o.port).unwrap_or(DEFAULT_OSC_PORT),
    };

    let project_paths = project.and_then(|c| c.paths.as_ref());
    let user_paths = user.and_then(|c| c.paths.as_ref());
    let paths = PathsConfig {
        tidal_files_dir: pick(project_paths, user_paths, |p| p.tidal_files_dir.clone())
            .unwrap_or_else(|| DEFAULT_TIDAL_FILES_DIR.to_string()),
        samples_dir: pick(project_paths, user_paths, |p| p.samples_dir.clone())
            .unwrap_or_else(|| DEFAULT_SAMPLES_DIR.to_string()),
        startup_file: pick(project_paths, user_paths, |p| p.startup_file.clone())
            .unwrap_or_else(|| DEFAULT_STARTUP_FILE.to_string()),
    };

    let project_player = project.and_then(|c| c.player.as_ref());
    let user_player = user.and_then(|c| c.player.as_ref());
    let player = PlayerConfig {
        command: pick(project_player, user_player, |p| p.command.clone())
            .unwrap_or_else(|| DEFAULT_PLAYER.to_string()),
        args: pick(project_player, user_player, |p| p.args.clone()).unwrap_or_default(),
    };

    let visuals = VisualsConfig {
        selected: pick(
            project.and_then(|c| c.visuals.as_ref()),
            user.and_then(|c| c.visuals.as_ref()),
            |v| v.selected.clone(),
        )
        .unwrap_or_else(|| DEFAULT_VISUAL.to_string()),
    };

    let project_log = project.and_then(|c| c.log.as_ref());
    let user_log = user.and_then(|c| c.log.as_ref());
    let log = LogConfig {
        level: pick(project_log, user_log, |l| l.level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        file: pick(project_log, user_log, |l| l.file.clone()).map(PathBuf::from),
    };

    Config {
        keymap,
        tidal,
        sclang,
        osc,
        paths,
        player,
        visuals,
        log,
    }
}

impl Default for Config {
    /// Built-in values, as if no config file existed.
    fn default() -> Self {
        merge_config(None, None)
    }
}

fn config_path_from_root(root: &Path) -> PathBuf {
    root.join(".perigee").join("config.toml")
}

pub fn user_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|path| path.is_absolute())
        .or_else(dirs::config_dir)?;
    Some(base.join("perigee").join("config.toml"))
}

pub fn project_config_path(root: &Path) -> PathBuf {
    config_path_from_root(root)
}

pub fn load_config(root: &Path) -> Config {
    let project_config = read_toml(&project_config_path(root));
    let user_config = user_config_path().and_then(|path| read_toml(&path));

    merge_config(user_config, project_config)
}
