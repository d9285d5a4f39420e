use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Terminal live-coding front-end for TidalCycles and SuperCollider.
#[derive(Debug, Parser)]
#[command(name = "perigee", version)]
pub struct Cli {
    /// File to open in the editor (defaults to the configured startup file)
    pub file: Option<PathBuf>,

    /// Tidal boot script; skips the search for BootTidal.hs
    #[arg(long)]
    pub boot_file: Option<String>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write logs here instead of ~/.local/state/perigee/perigee.log
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Do not start the SuperCollider interpreter
    #[arg(long)]
    pub no_sclang: bool,

    /// UDP port for OSC events from the audio engine
    #[arg(long)]
    pub osc_port: Option<u16>,

    /// Do not listen for OSC events
    #[arg(long)]
    pub no_osc: bool,
}

impl Cli {
    /// Command-line flags win over both config layers.
    pub fn apply(&self, config: &mut Config) {
        if let Some(boot_file) = &self.boot_file {
            config.tidal.boot_file = Some(boot_file.clone());
        }
        if let Some(level) = &self.log_level {
            config.log.level = level.clone();
        }
        if let Some(file) = &self.log_file {
            config.log.file = Some(file.clone());
        }
        if self.no_sclang {
            config.sclang.enabled = false;
        }
        if let Some(port) = self.osc_port {
            config.osc.port = port;
        }
        if self.no_osc {
            config.osc.enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use crate::config::load_config;
    use crate::test_utils::{env_lock, EnvVarGuard};
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn flags_override_config() {
        let _guard = env_lock();
        let config_home = TempDir::new().expect("temp config");
        let _config_home = EnvVarGuard::set(
            "XDG_CONFIG_HOME",
            config_home.path().to_string_lossy().to_string(),
        );
        let project = TempDir::new().expect("temp project");
        let mut config = load_config(project.path());

        let cli = Cli::try_parse_from([
            "perigee",
            "set.tidal",
            "--boot-file",
            "/tmp/Boot.hs",
            "--no-sclang",
            "--osc-port",
            "6010",
            "--log-level",
            "debug",
        ])
        .expect("parse args");
        cli.apply(&mut config);

        assert_eq!(cli.file, Some(PathBuf::from("set.tidal")));
        assert_eq!(config.tidal.boot_file.as_deref(), Some("/tmp/Boot.hs"));
        assert!(!config.sclang.enabled);
        assert!(config.osc.enabled);
        assert_eq!(config.osc.port, 6010);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn no_flags_leave_config_untouched() {
        let _guard = env_lock();
        let config_home = TempDir::new().expect("temp config");
        let _config_home = EnvVarGuard::set(
            "XDG_CONFIG_HOME",
            config_home.path().to_string_lossy().to_string(),
        );
        let project = TempDir::new().expect("temp project");
        let mut config = load_config(project.path());

        let cli = Cli::try_parse_from(["perigee"]).expect("parse args");
        cli.apply(&mut config);

        assert!(cli.file.is_none());
        assert!(config.sclang.enabled);
        assert_eq!(config.osc.port, 9191);
        assert_eq!(config.log.level, "info");
    }
}
