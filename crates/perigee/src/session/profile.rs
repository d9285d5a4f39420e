//! How each interpreter is launched and fed.

use std::path::PathBuf;

use super::format::{MultilineMarkers, GHCI_MARKERS};

/// Program, arguments and working directory for one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct InterpreterProfile {
    program: String,
    /// Used instead of `program` when there is no boot file.
    fallback_program: Option<String>,
    args: Vec<String>,
    boot_flag: Option<String>,
    boot_file: Option<PathBuf>,
    markers: Option<MultilineMarkers>,
    comment_prefix: &'static str,
    /// Silences everything the interpreter is playing.
    hush: Option<&'static str>,
}

impl InterpreterProfile {
    /// GHCi with the Tidal boot script, or the `tidal` wrapper without one.
    pub fn tidal(boot_file: Option<PathBuf>) -> Self {
        Self {
            program: "ghci".to_string(),
            fallback_program: Some("tidal".to_string()),
            args: Vec::new(),
            boot_flag: Some("-ghci-script".to_string()),
            boot_file,
            markers: Some(GHCI_MARKERS),
            comment_prefix: "-- ",
            hush: Some("hush"),
        }
    }

    pub fn sclang() -> Self {
        Self {
            program: "sclang".to_string(),
            fallback_program: None,
            args: Vec::new(),
            boot_flag: None,
            boot_file: None,
            markers: None,
            comment_prefix: "// ",
            hush: Some("CmdPeriod.run"),
        }
    }

    /// An arbitrary line-oriented program (no boot script, no markers).
    pub fn custom(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            fallback_program: None,
            args: args.iter().map(|arg| arg.to_string()).collect(),
            boot_flag: None,
            boot_file: None,
            markers: None,
            comment_prefix: "# ",
            hush: None,
        }
    }

    /// Apply a configured command override. An explicit command is used
    /// whether or not a boot file was found.
    pub fn with_command(mut self, command: Option<&str>, args: &[String]) -> Self {
        if let Some(command) = command.map(str::trim).filter(|cmd| !cmd.is_empty()) {
            self.program = command.to_string();
            self.fallback_program = None;
        }
        if !args.is_empty() {
            self.args = args.to_vec();
        }
        self
    }

    pub fn boot_file(&self) -> Option<&PathBuf> {
        self.boot_file.as_ref()
    }

    pub fn markers(&self) -> Option<MultilineMarkers> {
        self.markers
    }

    pub fn comment_prefix(&self) -> &'static str {
        self.comment_prefix
    }

    pub fn hush_command(&self) -> Option<&'static str> {
        self.hush
    }

    pub fn command_spec(&self) -> CommandSpec {
        let mut args = self.args.clone();
        match (&self.boot_file, &self.boot_flag) {
            (Some(boot), Some(flag)) => {
                args.push(flag.clone());
                args.push(boot.display().to_string());
                CommandSpec {
                    program: self.program.clone(),
                    args,
                    cwd: boot.parent().map(|dir| dir.to_path_buf()),
                }
            }
            _ => CommandSpec {
                program: self
                    .fallback_program
                    .clone()
                    .unwrap_or_else(|| self.program.clone()),
                args,
                cwd: None,
            },
        }
    }
}
