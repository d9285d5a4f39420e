//! File logging. The terminal belongs to the UI, so nothing is ever
//! written to stdout or stderr once the subscriber is installed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;

use crate::config::LogConfig;

const LOG_FILE_NAME: &str = "perigee.log";

pub fn default_log_path() -> Option<PathBuf> {
    let base = dirs::state_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("state")))?;
    Some(base.join("perigee").join(LOG_FILE_NAME))
}

/// Parse a level name, falling back to `info` for anything unknown.
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::INFO)
}

/// Install the global subscriber. Returns the guard that flushes the
/// background writer; keep it alive until exit. `None` when no log
/// location is usable, in which case logging is silently disabled.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    let path = config.file.clone().or_else(default_log_path)?;
    let (dir, file_name) = split_path(&path)?;
    fs::create_dir_all(dir).ok()?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(true)
        .with_max_level(parse_level(&config.level))
        .try_init()
        .ok()?;
    Some(guard)
}

fn split_path(path: &Path) -> Option<(&Path, &std::ffi::OsStr)> {
    let file_name = path.file_name()?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Some((dir, file_name))
}

#[cfg(test)]
mod tests {
    use super::{parse_level, split_path};
    use std::path::Path;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn parse_level_accepts_names_and_falls_back_to_info() {
        assert_eq!(parse_level("debug"), LevelFilter::DEBUG);
        assert_eq!(parse_level(" WARN "), LevelFilter::WARN);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("chatty"), LevelFilter::INFO);
    }

    #[test]
    fn split_path_handles_bare_file_names() {
        let (dir, name) = split_path(Path::new("perigee.log")).expect("split");
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "perigee.log");

        let (dir, _) = split_path(Path::new("/var/log/p.log")).expect("split");
        assert_eq!(dir, Path::new("/var/log"));
    }
}
