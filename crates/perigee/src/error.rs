//! Error types for interpreter sessions and the OSC listener.
//!
//! None of these are fatal to the application: the UI turns them into
//! status-bar messages and keeps running.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// The interpreter binary is missing or the OS refused to start it.
    #[error("failed to start {name} ({program}): {source}")]
    Spawn {
        name: String,
        program: String,
        #[source]
        source: io::Error,
    },
    /// The input pipe is closed or broken (process died or was stopped).
    #[error("failed to send to {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("no {file_name} found in {} or any parent directory", start.display())]
    BootFileNotFound { file_name: String, start: PathBuf },
}

impl SessionError {
    pub(crate) fn not_running(name: &str) -> Self {
        SessionError::Write {
            name: name.to_string(),
            source: io::Error::new(io::ErrorKind::BrokenPipe, "session is not running"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind OSC listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
}
