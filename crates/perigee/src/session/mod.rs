//! Interpreter process sessions.
//!
//! This module owns everything between the UI and an external
//! interpreter process:
//! - Launch command construction (profile.rs)
//! - Boot script lookup (boot.rs)
//! - Fragment formatting for stdin (format.rs)
//! - Process lifecycle and the stdout/stderr reader threads (this file)
//!
//! A session pushes every line the interpreter prints, plus an echo of
//! every fragment it was sent, into one bounded queue. The event loop
//! drains that queue through the router; the session never touches a
//! console itself.

pub mod boot;
pub mod format;
pub mod profile;

use std::io::{self, BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;

use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::queue::{line_queue, LineSender, Subscription, QUEUE_CAPACITY};

pub use boot::resolve_boot_file;
pub use format::format_command;
pub use profile::{CommandSpec, InterpreterProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Running,
    Stopped,
}

/// One interpreter process with its pipes and output queue.
pub struct ProcessSession {
    name: String,
    profile: InterpreterProfile,
    state: SessionState,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    output: LineSender,
    subscription: Option<Subscription>,
}

impl ProcessSession {
    pub fn new(name: &str, profile: InterpreterProfile) -> Self {
        let (output, subscription) = line_queue(name, QUEUE_CAPACITY);
        Self {
            name: name.to_string(),
            profile,
            state: SessionState::NotStarted,
            child: None,
            stdin: None,
            output,
            subscription: Some(subscription),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn profile(&self) -> &InterpreterProfile {
        &self.profile
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// Hand out the consumer end of the output queue. Only the first call
    /// returns it; the queue outlives restarts of the process.
    pub fn subscribe(&mut self) -> Option<Subscription> {
        self.subscription.take()
    }

    /// Launch the interpreter and its two reader threads.
    ///
    /// A running session is left alone. On failure the session stays
    /// `NotStarted` and nothing is retried.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Running {
            return Ok(());
        }

        let spec = self.profile.command_spec();
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        info!(
            session = %self.name,
            program = %spec.program,
            args = ?spec.args,
            boot_file = ?self.profile.boot_file(),
            "starting interpreter"
        );
        let mut child = cmd.spawn().map_err(|source| {
            self.state = SessionState::NotStarted;
            SessionError::Spawn {
                name: self.name.clone(),
                program: spec.program.clone(),
                source,
            }
        })?;

        self.stdin = child.stdin.take();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(&self.name, "stdout", stdout, self.output.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(&self.name, "stderr", stderr, self.output.clone());
        }
        self.child = Some(child);
        self.state = SessionState::Running;
        Ok(())
    }

    /// Close stdin, then kill and reap the process. Idempotent.
    pub fn stop(&mut self) {
        // Dropping the handle closes the pipe and signals EOF.
        self.stdin.take();
        let Some(mut child) = self.child.take() else {
            return;
        };
        info!(session = %self.name, pid = child.id(), "stopping interpreter");
        if let Err(err) = child.kill() {
            debug!(session = %self.name, "kill failed (already exited?): {err}");
        }
        let _ = child.wait();
        self.state = SessionState::Stopped;
    }

    /// Write a formatted fragment to stdin and echo the raw text into the
    /// output queue.
    pub fn send(&mut self, text: &str) -> Result<(), SessionError> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SessionError::not_running(&self.name));
        };
        let payload = format_command(text, self.profile.markers());
        let written = stdin
            .write_all(payload.as_bytes())
            .and_then(|()| stdin.flush());
        if let Err(source) = written {
            warn!(session = %self.name, "write to interpreter failed: {source}");
            return Err(SessionError::Write {
                name: self.name.clone(),
                source,
            });
        }

        // The loop thread is the only consumer, so waiting for room here
        // could never finish.
        if !self.output.post(text.to_string()) {
            debug!(session = %self.name, "echo not queued, output consumer gone");
        }
        Ok(())
    }
}

impl Drop for ProcessSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Scan `stream` line by line into the session queue until EOF.
fn spawn_reader<R>(session: &str, label: &'static str, stream: R, output: LineSender)
where
    R: Read + Send + 'static,
{
    let session = session.to_string();
    let spawned = thread::Builder::new()
        .name(format!("{session}-{label}"))
        .spawn(move || {
            let mut reader = BufReader::new(stream);
            let mut buffer = Vec::new();
            loop {
                buffer.clear();
                match reader.read_until(b'\n', &mut buffer) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = decode_line(&buffer);
                        if !output.push(line) {
                            break;
                        }
                    }
                    Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                    Err(err) => {
                        debug!(session = %session, stream = label, "read failed: {err}");
                        break;
                    }
                }
            }
            debug!(session = %session, stream = label, "reader finished");
        });
    if let Err(err) = spawned {
        warn!("failed to spawn {label} reader: {err}");
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let trimmed = bytes
        .strip_suffix(b"\n")
        .map(|rest| rest.strip_suffix(b"\r").unwrap_or(rest))
        .unwrap_or(bytes);
    String::from_utf8_lossy(trimmed).into_owned()
}
