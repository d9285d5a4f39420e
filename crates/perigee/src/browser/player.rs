use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

/// Play `path` with an external player. Returns once the player has
/// started; a background thread reaps it. Output is discarded so it
/// never reaches the terminal.
pub fn play_sample(command: &str, args: &[String], path: &Path) -> io::Result<()> {
    let mut child = Command::new(command)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    debug!(player = command, sample = %path.display(), "sample playback started");

    let name = path.display().to_string();
    let spawned = thread::Builder::new()
        .name("sample-player".to_string())
        .spawn(move || match child.wait() {
            Ok(status) if !status.success() => warn!("player exited with {status} for {name}"),
            Ok(_) => {}
            Err(err) => warn!("failed to wait for player: {err}"),
        });
    if let Err(err) = spawned {
        warn!("failed to spawn player reaper: {err}");
    }
    Ok(())
}
