//! OS-level "open with default application" integration.

use std::io;
use std::process::{Command, Stdio};

/// Hand a file path or URL to the platform opener without waiting for
/// the spawned application to exit.
pub fn open_detached(target: &str) -> io::Result<()> {
    let mut command = opener_command(target);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn opener_command(target: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(target);
    command
}

#[cfg(target_os = "windows")]
fn opener_command(target: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", target]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener_command(target: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(target);
    command
}
