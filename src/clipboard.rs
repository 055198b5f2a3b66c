/*!
 * Clipboard support for contextify
 *
 * Copies text to the system clipboard by piping it into the first
 * available external clipboard command.
 */

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to execute the clipboard command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// Candidate clipboard commands, tried in order. tmux comes first when a
/// session is active; the rest are platform mechanisms.
const PROVIDERS: &[(&str, &[&str])] = &[
    ("tmux", &["load-buffer", "-w", "-"]),
    ("pbcopy", &[]),
    ("clip.exe", &[]),
    ("wl-copy", &[]),
    ("xsel", &["-b", "-i"]),
    ("xclip", &["-selection", "clipboard", "-in"]),
];

/// Copy text to the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let (cmd, args) = detect_provider()?;
    execute_clipboard_command(cmd, args, text)
}

/// Check if a command exists on the system
pub fn command_exists(command: &str) -> bool {
    if let Ok(paths) = env::var("PATH") {
        for path in paths.split(':') {
            if Path::new(path).join(command).exists() {
                return true;
            }
        }
    }
    false
}

fn detect_provider() -> Result<(&'static str, &'static [&'static str])> {
    for &(cmd, args) in PROVIDERS {
        if cmd == "tmux" && env::var("TMUX").is_err() {
            continue;
        }
        if command_exists(cmd) {
            return Ok((cmd, args));
        }
    }
    Err(ClipboardError::NoClipboardFound)
}

fn execute_clipboard_command(cmd: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| ClipboardError::CommandFailed(format!("Failed to spawn {}", cmd)))?;

    let stdin = child.stdin.as_mut().ok_or_else(|| {
        ClipboardError::CommandFailed(format!("Failed to open stdin for {}", cmd))
    })?;
    stdin
        .write_all(text.as_bytes())
        .map_err(|_| ClipboardError::CommandFailed(format!("Failed to write to {}", cmd)))?;

    let status = child
        .wait()
        .map_err(|_| ClipboardError::CommandFailed(format!("Failed to wait for {}", cmd)))?;

    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            cmd, status
        )))
    }
}
