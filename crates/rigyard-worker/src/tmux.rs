//! Tmux primitives for worker sessions.
//!
//! Thin wrappers over the `tmux` CLI used by the session driver: liveness
//! checks, detached session creation, text injection, and pane PID lookup.

use rigyard_core::{Result, RigyardError};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Check if a tmux session exists.
#[instrument(level = "debug", skip_all, fields(session = %session_name))]
pub async fn session_exists(session_name: &str) -> Result<bool> {
    let output = Command::new("tmux")
        .args(["has-session", "-t", session_name])
        .output()
        .await
        .map_err(|e| RigyardError::SessionStart {
            session: session_name.into(),
            message: format!("failed to check tmux session: {e}"),
        })?;

    Ok(output.status.success())
}

/// Create a new detached tmux session in `working_dir`.
#[instrument(level = "debug", skip_all, fields(session = %session_name, dir = %working_dir.display()))]
pub async fn create_session(
    session_name: &str,
    working_dir: &Path,
    command: Option<&str>,
) -> Result<()> {
    let mut args = vec![
        "new-session",
        "-d", // Detached
        "-s",
        session_name,
        "-c",
        working_dir.to_str().unwrap_or("."),
    ];

    if let Some(cmd) = command {
        args.push(cmd);
    }

    let output = Command::new("tmux")
        .args(&args)
        .output()
        .await
        .map_err(|e| RigyardError::SessionStart {
            session: session_name.into(),
            message: format!("failed to create tmux session: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RigyardError::SessionStart {
            session: session_name.into(),
            message: format!("tmux new-session failed: {}", stderr.trim()),
        });
    }

    debug!("created tmux session");
    Ok(())
}

/// Send literal text to a session, followed by Enter.
///
/// `-l` keeps tmux from interpreting the text as key names, so multi-line
/// context blocks arrive verbatim.
#[instrument(level = "debug", skip_all, fields(session = %session_name))]
pub async fn send_text(session_name: &str, text: &str) -> Result<()> {
    let output = Command::new("tmux")
        .args(["send-keys", "-t", session_name, "-l", text])
        .output()
        .await
        .map_err(|e| RigyardError::SessionInject {
            session: session_name.into(),
            message: format!("failed to send text to tmux: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RigyardError::SessionInject {
            session: session_name.into(),
            message: format!("tmux send-keys failed: {}", stderr.trim()),
        });
    }

    let output = Command::new("tmux")
        .args(["send-keys", "-t", session_name, "Enter"])
        .output()
        .await
        .map_err(|e| RigyardError::SessionInject {
            session: session_name.into(),
            message: format!("failed to send Enter to tmux: {e}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RigyardError::SessionInject {
            session: session_name.into(),
            message: format!("tmux send-keys failed: {}", stderr.trim()),
        });
    }

    debug!(bytes = text.len(), "sent text to session");
    Ok(())
}

/// Get the PID of the main process in a tmux session.
#[instrument(level = "debug", skip_all, fields(session = %session_name))]
pub async fn get_session_pid(session_name: &str) -> Result<Option<u32>> {
    let output = Command::new("tmux")
        .args(["display-message", "-t", session_name, "-p", "#{pane_pid}"])
        .output()
        .await
        .map_err(|e| RigyardError::SessionStart {
            session: session_name.into(),
            message: format!("failed to get tmux pane PID: {e}"),
        })?;

    if !output.status.success() {
        return Ok(None);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let pid_str = stdout.trim();

    if pid_str.is_empty() {
        return Ok(None);
    }

    match pid_str.parse::<u32>() {
        Ok(pid) => Ok(Some(pid)),
        Err(_) => {
            warn!("invalid PID from tmux: {}", pid_str);
            Ok(None)
        }
    }
}
