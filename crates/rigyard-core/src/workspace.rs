//! Workspace discovery.
//!
//! A rigyard workspace is any directory containing a `.rigyard` directory.
//! Discovery walks up from a starting directory (normally the cwd) until it
//! finds the marker or runs out of parents.

use std::path::{Path, PathBuf};

use crate::error::{Result, RigyardError};

/// Name of the workspace marker directory.
pub const WORKSPACE_DIR: &str = ".rigyard";

/// Find the workspace root at or above `start`.
pub fn find_from(start: &Path) -> Result<PathBuf> {
    let mut current = start;
    loop {
        if current.join(WORKSPACE_DIR).is_dir() {
            return Ok(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => {
                return Err(RigyardError::WorkspaceNotFound {
                    path: start.to_path_buf(),
                });
            }
        }
    }
}

/// Find the workspace root starting from the current directory.
pub fn find_from_cwd() -> Result<PathBuf> {
    let cwd = std::env::current_dir()
        .map_err(|e| RigyardError::io("reading current directory", ".", e))?;
    find_from(&cwd)
}

/// Path to the rigs registry inside a workspace.
pub fn rigs_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(WORKSPACE_DIR).join("rigs.json")
}
