//! Rigs registry configuration.
//!
//! The registry lives at `<workspace>/.rigyard/rigs.json` and maps rig names
//! to repository paths. A missing file is treated as an empty registry so a
//! fresh workspace behaves sensibly; a present-but-malformed file is an
//! error, never silently ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, RigyardError};
use crate::types::Rig;

/// One registered rig.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigEntry {
    /// Repository path, absolute or relative to the workspace root
    pub path: PathBuf,
}

/// The rigs registry as persisted on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RigsConfig {
    #[serde(default)]
    pub rigs: HashMap<String, RigEntry>,
}

impl RigsConfig {
    /// Load the registry from `path`. A missing file yields an empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => return Err(RigyardError::io("reading rigs config", path, e)),
        };

        serde_json::from_str(&contents).map_err(|e| RigyardError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve a rig by name, anchoring relative paths at `workspace_root`.
    pub fn resolve(&self, workspace_root: &Path, name: &str) -> Result<Rig> {
        let entry = self.rigs.get(name).ok_or_else(|| RigyardError::RigNotFound {
            rig: name.to_string(),
        })?;

        let path = if entry.path.is_absolute() {
            entry.path.clone()
        } else {
            workspace_root.join(&entry.path)
        };

        Ok(Rig::new(name, path))
    }
}
