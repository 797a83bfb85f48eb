//! Issue tracker client: the seam to the external task tracker.
//!
//! The production client shells out to the `bd` CLI (`bd show --json`,
//! `bd init`); the trait keeps subprocess plumbing out of the spawn logic
//! so tests can substitute an in-memory fake.

use async_trait::async_trait;
use rigyard_core::{Issue, Result, RigyardError};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, instrument};

/// External issue tracker interface.
#[async_trait]
pub trait IssueClient: Send + Sync {
    /// Fetch one issue by id, scoped to the rig repository at `rig_path`.
    async fn fetch(&self, rig_path: &Path, issue_id: &str) -> Result<Issue>;

    /// Initialize tracker state inside a fresh checkout.
    ///
    /// Call sites treat failure here as non-fatal; the checkout may already
    /// be initialized.
    async fn init_worktree(&self, path: &Path) -> Result<()>;
}

/// Issue client backed by the `bd` command-line tracker.
#[derive(Debug, Clone, Default)]
pub struct BeadsCli;

impl BeadsCli {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IssueClient for BeadsCli {
    #[instrument(level = "debug", skip(self), fields(issue = %issue_id))]
    async fn fetch(&self, rig_path: &Path, issue_id: &str) -> Result<Issue> {
        let output = Command::new("bd")
            .args(["show", issue_id, "--json"])
            .current_dir(rig_path)
            .output()
            .await
            .map_err(|e| RigyardError::IssueFetch {
                issue_id: issue_id.to_string(),
                message: format!("failed to run bd: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let message = if stderr.is_empty() {
                format!("bd exited with {}", output.status)
            } else {
                stderr.to_string()
            };
            return Err(RigyardError::IssueFetch {
                issue_id: issue_id.to_string(),
                message,
            });
        }

        // bd show --json returns an array; the first element is the issue.
        let issues: Vec<Issue> =
            serde_json::from_slice(&output.stdout).map_err(|e| RigyardError::IssueParse {
                issue_id: issue_id.to_string(),
                message: e.to_string(),
                source: Some(e),
            })?;

        let issue = issues
            .into_iter()
            .next()
            .ok_or_else(|| RigyardError::IssueNotFound {
                issue_id: issue_id.to_string(),
            })?;

        debug!(issue = %issue.id, title = %issue.title, "fetched issue");
        Ok(issue)
    }

    #[instrument(level = "debug", skip(self), fields(path = %path.display()))]
    async fn init_worktree(&self, path: &Path) -> Result<()> {
        let output = Command::new("bd")
            .arg("init")
            .current_dir(path)
            .output()
            .await
            .map_err(|e| RigyardError::internal(format!("failed to run bd init: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let message = if stderr.is_empty() {
                format!("bd init exited with {}", output.status)
            } else {
                stderr.to_string()
            };
            return Err(RigyardError::internal(message));
        }

        debug!("initialized tracker in worktree");
        Ok(())
    }
}
