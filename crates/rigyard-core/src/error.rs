//! Error types for rigyard operations.
//!
//! This module defines [`RigyardError`], the error enum covering every step
//! of a spawn operation. Errors are designed for visibility - no silent
//! failures, no automatic retry, clear messages naming the step that failed.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`RigyardError`].
pub type Result<T> = std::result::Result<T, RigyardError>;

/// Comprehensive error type for all rigyard operations.
///
/// Every failure is surfaced to the caller with the step it came from.
/// Nothing is retried automatically - the user decides if/when to retry.
#[derive(Debug, Error)]
pub enum RigyardError {
    // =========================================================================
    // Address / Input Errors
    // =========================================================================
    /// Worker address could not be parsed
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Neither an issue nor a free-form message was supplied
    #[error("Must specify --issue or -m/--message")]
    MissingAssignment,

    // =========================================================================
    // Workspace / Configuration Errors
    // =========================================================================
    /// No workspace root found above the current directory
    #[error("Not in a rigyard workspace (searched up from {path})")]
    WorkspaceNotFound { path: PathBuf },

    /// Rigs registry file is present but unreadable or malformed
    #[error("Invalid rigs config at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Named rig is not registered in the workspace
    #[error("Rig not found: {rig}")]
    RigNotFound { rig: String },

    // =========================================================================
    // Worker Lifecycle Errors
    // =========================================================================
    /// Worker has an active assignment and must not be replaced
    #[error("Worker '{worker}' is already working on {assignment}")]
    WorkerBusy { worker: String, assignment: String },

    /// Worker record does not exist
    #[error("Worker not found: {worker}")]
    WorkerNotFound { worker: String },

    /// Checkout create/remove failed in the worktree delegate
    #[error("Worktree {operation} failed for '{worker}': {message}")]
    Worktree {
        worker: String,
        operation: String,
        message: String,
    },

    /// Attaching an assignment to a worker failed
    #[error("Failed to assign work to '{worker}': {message}")]
    Assignment { worker: String, message: String },

    // =========================================================================
    // Issue Tracker Errors
    // =========================================================================
    /// Tracker query returned no matching issue
    #[error("Issue not found: {issue_id}")]
    IssueNotFound { issue_id: String },

    /// Tracker subprocess reported an error
    #[error("Failed to fetch issue {issue_id}: {message}")]
    IssueFetch { issue_id: String, message: String },

    /// Tracker payload did not deserialize into the expected shape
    #[error("Failed to parse issue {issue_id}: {message}")]
    IssueParse {
        issue_id: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// Session could not be started or never became ready
    #[error("Failed to start session '{session}': {message}")]
    SessionStart { session: String, message: String },

    /// Context injection into a running session failed
    #[error("Failed to inject into session '{session}': {message}")]
    SessionInject { session: String, message: String },

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error outside the issue path
    #[error("JSON parse error in {context}: {message}")]
    JsonParse {
        context: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Internal error (bug in rigyard)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RigyardError {
    // =========================================================================
    // Constructor helpers for common error patterns
    // =========================================================================

    /// Create an InvalidAddress error
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Create a WorkerBusy error
    pub fn worker_busy(worker: impl Into<String>, assignment: impl Into<String>) -> Self {
        Self::WorkerBusy {
            worker: worker.into(),
            assignment: assignment.into(),
        }
    }

    /// Create a Worktree error
    pub fn worktree(
        worker: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Worktree {
            worker: worker.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a JSON parse error
    pub fn json_parse(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::JsonParse {
            context: context.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Error classification helpers
    // =========================================================================

    /// Returns true if this error was raised before any side effect.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddress { .. }
                | Self::MissingAssignment
                | Self::WorkspaceNotFound { .. }
                | Self::ConfigInvalid { .. }
                | Self::RigNotFound { .. }
        )
    }

    /// Returns true if this is a worker lifecycle error
    pub fn is_lifecycle_error(&self) -> bool {
        matches!(
            self,
            Self::WorkerBusy { .. }
                | Self::WorkerNotFound { .. }
                | Self::Worktree { .. }
                | Self::Assignment { .. }
        )
    }

    /// Returns true if this is a session error
    pub fn is_session_error(&self) -> bool {
        matches!(self, Self::SessionStart { .. } | Self::SessionInject { .. })
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::MissingAssignment => {
                Some("Pass --issue <id> or -m \"task description\"")
            }
            Self::WorkspaceNotFound { .. } => {
                Some("Run from inside a workspace containing a .rigyard directory")
            }
            Self::RigNotFound { .. } => {
                Some("Check .rigyard/rigs.json for the list of registered rigs")
            }
            Self::WorkerBusy { .. } => {
                Some("Pick another worker name, or wait for the current assignment to finish")
            }
            Self::SessionStart { .. } => Some("Check that tmux is installed and on PATH"),
            _ => None,
        }
    }
}
