//! Shared type definitions used across rigyard crates.
//!
//! These are the durable shapes of the system: rigs, workers, assignments,
//! and the transient copy of an external tracker issue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A managed repository under rigyard's control.
///
/// Immutable once resolved for the duration of a spawn operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rig {
    /// Registry name of the rig
    pub name: String,
    /// Filesystem path to the rig's repository
    pub path: PathBuf,
}

impl Rig {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Lifecycle state of a worker.
///
/// A worker with no record at all is "absent" - represented by the registry
/// returning nothing rather than a third enum arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Worker record exists, no active assignment
    #[default]
    Idle,
    /// Worker has an active assignment; its checkout must not be replaced
    Working,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Working => write!(f, "working"),
        }
    }
}

/// An ephemeral worker (polecat): one fresh checkout, one assignment.
///
/// Owned by exactly one rig; the name is unique among workers the rig
/// currently knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    /// Worker name, unique within its rig
    pub name: String,
    /// Current lifecycle state
    pub state: WorkerState,
    /// Identifier of the attached assignment, if any
    pub assignment: Option<String>,
    /// Path to the worker's checkout (worktree)
    pub checkout: PathBuf,
    /// When the worker record was created
    pub created_at: DateTime<Utc>,
}

impl Worker {
    /// Create a fresh idle worker record.
    pub fn new(name: impl Into<String>, checkout: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            state: WorkerState::Idle,
            assignment: None,
            checkout: checkout.into(),
            created_at: Utc::now(),
        }
    }

    /// True when the worker has an active assignment.
    pub fn is_working(&self) -> bool {
        self.state == WorkerState::Working
    }
}

/// Work bound to a worker at spawn time: an issue reference or free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkAssignment {
    /// Reference to an external tracker issue
    Issue(Issue),
    /// Free-form task description
    Task(String),
}

impl WorkAssignment {
    /// Derive the assignment identifier: the issue id, or a synthetic
    /// timestamp id for free-form tasks.
    pub fn id_at(&self, now: DateTime<Utc>) -> String {
        match self {
            Self::Issue(issue) => issue.id.clone(),
            Self::Task(_) => format!("task:{}", now.format("%Y%m%d-%H%M%S")),
        }
    }
}

/// Transient copy of an external tracker issue.
///
/// Field names match the tracker's machine-readable output; the tracker
/// owns the record, rigyard only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub issue_type: String,
    #[serde(default)]
    pub status: String,
}
