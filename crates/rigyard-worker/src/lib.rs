//! Worker spawn orchestration for rigyard.
//!
//! This crate implements the spawn flow: parsing a worker address,
//! generating a collision-free worker name, enforcing the ephemeral-worker
//! lifecycle, resolving a work assignment from the external tracker, and
//! starting or reusing the worker's tmux session before injecting the
//! initial task context.
//!
//! # Overview
//!
//! ```text
//! address ──► name ──► lifecycle ──► assignment ──► session ──► context
//!  parse     generate  fresh checkout  issue/task    start/reuse  inject
//! ```
//!
//! The external subsystems - worktree manager, issue tracker, terminal
//! sessions - sit behind traits ([`WorktreeProvider`], [`IssueClient`],
//! [`SessionDriver`]) with subprocess-backed production implementations, so
//! the orchestration logic itself carries no subprocess plumbing.
//!
//! # Example
//!
//! ```no_run
//! use rigyard_core::Rig;
//! use rigyard_worker::{
//!     BeadsCli, GitWorktrees, SessionOrchestrator, SpawnRequest, Spawner, TmuxDriver,
//! };
//!
//! #[tokio::main]
//! async fn main() -> rigyard_core::Result<()> {
//!     let rig = Rig::new("demo-rig", "/town/rigs/demo");
//!
//!     let spawner = Spawner::new(
//!         rig.clone(),
//!         GitWorktrees::new(rig.clone()),
//!         BeadsCli::new(),
//!         SessionOrchestrator::new(TmuxDriver::new(rig)),
//!     );
//!
//!     let outcome = spawner
//!         .spawn(SpawnRequest {
//!             message: Some("Fix the tests".into()),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     println!("assigned {} to {}/{}", outcome.assignment_id, outcome.rig, outcome.worker);
//!     Ok(())
//! }
//! ```

pub mod address;
pub mod context;
pub mod issues;
pub mod lifecycle;
pub mod names;
pub mod session;
pub mod spawn;
pub mod tmux;
pub mod worktree;

#[cfg(test)]
mod spawn_tests;

// Re-export main types for convenience
pub use address::{parse_address, Address};
pub use context::build_context;
pub use issues::{BeadsCli, IssueClient};
pub use lifecycle::{SpawnLocks, WorkerLifecycle};
pub use names::NameGenerator;
pub use session::{
    SessionDriver, SessionOrchestrator, SessionOutcome, SessionReadiness, TmuxDriver,
};
pub use spawn::{SpawnOutcome, SpawnRequest, Spawner};
pub use worktree::{GitWorktrees, MemoryWorktrees, WorktreeProvider};
