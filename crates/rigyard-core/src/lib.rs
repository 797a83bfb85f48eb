//! # rigyard-core
//!
//! Core types, errors, and utilities for the rigyard spawn orchestrator.
//!
//! This crate provides:
//! - [`RigyardError`] - Error types for every spawn step
//! - [`logging`] - Tracing setup and log management
//! - [`types`] - Shared type definitions (rigs, workers, issues)
//! - [`workspace`] - Workspace root discovery
//! - [`config`] - Rigs registry loading and rig resolution
//!
//! ## Example
//!
//! ```no_run
//! use rigyard_core::{config::RigsConfig, logging, workspace};
//!
//! fn main() -> rigyard_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     let root = workspace::find_from_cwd()?;
//!     let rigs = RigsConfig::load(&workspace::rigs_config_path(&root))?;
//!     let rig = rigs.resolve(&root, "demo-rig")?;
//!     println!("rig at {}", rig.path.display());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod types;
pub mod workspace;

// Re-export main types for convenience
pub use error::{Result, RigyardError};
pub use logging::{init_logging, LogGuard};
pub use types::{Issue, Rig, WorkAssignment, Worker, WorkerState};
