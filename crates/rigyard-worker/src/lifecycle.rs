//! Worker lifecycle state machine.
//!
//! Workers are ephemeral: a spawn onto a free name provisions a fresh
//! checkout, a spawn onto an idle name replaces checkout and record, and a
//! spawn onto a working name fails without touching anything. That last
//! rule is the central safety invariant - active work is never silently
//! discarded.

use crate::worktree::WorktreeProvider;
use rigyard_core::{Result, RigyardError, Worker};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

/// Per-(rig, worker-name) exclusion for the lifecycle transition sequence.
///
/// Two concurrent spawns onto the same name would otherwise both observe
/// Idle and both replace the checkout. Holding the name-scoped lock across
/// ensure-fresh plus assign serializes them: the second comes in after the
/// first has flipped the worker to Working and fails busy. In-process only;
/// cross-process spawns remain unguarded.
#[derive(Debug, Default)]
pub struct SpawnLocks {
    locks: Mutex<HashMap<(String, String), Arc<tokio::sync::Mutex<()>>>>,
}

impl SpawnLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `(rig, worker)`, waiting if another spawn holds it.
    pub async fn acquire(&self, rig: &str, worker: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap();
            locks
                .entry((rig.to_string(), worker.to_string()))
                .or_default()
                .clone()
        };
        lock.lock_owned().await
    }
}

/// Enforces the create/replace/working-protection state machine for one rig.
#[derive(Debug)]
pub struct WorkerLifecycle<P: WorktreeProvider> {
    provider: P,
}

impl<P: WorktreeProvider> WorkerLifecycle<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Access the underlying provider (registry listings).
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Ensure `name` refers to an idle worker with a fresh checkout.
    ///
    /// - Absent: create.
    /// - Idle: remove (force) and create, so the checkout reflects the
    ///   current main line rather than stale content.
    /// - Working: fail with [`RigyardError::WorkerBusy`]; no state change.
    ///
    /// Delegate failures propagate and abort the spawn; no partial-state
    /// cleanup beyond what the delegate itself guarantees.
    #[instrument(level = "info", skip(self))]
    pub async fn ensure_fresh(&self, name: &str) -> Result<Worker> {
        if let Some(existing) = self.provider.get(name).await? {
            if existing.is_working() {
                let assignment = existing
                    .assignment
                    .unwrap_or_else(|| "an unknown assignment".to_string());
                return Err(RigyardError::worker_busy(name, assignment));
            }
            info!(worker = name, "removing stale worker for fresh checkout");
            self.provider.remove(name, true).await?;
        }

        info!(worker = name, "creating fresh worker");
        let worker = self.provider.create(name).await?;
        debug!(worker = name, checkout = %worker.checkout.display(), "worker ready");
        Ok(worker)
    }

    /// Attach an assignment and flip the worker to Working.
    #[instrument(level = "info", skip(self))]
    pub async fn assign_work(&self, name: &str, assignment_id: &str) -> Result<()> {
        self.provider
            .assign(name, assignment_id)
            .await
            .map_err(|e| match e {
                not_found @ RigyardError::WorkerNotFound { .. } => not_found,
                other => RigyardError::Assignment {
                    worker: name.to_string(),
                    message: other.to_string(),
                },
            })?;

        info!(worker = name, assignment = assignment_id, "assignment attached");
        Ok(())
    }
}
