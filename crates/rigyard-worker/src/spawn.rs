//! End-to-end spawn orchestration.
//!
//! One spawn reconciles worktree existence, worker record, and session
//! liveness into a single action: validate, resolve the name, take the
//! name-scoped lock, hand out a fresh checkout, resolve the assignment,
//! attach it, then start or reuse the session and deliver the initial
//! context. Everything is synchronous and blocking from the caller's view;
//! any step failing aborts the spawn with no rollback (an orphaned idle
//! checkout is replaced by the next spawn).

use crate::context::build_context;
use crate::issues::IssueClient;
use crate::lifecycle::{SpawnLocks, WorkerLifecycle};
use crate::names::NameGenerator;
use crate::session::{SessionDriver, SessionOrchestrator, SessionOutcome};
use crate::worktree::WorktreeProvider;
use chrono::Utc;
use rigyard_core::{Result, Rig, RigyardError, WorkAssignment};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

/// What to spawn: optional worker name plus the work to attach.
#[derive(Debug, Clone, Default)]
pub struct SpawnRequest {
    /// Worker name; generated when absent or empty.
    pub worker: Option<String>,
    /// External issue id to assign.
    pub issue: Option<String>,
    /// Free-form task text.
    pub message: Option<String>,
    /// Create and assign but skip session start and injection.
    pub no_start: bool,
}

/// Result of a successful spawn, for caller reporting.
#[derive(Debug, Clone)]
pub struct SpawnOutcome {
    pub rig: String,
    pub worker: String,
    /// True when the worker name came from the generator.
    pub generated_name: bool,
    pub assignment_id: String,
    /// How the session branch resolved; `None` under `no_start`.
    pub session: Option<SessionOutcome>,
    /// Session name for attach hints, when a session is live.
    pub session_name: Option<String>,
}

/// Spawn orchestrator for one rig.
pub struct Spawner<P: WorktreeProvider, I: IssueClient, D: SessionDriver> {
    rig: Rig,
    pub(crate) lifecycle: WorkerLifecycle<P>,
    pub(crate) issues: I,
    pub(crate) sessions: SessionOrchestrator<D>,
    names: Mutex<NameGenerator>,
    locks: Arc<SpawnLocks>,
}

impl<P: WorktreeProvider, I: IssueClient, D: SessionDriver> Spawner<P, I, D> {
    pub fn new(rig: Rig, provider: P, issues: I, sessions: SessionOrchestrator<D>) -> Self {
        Self {
            rig,
            lifecycle: WorkerLifecycle::new(provider),
            issues,
            sessions,
            names: Mutex::new(NameGenerator::new()),
            locks: Arc::new(SpawnLocks::new()),
        }
    }

    /// Replace the name generator (seeded RNG, custom pool).
    pub fn with_names(mut self, names: NameGenerator) -> Self {
        self.names = Mutex::new(names);
        self
    }

    /// Share a lock table across spawners for the same registry.
    pub fn with_locks(mut self, locks: Arc<SpawnLocks>) -> Self {
        self.locks = locks;
        self
    }

    /// Run one spawn operation end to end.
    #[instrument(level = "info", skip(self, request), fields(rig = %self.rig.name))]
    pub async fn spawn(&self, request: SpawnRequest) -> Result<SpawnOutcome> {
        // Validated before any side effect
        if request.issue.is_none() && request.message.is_none() {
            return Err(RigyardError::MissingAssignment);
        }

        let (worker_name, generated_name) = self.resolve_name(request.worker.as_deref()).await?;

        // Held across ensure-fresh + assign so concurrent spawns onto the
        // same name serialize instead of racing
        let _guard = self.locks.acquire(&self.rig.name, &worker_name).await;

        let worker = self.lifecycle.ensure_fresh(&worker_name).await?;

        // Non-fatal: the checkout may already carry tracker state
        if let Err(e) = self.issues.init_worktree(&worker.checkout).await {
            warn!(worker = %worker_name, error = %e, "tracker init in worktree failed");
        }

        let issue = match &request.issue {
            Some(issue_id) => Some(self.issues.fetch(&self.rig.path, issue_id).await?),
            None => None,
        };

        let assignment = match (&issue, &request.message) {
            (Some(issue), _) => WorkAssignment::Issue(issue.clone()),
            (None, Some(message)) => WorkAssignment::Task(message.clone()),
            (None, None) => unreachable!("validated above"),
        };
        let assignment_id = assignment.id_at(Utc::now());

        self.lifecycle.assign_work(&worker_name, &assignment_id).await?;
        info!(
            rig = %self.rig.name,
            worker = %worker_name,
            assignment = %assignment_id,
            "work assigned"
        );

        if request.no_start {
            return Ok(SpawnOutcome {
                rig: self.rig.name.clone(),
                worker: worker_name,
                generated_name,
                assignment_id,
                session: None,
                session_name: None,
            });
        }

        let context = build_context(issue.as_ref(), request.message.as_deref());
        let session = self.sessions.deliver(&worker_name, &context).await?;

        Ok(SpawnOutcome {
            rig: self.rig.name.clone(),
            worker: worker_name.clone(),
            generated_name,
            assignment_id,
            session: Some(session),
            session_name: Some(self.sessions.session_name(&worker_name)),
        })
    }

    /// Use the requested name, or draw one that no known worker holds.
    ///
    /// Public so callers can resolve (and report) the name before the slow
    /// spawn steps run; passing the resolved name back in the request makes
    /// [`spawn`](Self::spawn) use it as-is. The second element is true when
    /// the name came from the generator.
    pub async fn resolve_name(&self, requested: Option<&str>) -> Result<(String, bool)> {
        if let Some(name) = requested.filter(|name| !name.is_empty()) {
            return Ok((name.to_string(), false));
        }

        let existing: HashSet<String> = self
            .lifecycle
            .provider()
            .list()
            .await?
            .into_iter()
            .map(|worker| worker.name)
            .collect();

        let name = self.names.lock().unwrap().generate(&existing);
        info!(worker = %name, "generated worker name");
        Ok((name, true))
    }
}
