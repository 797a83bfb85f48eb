//! Session orchestration: start-or-reuse plus context delivery.
//!
//! The orchestrator decides whether a worker's interactive session must be
//! started or can be reused, waits for a fresh session to become ready by
//! polling the driver against a bounded deadline, then injects the initial
//! context. Start and injection failures are fatal to the spawn; nothing is
//! retried.

use crate::tmux;
use async_trait::async_trait;
use rigyard_core::{Result, Rig, RigyardError};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// External terminal-session manager interface.
///
/// Liveness is queried per call, never cached.
#[async_trait]
pub trait SessionDriver: Send + Sync {
    /// Session name for a worker, as the session manager knows it.
    fn session_name(&self, worker: &str) -> String;

    /// Whether a session for this worker is currently running.
    async fn is_running(&self, worker: &str) -> Result<bool>;

    /// Start a detached session for the worker.
    async fn start(&self, worker: &str) -> Result<()>;

    /// Whether a started session is ready to accept input.
    async fn is_ready(&self, worker: &str) -> Result<bool>;

    /// Deliver text into the worker's session.
    async fn inject(&self, worker: &str, text: &str) -> Result<()>;
}

/// Bounds for the readiness poll after starting a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionReadiness {
    /// Give up after this long without a ready signal.
    pub timeout: Duration,
    /// Delay between readiness probes.
    pub interval: Duration,
}

impl Default for SessionReadiness {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            interval: Duration::from_millis(250),
        }
    }
}

/// How the session branch resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A new session was started and became ready.
    Started,
    /// An already-running session was reused as-is.
    Reused,
}

/// Start-or-reuse orchestration over a [`SessionDriver`].
#[derive(Debug)]
pub struct SessionOrchestrator<D: SessionDriver> {
    driver: D,
    readiness: SessionReadiness,
}

impl<D: SessionDriver> SessionOrchestrator<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            readiness: SessionReadiness::default(),
        }
    }

    pub fn with_readiness(mut self, readiness: SessionReadiness) -> Self {
        self.readiness = readiness;
        self
    }

    /// Session name for display (attach hints).
    pub fn session_name(&self, worker: &str) -> String {
        self.driver.session_name(worker)
    }

    #[cfg(test)]
    pub(crate) fn driver(&self) -> &D {
        &self.driver
    }

    /// Ensure a live session, then inject `context` into it.
    #[instrument(level = "info", skip(self, context))]
    pub async fn deliver(&self, worker: &str, context: &str) -> Result<SessionOutcome> {
        let outcome = if self.driver.is_running(worker).await? {
            info!(worker, "session already running, reusing");
            SessionOutcome::Reused
        } else {
            info!(worker, "starting session");
            self.driver.start(worker).await?;
            self.wait_ready(worker).await?;
            SessionOutcome::Started
        };

        self.driver.inject(worker, context).await?;
        debug!(worker, "context injected");
        Ok(outcome)
    }

    /// Poll the driver until it reports ready or the deadline passes.
    async fn wait_ready(&self, worker: &str) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.readiness.timeout;

        loop {
            if self.driver.is_ready(worker).await? {
                debug!(worker, "session ready");
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(RigyardError::SessionStart {
                    session: self.driver.session_name(worker),
                    message: format!(
                        "session not ready after {:?}",
                        self.readiness.timeout
                    ),
                });
            }
            tokio::time::sleep(self.readiness.interval).await;
        }
    }
}

/// Tmux-backed session driver.
///
/// Sessions are named `rigyard-<rig>-<worker>` and started detached in the
/// worker's checkout. Readiness is approximated by the pane having a live
/// process; a richer prompt-ready probe would slot in here.
#[derive(Debug, Clone)]
pub struct TmuxDriver {
    rig: Rig,
    /// Command to run in the session, if any (defaults to the user's shell).
    command: Option<String>,
}

impl TmuxDriver {
    pub fn new(rig: Rig) -> Self {
        Self { rig, command: None }
    }

    /// Run `command` in new sessions instead of the default shell.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    fn checkout_dir(&self, worker: &str) -> std::path::PathBuf {
        self.rig.path.join(".rigyard").join("worktrees").join(worker)
    }
}

#[async_trait]
impl SessionDriver for TmuxDriver {
    fn session_name(&self, worker: &str) -> String {
        format!("rigyard-{}-{}", self.rig.name, worker)
    }

    async fn is_running(&self, worker: &str) -> Result<bool> {
        tmux::session_exists(&self.session_name(worker)).await
    }

    async fn start(&self, worker: &str) -> Result<()> {
        tmux::create_session(
            &self.session_name(worker),
            &self.checkout_dir(worker),
            self.command.as_deref(),
        )
        .await
    }

    async fn is_ready(&self, worker: &str) -> Result<bool> {
        let session = self.session_name(worker);
        if !tmux::session_exists(&session).await? {
            return Ok(false);
        }
        Ok(tmux::get_session_pid(&session).await?.is_some())
    }

    async fn inject(&self, worker: &str, text: &str) -> Result<()> {
        tmux::send_text(&self.session_name(worker), text).await
    }
}
