//! Worktree provider: the seam to the external repository manager.
//!
//! The lifecycle state machine never touches git or the filesystem
//! directly; it drives a [`WorktreeProvider`]. The production provider,
//! [`GitWorktrees`], shells out to `git worktree` and persists worker
//! records as JSON files under the rig's `.rigyard` directory. Tests use
//! [`MemoryWorktrees`], an in-memory provider with the same contract.

use async_trait::async_trait;
use rigyard_core::{Result, Rig, RigyardError, Worker, WorkerState};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// External repository/worker manager interface.
///
/// Absent workers are `None` from [`get`](Self::get), not an error. All
/// mutations are persisted by the provider; this crate only commands them.
#[async_trait]
pub trait WorktreeProvider: Send + Sync {
    /// Look up a worker record by name.
    async fn get(&self, name: &str) -> Result<Option<Worker>>;

    /// List all worker records known to the rig.
    async fn list(&self) -> Result<Vec<Worker>>;

    /// Provision a fresh checkout from the rig's main line plus an Idle record.
    async fn create(&self, name: &str) -> Result<Worker>;

    /// Destroy a worker's checkout and record.
    async fn remove(&self, name: &str, force: bool) -> Result<()>;

    /// Attach an assignment id and flip the record to Working.
    async fn assign(&self, name: &str, assignment_id: &str) -> Result<()>;
}

/// Git-backed provider: `git worktree` checkouts plus JSON records.
///
/// Layout under the rig repository:
/// - records:   `<rig>/.rigyard/workers/<name>.json`
/// - checkouts: `<rig>/.rigyard/worktrees/<name>`
#[derive(Debug, Clone)]
pub struct GitWorktrees {
    rig: Rig,
}

impl GitWorktrees {
    pub fn new(rig: Rig) -> Self {
        Self { rig }
    }

    fn workers_dir(&self) -> PathBuf {
        self.rig.path.join(".rigyard").join("workers")
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.workers_dir().join(format!("{name}.json"))
    }

    fn checkout_path(&self, name: &str) -> PathBuf {
        self.rig.path.join(".rigyard").join("worktrees").join(name)
    }

    async fn run_git(&self, name: &str, operation: &str, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.rig.path)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                RigyardError::worktree(name, operation, format!("failed to run git: {e}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RigyardError::worktree(
                name,
                operation,
                format!("git {}: {}", args.first().unwrap_or(&""), stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Resolve the rig's main line: `origin/HEAD` when set, `main` otherwise.
    async fn main_line(&self, name: &str) -> Result<String> {
        match self
            .run_git(name, "resolving main line", &[
                "symbolic-ref",
                "--short",
                "refs/remotes/origin/HEAD",
            ])
            .await
        {
            Ok(reference) => Ok(reference.trim().to_string()),
            Err(_) => Ok("main".to_string()),
        }
    }

    async fn write_record(&self, worker: &Worker) -> Result<()> {
        let dir = self.workers_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| RigyardError::DirectoryCreation {
                path: dir.clone(),
                source: e,
            })?;

        let json = serde_json::to_string_pretty(worker)
            .map_err(|e| RigyardError::json_parse("serializing worker record", e))?;
        let path = self.record_path(&worker.name);
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| RigyardError::io("writing worker record", &path, e))
    }
}

#[async_trait]
impl WorktreeProvider for GitWorktrees {
    async fn get(&self, name: &str) -> Result<Option<Worker>> {
        let path = self.record_path(name);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RigyardError::io("reading worker record", &path, e)),
        };

        let worker = serde_json::from_str(&contents)
            .map_err(|e| RigyardError::json_parse(format!("worker record {name}"), e))?;
        Ok(Some(worker))
    }

    async fn list(&self) -> Result<Vec<Worker>> {
        let dir = self.workers_dir();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RigyardError::io("listing worker records", &dir, e)),
        };

        let mut workers = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RigyardError::io("listing worker records", &dir, e))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| RigyardError::io("reading worker record", &path, e))?;
            match serde_json::from_str::<Worker>(&contents) {
                Ok(worker) => workers.push(worker),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping malformed worker record"),
            }
        }

        Ok(workers)
    }

    #[instrument(level = "debug", skip(self), fields(rig = %self.rig.name))]
    async fn create(&self, name: &str) -> Result<Worker> {
        let checkout = self.checkout_path(name);
        let parent = checkout.parent().unwrap_or(&checkout).to_path_buf();
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| RigyardError::DirectoryCreation {
                path: parent,
                source: e,
            })?;

        let main_line = self.main_line(name).await?;
        let checkout_str = checkout.to_string_lossy().to_string();
        self.run_git(name, "creating checkout", &[
            "worktree",
            "add",
            "--detach",
            &checkout_str,
            &main_line,
        ])
        .await?;

        let worker = Worker::new(name, &checkout);
        self.write_record(&worker).await?;
        debug!(worker = name, checkout = %checkout.display(), "created fresh checkout");
        Ok(worker)
    }

    #[instrument(level = "debug", skip(self), fields(rig = %self.rig.name))]
    async fn remove(&self, name: &str, force: bool) -> Result<()> {
        let checkout = self.checkout_path(name);
        let checkout_str = checkout.to_string_lossy().to_string();

        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&checkout_str);

        if checkout.exists() {
            self.run_git(name, "removing checkout", &args).await?;
        } else {
            // A manually deleted checkout leaves worktree metadata behind
            // that would block re-adding the same path
            if let Err(e) = self
                .run_git(name, "pruning worktrees", &["worktree", "prune"])
                .await
            {
                warn!(worker = name, error = %e, "worktree prune failed");
            }
        }

        let record = self.record_path(name);
        match tokio::fs::remove_file(&record).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(RigyardError::io("removing worker record", &record, e)),
        }

        debug!(worker = name, "removed worker");
        Ok(())
    }

    async fn assign(&self, name: &str, assignment_id: &str) -> Result<()> {
        let mut worker = self
            .get(name)
            .await?
            .ok_or_else(|| RigyardError::WorkerNotFound {
                worker: name.to_string(),
            })?;

        worker.assignment = Some(assignment_id.to_string());
        worker.state = WorkerState::Working;
        self.write_record(&worker).await
    }
}

/// In-memory provider for tests.
#[derive(Debug, Default)]
pub struct MemoryWorktrees {
    workers: std::sync::Mutex<std::collections::HashMap<String, Worker>>,
    /// Counts checkout creations, so tests can assert freshness.
    creates: std::sync::atomic::AtomicUsize,
}

impl MemoryWorktrees {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a worker record directly, bypassing the create path.
    pub fn seed(&self, worker: Worker) {
        self.workers
            .lock()
            .unwrap()
            .insert(worker.name.clone(), worker);
    }

    /// Number of checkouts created so far.
    pub fn creates(&self) -> usize {
        self.creates.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl WorktreeProvider for MemoryWorktrees {
    async fn get(&self, name: &str) -> Result<Option<Worker>> {
        Ok(self.workers.lock().unwrap().get(name).cloned())
    }

    async fn list(&self) -> Result<Vec<Worker>> {
        Ok(self.workers.lock().unwrap().values().cloned().collect())
    }

    async fn create(&self, name: &str) -> Result<Worker> {
        self.creates
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let worker = Worker::new(name, Path::new("/tmp/worktrees").join(name));
        self.workers
            .lock()
            .unwrap()
            .insert(name.to_string(), worker.clone());
        Ok(worker)
    }

    async fn remove(&self, name: &str, _force: bool) -> Result<()> {
        self.workers.lock().unwrap().remove(name);
        Ok(())
    }

    async fn assign(&self, name: &str, assignment_id: &str) -> Result<()> {
        let mut workers = self.workers.lock().unwrap();
        let worker = workers
            .get_mut(name)
            .ok_or_else(|| RigyardError::WorkerNotFound {
                worker: name.to_string(),
            })?;
        worker.assignment = Some(assignment_id.to_string());
        worker.state = WorkerState::Working;
        Ok(())
    }
}
