//! Integration tests for the spawn flow.
//!
//! These drive [`Spawner`](crate::spawn::Spawner) end to end against
//! in-memory fakes for the worktree provider, issue client, and session
//! driver:
//! - validation before side effects
//! - name generation on an empty registry
//! - replace-idle / protect-working behavior through the full flow
//! - no-start short circuit
//! - start-vs-reuse and context delivery

#[cfg(test)]
mod tests {
    use crate::issues::IssueClient;
    use crate::names::NameGenerator;
    use crate::session::{SessionDriver, SessionOrchestrator, SessionOutcome, SessionReadiness};
    use crate::spawn::{SpawnRequest, Spawner};
    use crate::worktree::{MemoryWorktrees, WorktreeProvider};
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rigyard_core::{Issue, Result, Rig, RigyardError, Worker, WorkerState};
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct FakeIssues {
        issues: HashMap<String, Issue>,
        init_calls: AtomicUsize,
        fail_init: bool,
        fetch_calls: AtomicUsize,
    }

    impl FakeIssues {
        fn with_issue(issue: Issue) -> Self {
            let mut issues = HashMap::new();
            issues.insert(issue.id.clone(), issue);
            Self {
                issues,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl IssueClient for FakeIssues {
        async fn fetch(&self, _rig_path: &Path, issue_id: &str) -> Result<Issue> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.issues
                .get(issue_id)
                .cloned()
                .ok_or_else(|| RigyardError::IssueNotFound {
                    issue_id: issue_id.to_string(),
                })
        }

        async fn init_worktree(&self, _path: &Path) -> Result<()> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_init {
                return Err(RigyardError::internal("already initialized"));
            }
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct FakeSessions {
        running: AtomicBool,
        starts: AtomicUsize,
        injected: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SessionDriver for FakeSessions {
        fn session_name(&self, worker: &str) -> String {
            format!("rigyard-demo-rig-{worker}")
        }

        async fn is_running(&self, _worker: &str) -> Result<bool> {
            Ok(self.running.load(Ordering::SeqCst))
        }

        async fn start(&self, _worker: &str) -> Result<()> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn is_ready(&self, _worker: &str) -> Result<bool> {
            Ok(true)
        }

        async fn inject(&self, _worker: &str, text: &str) -> Result<()> {
            self.injected.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn test_spawner(
        provider: MemoryWorktrees,
        issues: FakeIssues,
    ) -> Spawner<MemoryWorktrees, FakeIssues, FakeSessions> {
        let rig = Rig::new("demo-rig", "/repos/demo");
        let sessions = SessionOrchestrator::new(FakeSessions::default()).with_readiness(
            SessionReadiness {
                timeout: Duration::from_millis(50),
                interval: Duration::from_millis(1),
            },
        );
        Spawner::new(rig, provider, issues, sessions)
            .with_names(NameGenerator::with_rng(StdRng::seed_from_u64(42)))
    }

    fn sample_issue() -> Issue {
        Issue {
            id: "gt-1".into(),
            title: "Fix X".into(),
            description: "It is broken".into(),
            priority: 2,
            issue_type: "bug".into(),
            status: "open".into(),
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[tokio::test]
    async fn test_missing_assignment_fails_before_any_side_effect() {
        let spawner = test_spawner(MemoryWorktrees::new(), FakeIssues::default());

        let result = spawner.spawn(SpawnRequest::default()).await;
        assert!(matches!(result, Err(RigyardError::MissingAssignment)));

        // Nothing was created, initialized, or fetched
        assert_eq!(spawner.lifecycle.provider().creates(), 0);
        assert_eq!(spawner.issues.init_calls.load(Ordering::SeqCst), 0);
        assert_eq!(spawner.issues.fetch_calls.load(Ordering::SeqCst), 0);
    }

    // =========================================================================
    // End-to-end free-form spawn
    // =========================================================================

    #[tokio::test]
    async fn test_spawn_with_message_on_empty_registry() {
        let spawner = test_spawner(MemoryWorktrees::new(), FakeIssues::default());

        let outcome = spawner
            .spawn(SpawnRequest {
                message: Some("Fix the tests".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.rig, "demo-rig");
        assert!(outcome.generated_name, "name should come from the pool");
        assert!(outcome.assignment_id.starts_with("task:"));
        assert_eq!(outcome.session, Some(SessionOutcome::Started));
        assert_eq!(
            outcome.session_name.as_deref(),
            Some(format!("rigyard-demo-rig-{}", outcome.worker).as_str())
        );

        let injected = spawner.injected();
        assert_eq!(injected.len(), 1);
        assert!(injected[0].starts_with("[SPAWN] You have been assigned work."));
        assert!(injected[0].contains("Task: Fix the tests\n"));
    }

    #[tokio::test]
    async fn test_spawn_with_issue_renders_issue_context() {
        let spawner = test_spawner(
            MemoryWorktrees::new(),
            FakeIssues::with_issue(sample_issue()),
        );

        let outcome = spawner
            .spawn(SpawnRequest {
                worker: Some("Toast".into()),
                issue: Some("gt-1".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.worker, "Toast");
        assert!(!outcome.generated_name);
        assert_eq!(outcome.assignment_id, "gt-1");

        let injected = spawner.injected();
        assert!(injected[0].contains("Issue: gt-1\n"));
        assert!(injected[0].contains("Priority: P2\n"));
        assert!(injected[0].contains("Description:\nIt is broken\n"));
    }

    #[tokio::test]
    async fn test_unknown_issue_aborts_after_checkout() {
        let spawner = test_spawner(MemoryWorktrees::new(), FakeIssues::default());

        let result = spawner
            .spawn(SpawnRequest {
                worker: Some("Toast".into()),
                issue: Some("gt-404".into()),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(RigyardError::IssueNotFound { .. })));

        // The fresh checkout stays idle; the next spawn replaces it
        let worker = spawner.worker("Toast").await.unwrap();
        assert_eq!(worker.state, WorkerState::Idle);
    }

    // =========================================================================
    // Lifecycle protection through the full flow
    // =========================================================================

    #[tokio::test]
    async fn test_spawn_onto_working_worker_fails_busy() {
        let provider = MemoryWorktrees::new();
        let mut busy = Worker::new("Nux", "/tmp/worktrees/Nux");
        busy.state = WorkerState::Working;
        busy.assignment = Some("gt-9".into());
        provider.seed(busy);

        let spawner = test_spawner(provider, FakeIssues::default());
        let result = spawner
            .spawn(SpawnRequest {
                worker: Some("Nux".into()),
                message: Some("steal the rig".into()),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(RigyardError::WorkerBusy { .. })));
        assert!(spawner.injected().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_spawns_onto_one_name_serialize() {
        let spawner = test_spawner(MemoryWorktrees::new(), FakeIssues::default());

        let request = |message: &str| SpawnRequest {
            worker: Some("Nux".into()),
            message: Some(message.to_string()),
            ..Default::default()
        };
        let results = {
            let (first, second) = tokio::join!(
                spawner.spawn(request("convoy run")),
                spawner.spawn(request("guard the gate")),
            );
            [first, second]
        };

        // The per-worker lock lets exactly one spawn through; the loser
        // observes the winner's Working state and fails busy
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(RigyardError::WorkerBusy { .. }))));

        assert_eq!(spawner.lifecycle.provider().creates(), 1);
        assert_eq!(spawner.injected().len(), 1);
        let worker = spawner.worker("Nux").await.unwrap();
        assert_eq!(worker.state, WorkerState::Working);
    }

    #[tokio::test]
    async fn test_generated_name_avoids_existing_workers() {
        let provider = MemoryWorktrees::new();
        for name in ["Nux", "Toast", "Capable"] {
            provider.seed(Worker::new(name, format!("/tmp/worktrees/{name}")));
        }

        let spawner = test_spawner(provider, FakeIssues::default());
        let outcome = spawner
            .spawn(SpawnRequest {
                message: Some("new work".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(!["Nux", "Toast", "Capable"].contains(&outcome.worker.as_str()));
    }

    #[tokio::test]
    async fn test_empty_worker_name_is_generated() {
        let spawner = test_spawner(MemoryWorktrees::new(), FakeIssues::default());

        let outcome = spawner
            .spawn(SpawnRequest {
                worker: Some(String::new()),
                message: Some("work".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(outcome.generated_name);
        assert!(!outcome.worker.is_empty());
    }

    #[tokio::test]
    async fn test_name_resolved_up_front_survives_the_spawn() {
        let spawner = test_spawner(MemoryWorktrees::new(), FakeIssues::default());

        // Callers resolve early to report the name before the slow steps;
        // feeding it back must not trigger a second generation
        let (name, generated) = spawner.resolve_name(None).await.unwrap();
        assert!(generated);

        let outcome = spawner
            .spawn(SpawnRequest {
                worker: Some(name.clone()),
                message: Some("work".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.worker, name);
        assert!(!outcome.generated_name);

        let (explicit, generated) = spawner.resolve_name(Some("Toast")).await.unwrap();
        assert_eq!(explicit, "Toast");
        assert!(!generated);
    }

    // =========================================================================
    // Session branch
    // =========================================================================

    #[tokio::test]
    async fn test_no_start_skips_session_entirely() {
        let spawner = test_spawner(MemoryWorktrees::new(), FakeIssues::default());

        let outcome = spawner
            .spawn(SpawnRequest {
                worker: Some("Dag".into()),
                message: Some("work".into()),
                no_start: true,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.session, None);
        assert_eq!(outcome.session_name, None);
        assert!(spawner.injected().is_empty());

        // Assignment still happened
        let worker = spawner.worker("Dag").await.unwrap();
        assert_eq!(worker.state, WorkerState::Working);
    }

    #[tokio::test]
    async fn test_running_session_is_reused_not_restarted() {
        let spawner = test_spawner(MemoryWorktrees::new(), FakeIssues::default());
        spawner.set_session_running(true);

        let outcome = spawner
            .spawn(SpawnRequest {
                worker: Some("Dag".into()),
                message: Some("work".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.session, Some(SessionOutcome::Reused));
        assert_eq!(spawner.session_starts(), 0);
        assert_eq!(spawner.injected().len(), 1);
    }

    #[tokio::test]
    async fn test_tracker_init_failure_is_non_fatal() {
        let issues = FakeIssues {
            fail_init: true,
            ..Default::default()
        };
        let spawner = test_spawner(MemoryWorktrees::new(), issues);

        let outcome = spawner
            .spawn(SpawnRequest {
                worker: Some("Cheedo".into()),
                message: Some("work".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.session, Some(SessionOutcome::Started));
    }

    // =========================================================================
    // Test access helpers
    // =========================================================================

    impl Spawner<MemoryWorktrees, FakeIssues, FakeSessions> {
        async fn worker(&self, name: &str) -> Option<Worker> {
            self.lifecycle.provider().get(name).await.unwrap()
        }

        fn injected(&self) -> Vec<String> {
            self.sessions.driver().injected.lock().unwrap().clone()
        }

        fn session_starts(&self) -> usize {
            self.sessions.driver().starts.load(Ordering::SeqCst)
        }

        fn set_session_running(&self, running: bool) {
            self.sessions.driver().running.store(running, Ordering::SeqCst);
        }
    }
}
