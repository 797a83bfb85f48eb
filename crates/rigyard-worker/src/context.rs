//! Initial context rendering.
//!
//! Pure rendering of the first message delivered to a worker session: a
//! banner, the issue or task body, and a closing instruction. Callers
//! guarantee that at least one of issue/message is present (validated
//! before any side effect); with neither, only banner and closing lines
//! are emitted.

use rigyard_core::Issue;
use std::fmt::Write;

/// Render the initial work-assignment message.
pub fn build_context(issue: Option<&Issue>, message: Option<&str>) -> String {
    let mut out = String::new();

    out.push_str("[SPAWN] You have been assigned work.\n\n");

    if let Some(issue) = issue {
        let _ = writeln!(out, "Issue: {}", issue.id);
        let _ = writeln!(out, "Title: {}", issue.title);
        let _ = writeln!(out, "Priority: P{}", issue.priority);
        let _ = writeln!(out, "Type: {}", issue.issue_type);
        if !issue.description.is_empty() {
            let _ = writeln!(out, "\nDescription:\n{}", issue.description);
        }
    } else if let Some(message) = message {
        let _ = writeln!(out, "Task: {message}");
    }

    out.push_str("\nWork on this task. When complete, commit your changes and signal DONE.\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_issue() -> Issue {
        Issue {
            id: "gt-1".into(),
            title: "Fix X".into(),
            description: String::new(),
            priority: 2,
            issue_type: "bug".into(),
            status: "open".into(),
        }
    }

    #[test]
    fn test_issue_without_description() {
        let context = build_context(Some(&sample_issue()), None);

        assert!(context.starts_with("[SPAWN] You have been assigned work.\n\n"));
        assert!(context.contains("Issue: gt-1\n"));
        assert!(context.contains("Title: Fix X\n"));
        assert!(context.contains("Priority: P2\n"));
        assert!(context.contains("Type: bug\n"));
        assert!(!context.contains("Description:"));
        assert!(context.ends_with(
            "\nWork on this task. When complete, commit your changes and signal DONE.\n"
        ));
    }

    #[test]
    fn test_issue_with_description() {
        let mut issue = sample_issue();
        issue.description = "Steps to reproduce...".into();

        let context = build_context(Some(&issue), None);
        assert!(context.contains("\nDescription:\nSteps to reproduce...\n"));
    }

    #[test]
    fn test_free_form_task() {
        let context = build_context(None, Some("Fix the tests"));
        assert!(context.contains("Task: Fix the tests\n"));
        assert!(!context.contains("Issue:"));
    }

    #[test]
    fn test_issue_wins_over_message() {
        let context = build_context(Some(&sample_issue()), Some("ignored"));
        assert!(context.contains("Issue: gt-1"));
        assert!(!context.contains("Task: ignored"));
    }

    #[test]
    fn test_deterministic() {
        let issue = sample_issue();
        let first = build_context(Some(&issue), None);
        let second = build_context(Some(&issue), None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_neither_still_frames_banner_and_closing() {
        let context = build_context(None, None);
        assert!(context.starts_with("[SPAWN]"));
        assert!(context.contains("signal DONE"));
    }
}
