/*!
 * Integration tests for the clipboard monitor, driven by an in-memory clipboard
 */

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::{tempdir, TempDir};

use ctxdump::clipboard::{ClipboardBridge, ClipboardError};
use ctxdump::edit::{ApplyOutcome, EditError};
use ctxdump::monitor::{CancellationToken, DispatchOutcome, MonitorLoop};

/// Clipboard backed by a shared string
#[derive(Clone, Default)]
struct FakeClipboard {
    text: Arc<Mutex<String>>,
    failing: Arc<AtomicBool>,
}

impl FakeClipboard {
    fn with_text(text: &str) -> Self {
        let clipboard = Self::default();
        clipboard.set(text);
        clipboard
    }

    fn set(&self, text: &str) {
        *self.text.lock().unwrap() = text.to_string();
    }

    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl ClipboardBridge for FakeClipboard {
    fn get_text(&self) -> Result<String, ClipboardError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClipboardError::CommandFailed("clipboard unavailable".to_string()));
        }
        Ok(self.text.lock().unwrap().clone())
    }

    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        self.set(text);
        Ok(())
    }
}

/// Clipboard whose reads hang after the first one
#[derive(Clone, Default)]
struct SlowClipboard {
    reads: Arc<AtomicUsize>,
}

impl ClipboardBridge for SlowClipboard {
    fn get_text(&self) -> Result<String, ClipboardError> {
        if self.reads.fetch_add(1, Ordering::SeqCst) > 0 {
            std::thread::sleep(Duration::from_secs(3));
        }
        Ok(String::new())
    }

    fn set_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Ok(())
    }
}

/// A project directory nested one level inside a scratch directory
fn project() -> (TempDir, PathBuf) {
    let scratch = tempdir().unwrap();
    let root = fs::canonicalize(scratch.path()).unwrap().join("project");
    fs::create_dir(&root).unwrap();
    (scratch, root)
}

fn monitor(clipboard: &FakeClipboard, root: &PathBuf) -> MonitorLoop<FakeClipboard> {
    let mut monitor = MonitorLoop::new(clipboard.clone(), root.clone(), CancellationToken::new());
    monitor.prime();
    monitor
}

#[test]
fn test_existing_clipboard_is_not_applied() {
    let (_scratch, root) = project();
    let clipboard = FakeClipboard::with_text("// stale.txt\nold paste\n");
    let mut monitor = monitor(&clipboard, &root);

    assert!(monitor.poll_once().is_none());
    assert!(!root.join("stale.txt").exists());
}

#[test]
fn test_whole_file_then_search_replace() {
    let (_scratch, root) = project();
    let clipboard = FakeClipboard::with_text("unrelated");
    let mut monitor = monitor(&clipboard, &root);

    clipboard.set("// src/a.ts\nconst a = 1;\nconst b = 1;\n");
    let outcome = monitor.poll_once();
    assert!(matches!(
        outcome,
        Some(DispatchOutcome::Applied(ApplyOutcome::Created { .. }))
    ));
    assert_eq!(
        fs::read_to_string(root.join("src/a.ts")).unwrap(),
        "const a = 1;\nconst b = 1;\n"
    );

    // Same text again is not a change
    assert!(monitor.poll_once().is_none());

    clipboard.set("// src/a.ts\n------- SEARCH\nconst b = 1;\n=======\nconst b = 2;\n+++++++ REPLACE\n");
    let outcome = monitor.poll_once();
    assert!(matches!(
        outcome,
        Some(DispatchOutcome::Applied(ApplyOutcome::Replaced { .. }))
    ));
    assert_eq!(
        fs::read_to_string(root.join("src/a.ts")).unwrap(),
        "const a = 1;\nconst b = 2;\n"
    );

    let stats = monitor.stats();
    assert_eq!(stats.applied, 2);
    assert_eq!(stats.changes, 2);
}

#[test]
fn test_escape_is_blocked() {
    let (scratch, root) = project();
    let clipboard = FakeClipboard::default();
    let mut monitor = monitor(&clipboard, &root);

    clipboard.set("// ../escape.txt\npwned\n");
    let outcome = monitor.poll_once();
    assert!(matches!(
        outcome,
        Some(DispatchOutcome::Blocked(EditError::UnsafePath { .. }))
    ));

    let escaped = fs::canonicalize(scratch.path()).unwrap().join("escape.txt");
    assert!(!escaped.exists());
    assert_eq!(monitor.stats().blocked, 1);
}

#[test]
fn test_plain_text_is_ignored() {
    let (_scratch, root) = project();
    let clipboard = FakeClipboard::default();
    let mut monitor = monitor(&clipboard, &root);

    clipboard.set("just some copied prose");
    assert!(matches!(
        monitor.poll_once(),
        Some(DispatchOutcome::NotRecognized)
    ));
    assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    assert_eq!(monitor.stats().ignored, 1);
}

#[test]
fn test_failed_search_leaves_file_alone() {
    let (_scratch, root) = project();
    fs::write(root.join("x.txt"), "hello\n").unwrap();
    let clipboard = FakeClipboard::default();
    let mut monitor = monitor(&clipboard, &root);

    clipboard.set("// x.txt\n------- SEARCH\ngoodbye\n=======\nhi\n+++++++ REPLACE\n");
    assert!(matches!(
        monitor.poll_once(),
        Some(DispatchOutcome::Failed(EditError::SearchNotFound { .. }))
    ));
    assert_eq!(fs::read_to_string(root.join("x.txt")).unwrap(), "hello\n");
}

#[test]
fn test_empty_search_is_invalid() {
    let (_scratch, root) = project();
    fs::write(root.join("x.txt"), "hello\n").unwrap();
    let clipboard = FakeClipboard::default();
    let mut monitor = monitor(&clipboard, &root);

    clipboard.set("// x.txt\n------- SEARCH\n=======\nhi\n+++++++ REPLACE\n");
    assert!(matches!(
        monitor.poll_once(),
        Some(DispatchOutcome::Invalid(EditError::EmptySearch))
    ));
    assert_eq!(fs::read_to_string(root.join("x.txt")).unwrap(), "hello\n");
}

#[test]
fn test_read_failure_is_survived() {
    let (_scratch, root) = project();
    let clipboard = FakeClipboard::default();
    let mut monitor = monitor(&clipboard, &root);

    clipboard.fail(true);
    assert!(monitor.poll_once().is_none());
    assert!(monitor.poll_once().is_none());

    clipboard.fail(false);
    clipboard.set("// ok.txt\nrecovered\n");
    assert!(matches!(
        monitor.poll_once(),
        Some(DispatchOutcome::Applied(_))
    ));
    assert_eq!(fs::read_to_string(root.join("ok.txt")).unwrap(), "recovered\n");
}

#[tokio::test]
async fn test_cancel_interrupts_long_sleep() {
    let (_scratch, root) = project();
    let clipboard = FakeClipboard::default();
    let token = CancellationToken::new();

    let monitor = MonitorLoop::new(clipboard, root, token.clone())
        .with_interval(Duration::from_secs(60));

    let stopped = tokio::time::timeout(Duration::from_secs(2), async {
        tokio::join!(monitor.run(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        })
    })
    .await;

    let (stats, ()) = stopped.expect("monitor did not stop promptly after cancel");
    assert_eq!(stats.polls, 1);
}

#[tokio::test]
async fn test_cancel_does_not_wait_for_clipboard_read() {
    let (_scratch, root) = project();
    let token = CancellationToken::new();

    let monitor = MonitorLoop::new(SlowClipboard::default(), root, token.clone())
        .with_interval(Duration::from_millis(10));

    let stopped = tokio::time::timeout(Duration::from_secs(1), async {
        tokio::join!(monitor.run(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        })
    })
    .await;

    let (stats, ()) = stopped.expect("monitor waited on a hung clipboard read");
    assert_eq!(stats.polls, 0);
}

#[test]
fn test_bare_header_keeps_file() {
    let (_scratch, root) = project();
    fs::write(root.join("main.rs"), "fn main() {}\n").unwrap();
    let clipboard = FakeClipboard::default();
    let mut monitor = monitor(&clipboard, &root);

    for header in ["// main.rs", "```rust // main.rs\n```\n"] {
        clipboard.set(header);
        assert!(matches!(
            monitor.poll_once(),
            Some(DispatchOutcome::NotRecognized)
        ));
        assert_eq!(
            fs::read_to_string(root.join("main.rs")).unwrap(),
            "fn main() {}\n"
        );
    }
    assert_eq!(monitor.stats().applied, 0);
}

#[tokio::test]
async fn test_run_applies_edit() {
    let (_scratch, root) = project();
    let clipboard = FakeClipboard::with_text("before start");
    let token = CancellationToken::new();
    let target = root.join("notes/todo.md");

    let monitor = MonitorLoop::new(clipboard.clone(), root.clone(), token.clone())
        .with_interval(Duration::from_millis(20));

    let (stats, ()) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(monitor.run(), async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            clipboard.set("// notes/todo.md\n- ship it\n");
            for _ in 0..200 {
                if target.exists() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            token.cancel();
        })
    })
    .await
    .expect("monitor did not stop");

    assert_eq!(stats.applied, 1);
    assert_eq!(fs::read_to_string(&target).unwrap(), "- ship it\n");
}
