/*!
 * Clipboard monitor
 *
 * Polls the clipboard and applies edit payloads as they appear. Each change
 * is classified, confined to the project root and written to disk; every
 * failure is logged and the loop carries on.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::clipboard::{self, ClipboardBridge, ClipboardError};
use crate::edit::{self, ApplyOutcome, EditError};

/// Default delay between clipboard polls
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Cooperative stop signal for the monitor loop
///
/// Clones share state. Cancelling wakes every pending [`cancelled`] future,
/// including one racing the loop's sleep.
///
/// [`cancelled`]: CancellationToken::cancelled
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<watch::Sender<bool>>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Request the loop to stop
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            // The sender lives as long as self
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Result of handling one clipboard change
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Not an edit payload
    NotRecognized,
    /// Recognized but malformed, nothing touched
    Invalid(EditError),
    /// Target outside the project root, nothing touched
    Blocked(EditError),
    /// Written to disk
    Applied(ApplyOutcome),
    /// The write failed, file left as it was
    Failed(EditError),
}

/// Counters reported when the monitor stops
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub polls: usize,
    pub changes: usize,
    pub applied: usize,
    pub ignored: usize,
    pub blocked: usize,
    pub failed: usize,
}

/// Polling loop that applies clipboard edits under a project root
pub struct MonitorLoop<C> {
    clipboard: C,
    root: PathBuf,
    interval: Duration,
    token: CancellationToken,
    last_seen: Option<String>,
    read_failing: bool,
    stats: MonitorStats,
}

impl<C: ClipboardBridge> MonitorLoop<C> {
    /// Create a monitor; `root` should already be absolute
    pub fn new(clipboard: C, root: impl Into<PathBuf>, token: CancellationToken) -> Self {
        Self {
            clipboard,
            root: edit::normalize(&root.into()),
            interval: DEFAULT_INTERVAL,
            token,
            last_seen: None,
            read_failing: false,
            stats: MonitorStats::default(),
        }
    }

    /// Set the delay between polls
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    /// Remember the current clipboard content without acting on it
    pub fn prime(&mut self) {
        if let Ok(text) = self.clipboard.get_text() {
            self.last_seen = Some(text);
        }
    }

    /// Read the clipboard once and dispatch a change if there is one
    pub fn poll_once(&mut self) -> Option<DispatchOutcome> {
        let read = self.clipboard.get_text();
        self.handle_read(read)
    }

    /// Act on one clipboard read
    fn handle_read(&mut self, read: clipboard::Result<String>) -> Option<DispatchOutcome> {
        self.stats.polls += 1;

        let text = match read {
            Ok(text) => {
                if self.read_failing {
                    info!("clipboard readable again");
                    self.read_failing = false;
                }
                text
            }
            Err(e) => {
                if !self.read_failing {
                    warn!("cannot read clipboard: {}", e);
                    self.read_failing = true;
                }
                return None;
            }
        };

        if text.is_empty() || self.last_seen.as_deref() == Some(text.as_str()) {
            return None;
        }

        self.stats.changes += 1;
        let outcome = self.dispatch(&text);
        self.last_seen = Some(text);

        match &outcome {
            DispatchOutcome::NotRecognized | DispatchOutcome::Invalid(_) => self.stats.ignored += 1,
            DispatchOutcome::Blocked(_) => self.stats.blocked += 1,
            DispatchOutcome::Applied(_) => self.stats.applied += 1,
            DispatchOutcome::Failed(_) => self.stats.failed += 1,
        }
        Some(outcome)
    }

    /// Classify, confine and apply one payload
    pub fn dispatch(&self, text: &str) -> DispatchOutcome {
        let op = match edit::classify(text) {
            Ok(Some(op)) => op,
            Ok(None) => {
                debug!("clipboard change is not an edit payload");
                return DispatchOutcome::NotRecognized;
            }
            Err(e) => {
                warn!("ignoring clipboard edit: {}", e);
                return DispatchOutcome::Invalid(e);
            }
        };

        let target = match edit::resolve(&self.root, op.path()) {
            Ok(target) => target,
            Err(e) => {
                if let EditError::UnsafePath { root, target } = &e {
                    warn!(
                        root = %root.display(),
                        target = %target.display(),
                        "blocked write outside project root"
                    );
                }
                return DispatchOutcome::Blocked(e);
            }
        };

        match edit::apply(&op, &target) {
            Ok(outcome) => {
                info!(
                    kind = op.kind(),
                    path = %target.relative().display(),
                    "applied clipboard edit"
                );
                DispatchOutcome::Applied(outcome)
            }
            Err(e) => {
                warn!(kind = op.kind(), "failed to apply clipboard edit: {}", e);
                DispatchOutcome::Failed(e)
            }
        }
    }
}

impl<C: ClipboardBridge + Clone + Send + 'static> MonitorLoop<C> {
    /// Run until the token is cancelled
    ///
    /// Whatever is on the clipboard at start is treated as already seen.
    /// Clipboard commands run on the blocking pool, so cancellation does not
    /// wait for a slow paste command to return.
    pub async fn run(mut self) -> MonitorStats {
        self.prime();
        info!(
            root = %self.root.display(),
            interval_ms = self.interval.as_millis() as u64,
            "watching clipboard for edits"
        );

        while !self.token.is_cancelled() {
            let reader = self.clipboard.clone();
            let read = tokio::select! {
                _ = self.token.cancelled() => break,
                joined = tokio::task::spawn_blocking(move || reader.get_text()) => {
                    joined.unwrap_or_else(|e| Err(ClipboardError::CommandFailed(e.to_string())))
                }
            };
            self.handle_read(read);

            tokio::select! {
                _ = self.token.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!(
            applied = self.stats.applied,
            blocked = self.stats.blocked,
            failed = self.stats.failed,
            "clipboard monitor stopped"
        );
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_wakes_waiters() {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        assert!(!token.is_cancelled());
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter was not woken")
            .unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_after_cancel_resolves_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("already-cancelled token must resolve");
    }
}
