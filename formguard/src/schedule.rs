//! One-shot deferred callbacks that can be cancelled.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Lifecycle of a [`ScheduledTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Still waiting for its delay to elapse.
    Pending,
    /// The callback ran.
    Completed,
    /// Cancelled before the callback ran.
    Cancelled,
}

/// A callback scheduled to run once after a delay.
///
/// Dropping the handle does not cancel the task; call [`cancel`](Self::cancel).
/// Clones share the same task.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    token: CancellationToken,
    state: watch::Receiver<TaskState>,
}

impl ScheduledTask {
    /// Spawn `callback` on `runtime` to run after `delay`.
    pub fn spawn<F>(runtime: &Handle, delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::spawn_with_token(runtime, CancellationToken::new(), delay, callback)
    }

    /// Like [`spawn`](Self::spawn), cancelled whenever `token` is.
    pub fn spawn_with_token<F>(
        runtime: &Handle,
        token: CancellationToken,
        delay: Duration,
        callback: F,
    ) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (tx, rx) = watch::channel(TaskState::Pending);
        let task_token = token.clone();

        runtime.spawn(async move {
            let state = tokio::select! {
                biased;
                _ = task_token.cancelled() => TaskState::Cancelled,
                _ = tokio::time::sleep(delay) => {
                    callback();
                    TaskState::Completed
                }
            };
            let _ = tx.send(state);
        });

        Self { token, state: rx }
    }

    /// Prevent the callback from running. No effect once it has run.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    /// Still waiting and not cancelled.
    pub fn is_pending(&self) -> bool {
        self.state() == TaskState::Pending && !self.token.is_cancelled()
    }

    /// Whether [`cancel`](Self::cancel) was called, or the parent token was
    /// cancelled. The callback may already have run.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until the task completes or is cancelled.
    pub async fn wait(&self) -> TaskState {
        let mut state = self.state.clone();
        match state.wait_for(|s| *s != TaskState::Pending).await {
            Ok(s) => *s,
            // The task was dropped with its runtime.
            Err(_) => TaskState::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_runs_after_delay() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = ScheduledTask::spawn(&Handle::current(), Duration::from_secs(2), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(task.state(), TaskState::Pending);
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        assert_eq!(task.wait().await, TaskState::Completed);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_callback() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = ScheduledTask::spawn(&Handle::current(), Duration::from_secs(2), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        task.cancel();
        assert_eq!(task.wait().await, TaskState::Cancelled);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_token_cancels() {
        let parent = CancellationToken::new();
        let task = ScheduledTask::spawn_with_token(
            &Handle::current(),
            parent.child_token(),
            Duration::from_secs(2),
            || {},
        );

        parent.cancel();
        assert_eq!(task.wait().await, TaskState::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_completion_is_ignored() {
        let task = ScheduledTask::spawn(&Handle::current(), Duration::from_millis(10), || {});
        assert_eq!(task.wait().await, TaskState::Completed);
        task.cancel();
        assert_eq!(task.state(), TaskState::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_stops_pending_immediately() {
        let task = ScheduledTask::spawn(&Handle::current(), Duration::from_secs(2), || {});
        assert!(task.is_pending());

        task.cancel();
        assert!(!task.is_pending());
        assert!(task.is_cancelled());
        assert_eq!(task.wait().await, TaskState::Cancelled);
    }
}
