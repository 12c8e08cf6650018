//! Cooperative cancellation
//!
//! A [`CancellationToken`] is a shared, clonable flag. Setting it never
//! interrupts anything by itself: producers observe it at their own
//! suspension points, either by checking [`CancellationToken::is_cancelled`]
//! or by racing work against [`CancellationToken::cancelled`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::error::{SeqError, SeqResult};

struct TokenState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Checkable-and-settable cancellation handle shared by issuer and producer
#[derive(Clone)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            state: Arc::new(TokenState {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::AcqRel) {
            log::debug!("Cancellation requested");
        }
        self.state.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Completes once cancellation has been requested
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel is not missed.
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Fail with `Cancelled` if cancellation has been requested
    pub fn check(&self) -> SeqResult<()> {
        if self.is_cancelled() {
            Err(SeqError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Sleep for `duration` unless `token` is cancelled first
pub async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> SeqResult<()> {
    sleep_until_or_cancel(token, Instant::now() + duration).await
}

/// Sleep until `deadline` unless `token` is cancelled first
///
/// A deadline that has already passed completes immediately, which lets a
/// retried wait pick up where a dropped one left off.
pub async fn sleep_until_or_cancel(token: &CancellationToken, deadline: Instant) -> SeqResult<()> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(SeqError::Cancelled),
        _ = tokio::time::sleep_until(deadline) => Ok(()),
    }
}
