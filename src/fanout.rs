//! Combining independent async operations
//!
//! Operands are spawned as tokio tasks, so they run independently of the
//! combinator awaiting them. Returning early (on the first failure for
//! [`when_all`], on the first completion for [`when_any`]) only stops
//! *waiting*: the remaining operands keep running. Callers that want the
//! losers stopped must cancel them explicitly, e.g. through a shared
//! [`crate::cancellation::CancellationToken`].
//!
//! A timeout is not built in; race the operation against a timer:
//!
//! ```
//! use std::time::Duration;
//! use seqkit::error::{SeqError, SeqResult};
//! use seqkit::fanout::when_any;
//!
//! # async fn example() {
//! let slow = async {
//!     tokio::time::sleep(Duration::from_secs(5)).await;
//!     SeqResult::<i32>::Ok(1)
//! };
//! let timer = async {
//!     tokio::time::sleep(Duration::from_millis(10)).await;
//!     SeqResult::<i32>::Err(SeqError::Cancelled)
//! };
//! let first = when_any(vec![
//!     Box::pin(slow) as std::pin::Pin<Box<dyn std::future::Future<Output = SeqResult<i32>> + Send>>,
//!     Box::pin(timer),
//! ])
//! .await
//! .unwrap();
//! assert_eq!(first.index, 1);
//! # }
//! ```

use std::future::Future;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::runtime::Runtime;

use crate::error::{SeqError, SeqResult};

/// The operand that reached a terminal state first
#[derive(Debug)]
pub struct FirstCompleted<T> {
    /// Position of the winning operand in the input
    pub index: usize,
    /// Its outcome, success or failure
    pub outcome: SeqResult<T>,
}

/// Wait for every operand; results come back in operand order
///
/// Fails with the first failure observed (in completion order). Siblings are
/// not cancelled.
pub async fn when_all<T, F>(operands: Vec<F>) -> SeqResult<Vec<T>>
where
    F: Future<Output = SeqResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let total = operands.len();
    let mut pending: FuturesUnordered<_> = operands
        .into_iter()
        .enumerate()
        .map(|(index, operand)| {
            let handle = tokio::spawn(operand);
            async move { (index, handle.await) }
        })
        .collect();

    let mut results: Vec<Option<T>> = (0..total).map(|_| None).collect();
    while let Some((index, joined)) = pending.next().await {
        match flatten(joined) {
            Ok(value) => results[index] = Some(value),
            Err(err) => {
                log::warn!(
                    "when_all: operand {} failed, {} operand(s) left running: {}",
                    index,
                    pending.len(),
                    err
                );
                return Err(err);
            }
        }
    }
    Ok(results.into_iter().flatten().collect())
}

/// Wait for the first operand to finish, successfully or not
///
/// Returns `None` when `operands` is empty. Later completions, including
/// failures, are ignored and the losing operands are not cancelled.
pub async fn when_any<T, F>(operands: Vec<F>) -> Option<FirstCompleted<T>>
where
    F: Future<Output = SeqResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let mut pending: FuturesUnordered<_> = operands
        .into_iter()
        .enumerate()
        .map(|(index, operand)| {
            let handle = tokio::spawn(operand);
            async move { (index, handle.await) }
        })
        .collect();

    let (index, joined) = pending.next().await?;
    log::debug!("when_any: operand {} finished first", index);
    Some(FirstCompleted {
        index,
        outcome: flatten(joined),
    })
}

/// Blocking form of [`when_all`], driven on `runtime`
///
/// Must not be called from inside an async context: blocking a runtime
/// thread on itself deadlocks or panics. Unfinished siblings keep running on
/// `runtime`.
pub fn wait_all<T, F>(runtime: &Runtime, operands: Vec<F>) -> SeqResult<Vec<T>>
where
    F: Future<Output = SeqResult<T>> + Send + 'static,
    T: Send + 'static,
{
    runtime.block_on(when_all(operands))
}

/// Blocking form of [`when_any`], driven on `runtime`
///
/// Must not be called from inside an async context. Losing operands keep
/// running on `runtime`.
pub fn wait_any<T, F>(runtime: &Runtime, operands: Vec<F>) -> Option<FirstCompleted<T>>
where
    F: Future<Output = SeqResult<T>> + Send + 'static,
    T: Send + 'static,
{
    runtime.block_on(when_any(operands))
}

fn flatten<T>(joined: Result<SeqResult<T>, tokio::task::JoinError>) -> SeqResult<T> {
    joined.map_err(SeqError::from)?
}
