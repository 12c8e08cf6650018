//! Cancellable, pull-based async sequences
//!
//! An [`AsyncSeq`] is the time-extended counterpart of [`crate::sequence::Seq`]:
//! each pull may suspend while a [`Producer`] works. It is an explicit state
//! machine:
//!
//! ```text
//! Idle -> Producing -> Yielded -> Producing -> ... -> Exhausted | Cancelled | Failed
//! ```
//!
//! Cancellation is checked at every suspension point: before a production
//! step starts, while it is suspended, and once it returns. A cancellation
//! requested while an item is being produced therefore ends the sequence in
//! `Cancelled` without handing that item out. Items already returned stay
//! valid. Terminal states are sticky: later pulls report the same outcome.

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;
use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use futures_util::{FutureExt, StreamExt};
use tokio::time::Instant;

use crate::cancellation::{sleep_until_or_cancel, CancellationToken};
use crate::error::{BoxError, SeqError, SeqResult};

/// Observable lifecycle state of an [`AsyncSeq`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerState {
    Idle,
    Producing,
    Yielded,
    Exhausted,
    Cancelled,
    Failed,
}

impl ProducerState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProducerState::Exhausted | ProducerState::Cancelled | ProducerState::Failed
        )
    }
}

/// User-supplied production logic
///
/// `produce_next` returns `Ok(Some(item))` for the next item, `Ok(None)` once
/// exhausted and `Err` on failure. Long-running producers should check
/// `token` at their own suspension points (see
/// [`crate::cancellation::sleep_or_cancel`]).
///
/// # Drop safety
///
/// The future returned by `produce_next` may be dropped before it completes,
/// e.g. when the caller races [`AsyncSeq::produce`] against a timer. An
/// implementation must keep any work already taken from its source (a
/// dequeued item, a consumed state) and resume it on the next call, so that
/// an abandoned pull never loses or reorders items.
#[async_trait]
pub trait Producer: Send {
    type Item: Send;

    async fn produce_next(
        &mut self,
        token: &CancellationToken,
    ) -> Result<Option<Self::Item>, BoxError>;
}

type StepResult<T, S> = Result<Option<(T, S)>, BoxError>;
type StepFn<T, S> = Box<dyn FnMut(S, CancellationToken) -> BoxFuture<'static, StepResult<T, S>> + Send>;

/// Producer driven by a seed and an async step function
///
/// An in-flight step is kept until it resolves, so a dropped pull resumes the
/// same step instead of losing the state it consumed.
pub struct UnfoldProducer<T, S> {
    state: Option<S>,
    pending: Option<BoxFuture<'static, StepResult<T, S>>>,
    step: StepFn<T, S>,
}

#[async_trait]
impl<T, S> Producer for UnfoldProducer<T, S>
where
    T: Send + 'static,
    S: Send + 'static,
{
    type Item = T;

    async fn produce_next(&mut self, token: &CancellationToken) -> Result<Option<T>, BoxError> {
        if self.pending.is_none() {
            let Some(state) = self.state.take() else {
                return Ok(None);
            };
            self.pending = Some((self.step)(state, token.clone()));
        }
        let outcome = match self.pending.as_mut() {
            Some(step) => step.await,
            None => return Ok(None),
        };
        self.pending = None;

        match outcome? {
            Some((item, next)) => {
                self.state = Some(next);
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }
}

/// Producer that hands out items of an iterator, waiting `delay` before each
///
/// The item being waited on and its deadline survive a dropped pull; the next
/// pull waits out the remainder and returns that same item.
pub struct IntervalProducer<I: Iterator> {
    items: I,
    delay: Duration,
    pending: Option<(I::Item, Instant)>,
}

#[async_trait]
impl<I> Producer for IntervalProducer<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    type Item = I::Item;

    async fn produce_next(&mut self, token: &CancellationToken) -> Result<Option<I::Item>, BoxError> {
        let deadline = match &self.pending {
            Some((_, deadline)) => *deadline,
            None => {
                let Some(item) = self.items.next() else {
                    return Ok(None);
                };
                let deadline = Instant::now() + self.delay;
                self.pending = Some((item, deadline));
                deadline
            }
        };
        sleep_until_or_cancel(token, deadline).await?;
        Ok(self.pending.take().map(|(item, _)| item))
    }
}

enum Phase {
    Idle,
    Producing,
    Yielded,
    Exhausted,
    Cancelled,
    Failed(Arc<dyn Error + Send + Sync + 'static>),
}

/// Cancellable async sequence pulled one item at a time
pub struct AsyncSeq<T> {
    producer: Box<dyn Producer<Item = T>>,
    token: CancellationToken,
    phase: Phase,
    yielded: u64,
}

impl<T: Send + 'static> AsyncSeq<T> {
    /// Wrap `producer` with a fresh cancellation token
    pub fn new<P>(producer: P) -> Self
    where
        P: Producer<Item = T> + 'static,
    {
        Self::with_token(producer, CancellationToken::new())
    }

    /// Wrap `producer`, observing a token shared with the caller
    pub fn with_token<P>(producer: P, token: CancellationToken) -> Self
    where
        P: Producer<Item = T> + 'static,
    {
        Self {
            producer: Box::new(producer),
            token,
            phase: Phase::Idle,
            yielded: 0,
        }
    }

    /// Generate items from a seed and an async step function
    ///
    /// The step receives the current state and the sequence's token, and
    /// resolves to the next item and state, `None` when done, or an error.
    pub fn unfold<S, F, Fut>(init: S, mut step: F) -> Self
    where
        S: Send + 'static,
        F: FnMut(S, CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = StepResult<T, S>> + Send + 'static,
    {
        Self::new(UnfoldProducer {
            state: Some(init),
            pending: None,
            step: Box::new(move |state, token| step(state, token).boxed()),
        })
    }

    /// Emit `items` in order, suspending for `delay` before each one
    pub fn from_iter_with_delay<I>(items: I, delay: Duration) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::new(IntervalProducer {
            items: items.into_iter(),
            delay,
            pending: None,
        })
    }

    pub fn state(&self) -> ProducerState {
        match self.phase {
            Phase::Idle => ProducerState::Idle,
            Phase::Producing => ProducerState::Producing,
            Phase::Yielded => ProducerState::Yielded,
            Phase::Exhausted => ProducerState::Exhausted,
            Phase::Cancelled => ProducerState::Cancelled,
            Phase::Failed(_) => ProducerState::Failed,
        }
    }

    /// Number of items handed to the consumer so far
    pub fn yielded(&self) -> u64 {
        self.yielded
    }

    /// Handle that can cancel this sequence from elsewhere
    pub fn cancel_handle(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Request cancellation; observed at the next suspension point
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Pull the next item
    ///
    /// Returns `Ok(Some(item))`, `Ok(None)` once exhausted,
    /// `Err(Cancelled)` once cancellation has been observed, or
    /// `Err(ProducerFailure)` when the producer failed.
    pub async fn produce(&mut self) -> SeqResult<Option<T>> {
        match &self.phase {
            Phase::Exhausted => return Ok(None),
            Phase::Cancelled => return Err(SeqError::Cancelled),
            Phase::Failed(cause) => return Err(SeqError::ProducerFailure(Arc::clone(cause))),
            Phase::Idle | Phase::Producing | Phase::Yielded => {}
        }
        if self.token.is_cancelled() {
            return Err(self.finish_cancelled());
        }

        let resume = if self.yielded == 0 { Phase::Idle } else { Phase::Yielded };
        self.phase = Phase::Producing;
        let token = self.token.clone();
        let outcome = {
            // Dropping this pull mid-step puts the phase back to what it was.
            let _restore = RestorePhase {
                phase: &mut self.phase,
                resume: Some(resume),
            };
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                step = self.producer.produce_next(&token) => Some(step),
            }
        };

        match outcome {
            None => Err(self.finish_cancelled()),
            Some(_) if self.token.is_cancelled() => Err(self.finish_cancelled()),
            Some(Ok(Some(item))) => {
                self.phase = Phase::Yielded;
                self.yielded += 1;
                Ok(Some(item))
            }
            Some(Ok(None)) => {
                log::debug!("Async sequence exhausted after {} items", self.yielded);
                self.phase = Phase::Exhausted;
                Ok(None)
            }
            Some(Err(err)) => {
                let cause: Arc<dyn Error + Send + Sync + 'static> = Arc::from(err);
                log::warn!("Producer failed after {} items: {}", self.yielded, cause);
                self.phase = Phase::Failed(Arc::clone(&cause));
                Err(SeqError::ProducerFailure(cause))
            }
        }
    }

    /// Expose the remaining items as a `futures` stream; a terminal error is
    /// yielded once and ends the stream
    pub fn into_stream(mut self) -> BoxStream<'static, SeqResult<T>> {
        stream! {
            loop {
                match self.produce().await {
                    Ok(Some(item)) => yield Ok(item),
                    Ok(None) => break,
                    Err(err) => {
                        yield Err(err);
                        break;
                    }
                }
            }
        }
        .boxed()
    }

    fn finish_cancelled(&mut self) -> SeqError {
        log::debug!("Async sequence cancelled after {} items", self.yielded);
        self.phase = Phase::Cancelled;
        SeqError::Cancelled
    }
}

struct RestorePhase<'p> {
    phase: &'p mut Phase,
    resume: Option<Phase>,
}

impl Drop for RestorePhase<'_> {
    fn drop(&mut self) {
        if let Some(resume) = self.resume.take() {
            *self.phase = resume;
        }
    }
}

impl<T> fmt::Debug for AsyncSeq<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.phase {
            Phase::Idle => "Idle",
            Phase::Producing => "Producing",
            Phase::Yielded => "Yielded",
            Phase::Exhausted => "Exhausted",
            Phase::Cancelled => "Cancelled",
            Phase::Failed(_) => "Failed",
        };
        f.debug_struct("AsyncSeq")
            .field("phase", &phase)
            .field("yielded", &self.yielded)
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}
