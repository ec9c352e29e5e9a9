//! Bounded concurrent task runner.
//!
//! Runs a batch of `(future, context)` pairs with at most `limit` futures
//! doing work at the same time, and hands back `(output, context)` pairs in
//! the order the futures finish.
//!
//! Every item is spawned as soon as it is drawn from the input; only the work
//! itself waits on the cohort's semaphore. Memory therefore grows with the
//! number of items while concurrency stays capped. For very large batches,
//! split the input into several cohorts.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{FutureExt, Stream};
use thiserror::Error;
use tokio::sync::{mpsc, Semaphore};

/// A unit of work paired with a value carried through to its result.
pub struct WorkItem<F, C> {
    pub task: F,
    pub context: C,
}

impl<F, C> WorkItem<F, C> {
    pub fn new(task: F, context: C) -> Self {
        Self { task, context }
    }
}

impl<F, C> From<(F, C)> for WorkItem<F, C> {
    fn from((task, context): (F, C)) -> Self {
        Self::new(task, context)
    }
}

/// Failure of a single item in a cohort.
#[derive(Debug, Error)]
pub enum RunnerError<E> {
    #[error(transparent)]
    Task(E),

    #[error("task panicked before producing a result")]
    Panicked,
}

type Completion<T, C, E> = (Result<T, RunnerError<E>>, C);

/// Spawns cohorts of work with a fixed concurrency cap.
///
/// Holds no state between calls: each [`BoundedRunner::run`] gets its own
/// semaphore, so two cohorts never share permits.
#[derive(Debug, Clone, Copy)]
pub struct BoundedRunner {
    limit: usize,
}

impl BoundedRunner {
    /// Create a runner. A limit of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Spawn every item and return the cohort of pending results.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn run<I, F, T, E, C>(&self, items: I) -> Cohort<T, C, E>
    where
        I: IntoIterator<Item = WorkItem<F, C>>,
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        C: Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let (tx, rx) = mpsc::unbounded_channel::<Completion<T, C, E>>();
        let mut spawned = 0usize;

        for item in items {
            let WorkItem { task, context } = item;
            let semaphore = semaphore.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => match AssertUnwindSafe(task).catch_unwind().await {
                        Ok(Ok(output)) => Ok(output),
                        Ok(Err(e)) => Err(RunnerError::Task(e)),
                        Err(_) => Err(RunnerError::Panicked),
                    },
                    // The semaphore is never closed while tasks hold a clone.
                    Err(_) => Err(RunnerError::Panicked),
                };
                // Receiver gone means the caller stopped consuming.
                let _ = tx.send((outcome, context));
            });
            spawned += 1;
        }

        Cohort {
            receiver: rx,
            remaining: spawned,
        }
    }
}

/// Results of one runner invocation, in completion order.
///
/// Dropping a cohort does not cancel its tasks; they run to completion and
/// their results are discarded.
pub struct Cohort<T, C, E> {
    receiver: mpsc::UnboundedReceiver<Completion<T, C, E>>,
    remaining: usize,
}

impl<T, C, E> Cohort<T, C, E> {
    /// Wait for the next finished item.
    ///
    /// Returns `None` once every item has been yielded.
    pub async fn next(&mut self) -> Option<Result<(T, C), RunnerError<E>>> {
        std::future::poll_fn(|cx| self.poll_completion(cx)).await
    }

    /// Number of items not yet yielded.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn poll_completion(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<(T, C), RunnerError<E>>>> {
        if self.remaining == 0 {
            return Poll::Ready(None);
        }
        match self.receiver.poll_recv(cx) {
            Poll::Ready(Some((outcome, context))) => {
                self.remaining -= 1;
                Poll::Ready(Some(outcome.map(|output| (output, context))))
            }
            Poll::Ready(None) => {
                // A task was torn down without reporting back.
                self.remaining = 0;
                Poll::Ready(Some(Err(RunnerError::Panicked)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T, C, E> Unpin for Cohort<T, C, E> {}

impl<T, C, E> Stream for Cohort<T, C, E> {
    type Item = Result<(T, C), RunnerError<E>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_completion(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
