//! Fixed-size worker pool for the conversion batch.
//!
//! Spawns N persistent tokio tasks that pull work items from a bounded
//! async-channel. Results are sent to an unbounded channel for consumption
//! by the caller.
//!
//! `async-channel`'s `Receiver` is `Clone`, so each worker holds its own
//! handle and no worker ever waits on a lock to receive.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A pool of worker tasks that convert items concurrently.
///
/// The worker count is the only concurrency knob. Items run to completion
/// with no timeout or cancellation, and every item produces one result.
///
/// # Example
///
/// ```ignore
/// let mut pool = WorkerPool::start(4, jobs, |job| async move {
///     convert(job).await
/// });
///
/// while let Some(outcome) = pool.recv().await {
///     report(outcome);
/// }
/// ```
pub struct WorkerPool<R: Send + 'static> {
    result_rx: mpsc::UnboundedReceiver<R>,
    _handles: Vec<JoinHandle<()>>,
}

impl<R: Send + 'static> WorkerPool<R> {
    /// Spawn `n` workers (at least one), submit all items, and return a pool
    /// for receiving results.
    ///
    /// Items are submitted via a bounded channel (capacity `n`) from a
    /// background task, so the caller can start receiving results right
    /// away. Every item yields exactly one result.
    pub fn start<W, F, Fut>(n: usize, items: Vec<W>, process_fn: F) -> Self
    where
        W: Send + 'static,
        F: Fn(W) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let n = n.max(1);
        let (work_tx, work_rx) = async_channel::bounded::<W>(n);
        let (result_tx, result_rx) = mpsc::unbounded_channel::<R>();
        let process_fn = Arc::new(process_fn);

        let handles: Vec<JoinHandle<()>> = (0..n)
            .map(|_| {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let process_fn = process_fn.clone();
                tokio::spawn(async move {
                    while let Ok(item) = work_rx.recv().await {
                        let r = process_fn(item).await;
                        if result_tx.send(r).is_err() {
                            break; // Receiver dropped
                        }
                    }
                })
            })
            .collect();

        // Close the result channel once every worker has finished
        drop(result_tx);

        tokio::spawn(async move {
            for item in items {
                if work_tx.send(item).await.is_err() {
                    break;
                }
            }
            // work_tx dropped here -> workers drain remaining items then stop
        });

        log::debug!("Worker pool started with {n} workers");

        Self {
            result_rx,
            _handles: handles,
        }
    }

    /// Receive the next result. Returns `None` when all items have been
    /// processed and all workers have shut down.
    pub async fn recv(&mut self) -> Option<R> {
        self.result_rx.recv().await
    }
}
