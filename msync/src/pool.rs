//! Bounded worker pool for one round of pairwise copies
//!
//! Workers pull [`DispatchUnit`]s from a shared MPMC queue until they receive
//! a sentinel (`None`). A pool lives for exactly one round: the orchestrator
//! enqueues the round's units, then joins, which enqueues one sentinel per
//! worker and waits for all of them to stop. The only state that survives the
//! round is the aggregate [`RoundResult`].

use std::sync::Arc;

use crate::dispatch::{CopyPrimitive, DispatchUnit};

/// Aggregate outcome over all units issued in one round.
#[derive(Debug, Default)]
pub struct RoundResult {
    /// `(source_host, dest_host)` of the first copy that failed, if any
    pub failed: Option<(String, String)>,
}

impl RoundResult {
    #[must_use]
    pub fn ok(&self) -> bool {
        self.failed.is_none()
    }
}

pub struct WorkerPool {
    queue: async_channel::Sender<Option<DispatchUnit>>,
    workers: tokio::task::JoinSet<Option<(String, String)>>,
    worker_count: usize,
}

impl WorkerPool {
    /// Spawn `worker_count` workers sharing one task queue.
    #[must_use]
    pub fn new<C: CopyPrimitive>(worker_count: usize, copier: Arc<C>) -> Self {
        assert!(worker_count > 0);
        let (queue, receiver) = async_channel::unbounded();
        let mut workers = tokio::task::JoinSet::new();
        for id in 0..worker_count {
            workers.spawn(worker_loop(id, receiver.clone(), copier.clone()));
        }
        Self {
            queue,
            workers,
            worker_count,
        }
    }

    pub async fn enqueue(&self, unit: DispatchUnit) -> anyhow::Result<()> {
        self.queue.send(Some(unit)).await?;
        Ok(())
    }

    /// Signal end of work and wait for every worker to stop.
    pub async fn join(mut self) -> anyhow::Result<RoundResult> {
        for _ in 0..self.worker_count {
            self.queue.send(None).await?;
        }
        let mut result = RoundResult::default();
        while let Some(res) = self.workers.join_next().await {
            if let Some(pair) = res? {
                result.failed.get_or_insert(pair);
            }
        }
        Ok(result)
    }
}

/// Consume units until the sentinel arrives; returns the worker's first
/// failed pair, if any.
async fn worker_loop<C: CopyPrimitive>(
    id: usize,
    queue: async_channel::Receiver<Option<DispatchUnit>>,
    copier: Arc<C>,
) -> Option<(String, String)> {
    let mut failed = None;
    while let Ok(task) = queue.recv().await {
        let Some(unit) = task else {
            // sentinel, time to exit
            tracing::debug!("worker {}: exiting...", id);
            break;
        };
        if failed.is_none() {
            // only process the unit if all is well; otherwise keep draining
            // so the queue empties and the pool can join
            if !unit.run(copier.as_ref()).await {
                tracing::error!(
                    "worker {}: aborting remaining tasks after failed copy {} -> {}",
                    id,
                    unit.source_host,
                    unit.dest_host
                );
                failed = Some((unit.source_host, unit.dest_host));
            }
        }
    }
    failed
}
