//! Synchronization orchestrator
//!
//! Drives the round loop: plan the round, build a worker pool sized to it,
//! dispatch the pairwise copies, wait for the pool to drain, then either
//! advance to the next round or abort. Rounds are strictly ordered - round
//! k+1 never starts before round k's pool has joined, so a host is never
//! used as a source before its own copy completed.

use std::sync::Arc;

use crate::dispatch::{CopyPrimitive, DispatchUnit};
use crate::errors::SyncError;
use crate::path::SyncPaths;
use crate::planner;
use crate::pool::WorkerPool;
use crate::roster::HostRoster;

/// Outcome statistics of a completed synchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub hosts: usize,
    pub rounds: usize,
    pub copies: usize,
}

impl std::fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "synced {} host(s) in {} round(s), {} copies",
            self.hosts, self.rounds, self.copies
        )
    }
}

pub struct SyncOrchestrator<C: CopyPrimitive> {
    copier: Arc<C>,
    roster: HostRoster,
    paths: SyncPaths,
    max_workers: usize,
}

impl<C: CopyPrimitive> SyncOrchestrator<C> {
    #[must_use]
    pub fn new(copier: C, roster: HostRoster, paths: SyncPaths, max_workers: usize) -> Self {
        Self {
            copier: Arc::new(copier),
            roster,
            paths,
            max_workers: max_workers.max(1),
        }
    }

    fn dispatch_unit(&self, pair: planner::CopyPair) -> DispatchUnit {
        DispatchUnit {
            source_host: self.roster.host(pair.source_index).to_string(),
            dest_host: self.roster.host(pair.dest_index).to_string(),
            source_path: self.paths.source.clone(),
            dest_path: self.paths.dest.clone(),
        }
    }

    /// Run rounds until every host is synced or a copy fails.
    ///
    /// Within a round execution order across workers is unordered; any
    /// failure lets in-flight copies finish naturally but prevents further
    /// rounds. No retry, no rollback.
    pub async fn run(&self) -> anyhow::Result<SyncSummary> {
        let total = self.roster.len();
        let mut state = planner::SyncState::new();
        let mut summary = SyncSummary {
            hosts: total,
            ..Default::default()
        };
        tracing::info!("syncing...");
        while !state.complete(total) {
            tracing::info!(
                "iteration {}, copies required: {}",
                state.iteration + 1,
                state.step_size
            );
            let pairs = planner::plan_round(&mut state, total);
            if pairs.is_empty() {
                // unreachable for a well-formed roster; fail loudly rather
                // than loop forever
                return Err(SyncError::PlannerStalled {
                    synced: state.hosts_copied_to,
                    total,
                }
                .into());
            }
            let worker_count = std::cmp::min(self.max_workers, pairs.len());
            let pool = WorkerPool::new(worker_count, self.copier.clone());
            for pair in &pairs {
                pool.enqueue(self.dispatch_unit(*pair)).await?;
            }
            summary.copies += pairs.len();
            summary.rounds += 1;
            let result = pool.join().await?;
            if let Some((source_host, dest_host)) = result.failed {
                return Err(SyncError::CopyFailed {
                    source_host,
                    dest_host,
                }
                .into());
            }
            state.advance_round();
        }
        tracing::info!("done");
        Ok(summary)
    }
}
