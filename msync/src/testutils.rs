//! Test doubles for the copy primitive

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::dispatch::{CopyOutput, CopyPrimitive, DispatchUnit};

/// Copy primitive that records invocations instead of transferring anything.
///
/// Clones share the invocation log, so tests can keep a handle and inspect
/// what the pool or the orchestrator executed.
#[derive(Clone)]
pub(crate) struct FakeCopier {
    executed: Arc<Mutex<Vec<(String, String)>>>,
    fail_dests: HashSet<String>,
    error: bool,
}

impl FakeCopier {
    pub(crate) fn succeeding() -> Self {
        Self {
            executed: Arc::new(Mutex::new(vec![])),
            fail_dests: HashSet::new(),
            error: false,
        }
    }

    /// Copies to the given destination hosts exit nonzero.
    pub(crate) fn failing_for<I>(dests: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self {
            fail_dests: dests.into_iter().map(str::to_string).collect(),
            ..Self::succeeding()
        }
    }

    /// Every invocation errors out before producing any output, as if the
    /// transfer executable could not be spawned.
    pub(crate) fn erroring() -> Self {
        Self {
            error: true,
            ..Self::succeeding()
        }
    }

    /// Destination hosts of executed copies, in execution order.
    pub(crate) fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|(_, dest)| dest.clone())
            .collect()
    }

    /// `(source, dest)` pairs of executed copies, in execution order.
    pub(crate) fn executed_pairs(&self) -> Vec<(String, String)> {
        self.executed.lock().unwrap().clone()
    }
}

impl CopyPrimitive for FakeCopier {
    async fn copy(&self, unit: &DispatchUnit) -> anyhow::Result<CopyOutput> {
        if self.error {
            anyhow::bail!("spawn failed");
        }
        self.executed
            .lock()
            .unwrap()
            .push((unit.source_host.clone(), unit.dest_host.clone()));
        if self.fail_dests.contains(&unit.dest_host) {
            Ok(CopyOutput {
                exit_code: Some(23),
                stdout: String::new(),
                stderr: format!("rsync: connection to {} refused", unit.dest_host),
            })
        } else {
            Ok(CopyOutput {
                exit_code: Some(0),
                stdout: "sent 42 bytes  received 42 bytes".to_string(),
                stderr: String::new(),
            })
        }
    }
}
