//! Pairwise copy dispatch
//!
//! A [`DispatchUnit`] wraps one host-to-host transfer as an atomic action
//! with a boolean outcome. The transfer itself is delegated to a
//! [`CopyPrimitive`]; the production implementation shells out to
//! `ssh <src-host> rsync -av <src-path> <dst-host>:<dst-path>`.

use anyhow::Context;

use crate::errors::SyncError;

/// One pairwise transfer, immutable once created. Built by the orchestrator
/// for a single round, consumed exactly once by one worker.
#[derive(Debug, Clone)]
pub struct DispatchUnit {
    pub source_host: String,
    pub dest_host: String,
    pub source_path: String,
    pub dest_path: String,
}

/// Captured result of one copy invocation. The orchestration layer only
/// inspects the exit status; stdout/stderr are surfaced for logging.
#[derive(Debug, Clone)]
pub struct CopyOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CopyOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// External point-to-point copy collaborator.
pub trait CopyPrimitive: Send + Sync + 'static {
    fn copy(
        &self,
        unit: &DispatchUnit,
    ) -> impl std::future::Future<Output = anyhow::Result<CopyOutput>> + Send;
}

impl DispatchUnit {
    /// Execute the transfer and reduce the result to a boolean outcome.
    ///
    /// Failures - nonzero exit status or a failed invocation - are logged
    /// with enough context to identify the pair; they never propagate as
    /// errors so a worker can keep draining its queue.
    pub async fn run<C: CopyPrimitive>(&self, copier: &C) -> bool {
        tracing::debug!("{} copies to {}", self.source_host, self.dest_host);
        match copier.copy(self).await {
            Ok(output) => {
                tracing::debug!("exit code: {:?}", output.exit_code);
                tracing::debug!("stdout:\n{}", output.stdout);
                tracing::debug!("stderr:\n{}", output.stderr);
                if !output.success() {
                    tracing::error!(
                        "copy {} -> {} failed with exit code {:?}: {}",
                        self.source_host,
                        self.dest_host,
                        output.exit_code,
                        output.stderr.trim(),
                    );
                }
                output.success()
            }
            Err(error) => {
                tracing::error!(
                    "copy {} -> {} could not be run: {:#}",
                    self.source_host,
                    self.dest_host,
                    error
                );
                false
            }
        }
    }
}

/// Production copy primitive: one rsync transfer driven over ssh.
#[derive(Debug, Clone)]
pub struct RsyncCopier {
    ssh_exe: std::path::PathBuf,
    rsync_exe: std::path::PathBuf,
}

impl RsyncCopier {
    /// Validate that both executables exist. Their absence is a startup
    /// error; it must never surface mid-run.
    pub fn new(ssh_exe: &std::path::Path, rsync_exe: &std::path::Path) -> Result<Self, SyncError> {
        for exe in [ssh_exe, rsync_exe] {
            if !exe.exists() {
                return Err(SyncError::MissingExecutable {
                    path: exe.display().to_string(),
                });
            }
        }
        Ok(Self {
            ssh_exe: ssh_exe.to_path_buf(),
            rsync_exe: rsync_exe.to_path_buf(),
        })
    }
}

impl CopyPrimitive for RsyncCopier {
    async fn copy(&self, unit: &DispatchUnit) -> anyhow::Result<CopyOutput> {
        // rsync runs on the source host so every synced host can act as a
        // source; requires passwordless ssh between all hosts
        let output = tokio::process::Command::new(&self.ssh_exe)
            .arg(&unit.source_host)
            .arg(&self.rsync_exe)
            .arg("-av")
            .arg(&unit.source_path)
            .arg(format!("{}:{}", unit.dest_host, unit.dest_path))
            .output()
            .await
            .with_context(|| format!("failed to spawn {}", self.ssh_exe.display()))?;
        Ok(CopyOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
