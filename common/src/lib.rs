//! Shared runtime harness for the msync tools
//!
//! Binaries hand their parsed settings and an async entry point to [`run`],
//! which owns the ambient process state: the tracing subscriber and the tokio
//! runtime. Components never touch global logging state themselves - the
//! verbosity knob travels through [`OutputConfig`].

use tracing_subscriber::EnvFilter;

mod config;

pub use config::{OutputConfig, RuntimeConfig};

fn init_tracing(output: &OutputConfig) {
    // RUST_LOG takes precedence over the -v/-q flags when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(output.filter_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_runtime(runtime: &RuntimeConfig) -> anyhow::Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if runtime.max_workers > 0 {
        builder.worker_threads(runtime.max_workers);
    }
    if runtime.max_blocking_threads > 0 {
        builder.max_blocking_threads(runtime.max_blocking_threads);
    }
    Ok(builder.build()?)
}

/// Run an async entry point under the shared runtime harness.
///
/// Returns `Some(summary)` on success and `None` on any error, after logging
/// it; callers are expected to translate `None` into a nonzero exit code.
pub fn run<Fut, Summary, F>(
    output: OutputConfig,
    runtime: RuntimeConfig,
    func: F,
) -> Option<Summary>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<Summary>>,
    Summary: std::fmt::Display,
{
    init_tracing(&output);
    let rt = match build_runtime(&runtime) {
        Ok(rt) => rt,
        Err(error) => {
            tracing::error!("failed to build tokio runtime: {:#}", error);
            return None;
        }
    };
    match rt.block_on(func()) {
        Ok(summary) => {
            if output.print_summary {
                println!("{}", &summary);
            }
            Some(summary)
        }
        Err(error) => {
            if !output.quiet {
                tracing::error!("{:#}", error);
            }
            None
        }
    }
}
