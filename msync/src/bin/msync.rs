use anyhow::Context;
use clap::Parser;
use tracing::instrument;

use msync_tools_msync::dispatch::RsyncCopier;
use msync_tools_msync::path;
use msync_tools_msync::roster::{self, HostRoster};
use msync_tools_msync::sync::{SyncOrchestrator, SyncSummary};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "msync",
    version,
    about = "Synchronize a path to many hosts efficiently using rsync with a recursive doubling schedule",
    long_about = "`msync` copies a file or directory tree from this host to N destination hosts.

Instead of fanning out every transfer from the source, hosts that already \
received the data act as additional sources in later rounds, so the fleet is \
covered in log2(N) rounds of pairwise rsync transfers.

Assumes passwordless ssh between all hosts and rsync installed on each of them.

EXAMPLES:
    # Sync a directory (placed into the same parent path on each host)
    msync -d host1,host2,host3 -p /srv/data

    # Sync directory contents with progress detail
    msync -d host1,host2,host3 -p /srv/data/ -v

    # Sync whatever the remote shell expands the glob to
    msync -d host1,host2,host3 -p '/srv/data/*'"
)]
struct Args {
    // Sync options
    /// Comma separated list of destination hosts
    ///
    /// Entries equal to the local hostname are skipped, so the full fleet
    /// list (this host included) can be passed as-is.
    #[arg(
        short = 'd',
        long,
        value_name = "HOSTS",
        help_heading = "Sync options"
    )]
    destinations: String,

    /// Source path to copy via rsync
    ///
    /// A trailing '/' or '/*' syncs the directory contents into the same
    /// path on each destination; otherwise the item itself is placed into
    /// its parent directory.
    #[arg(short = 'p', long, value_name = "PATH", help_heading = "Sync options")]
    path: String,

    /// Path to the ssh executable
    #[arg(
        long,
        default_value = "/usr/bin/ssh",
        value_name = "PATH",
        help_heading = "Sync options"
    )]
    ssh_exe: std::path::PathBuf,

    /// Path to the rsync executable (on this host and on every destination)
    #[arg(
        long,
        default_value = "/usr/bin/rsync",
        value_name = "PATH",
        help_heading = "Sync options"
    )]
    rsync_exe: std::path::PathBuf,

    // Progress & output
    /// Verbose level (implies "summary"): -v INFO / -vv DEBUG / -vvv TRACE (default: ERROR)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Progress & output")]
    verbose: u8,

    /// Quiet mode, don't report errors
    #[arg(short = 'q', long = "quiet", help_heading = "Progress & output")]
    quiet: bool,

    /// Print summary at the end
    #[arg(long, help_heading = "Progress & output")]
    summary: bool,

    // Advanced settings
    /// Concurrent copies are bounded by N x available CPU parallelism
    #[arg(
        long,
        default_value = "2",
        value_name = "N",
        help_heading = "Advanced settings"
    )]
    worker_multiplier: usize,

    /// Number of worker threads, 0 means number of cores
    #[arg(
        long,
        default_value = "0",
        value_name = "N",
        help_heading = "Advanced settings"
    )]
    max_workers: usize,

    /// Number of blocking worker threads, 0 means Tokio runtime default (512)
    #[arg(
        long,
        default_value = "0",
        value_name = "N",
        help_heading = "Advanced settings"
    )]
    max_blocking_threads: usize,
}

fn copy_workers_limit(worker_multiplier: usize) -> usize {
    let parallelism = std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1);
    (worker_multiplier * parallelism).max(1)
}

#[instrument]
async fn async_main(args: Args) -> anyhow::Result<SyncSummary> {
    let copier = RsyncCopier::new(&args.ssh_exe, &args.rsync_exe)?;
    let paths = path::resolve_sync_paths(&args.path).await?;
    tracing::debug!("source path: {}", &paths.source);
    tracing::debug!("destination path: {}", &paths.dest);
    let hostname = roster::local_hostname().context("failed to get local hostname")?;
    tracing::debug!("our hostname: {}", &hostname);
    let roster = HostRoster::from_destinations(&hostname, &args.destinations)?;
    let max_workers = copy_workers_limit(args.worker_multiplier);
    tracing::info!("using up to {} concurrent copies", max_workers);
    let orchestrator = SyncOrchestrator::new(copier, roster, paths, max_workers);
    orchestrator.run().await
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let func = {
        let args = args.clone();
        || async_main(args)
    };
    let output = common::OutputConfig {
        quiet: args.quiet,
        verbose: args.verbose,
        print_summary: args.summary,
    };
    let runtime = common::RuntimeConfig {
        max_workers: args.max_workers,
        max_blocking_threads: args.max_blocking_threads,
    };
    let res = common::run(output, runtime, func);
    if res.is_none() {
        std::process::exit(1);
    }
    Ok(())
}
