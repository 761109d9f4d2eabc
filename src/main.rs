//! Encoding Benchmark CLI
//!
//! Drives the external index builder, query runner and scan perftest across
//! the fixed encoding-variant catalog.
//!
//! ## Quick Start
//!
//! ```bash
//! # Build one index per encoding variant
//! ./encoding-bench build /data/gov2.sorted-text.bin ./bin ./results gov2
//!
//! # Time the q1 query log against every built index, 3 cold-cache trials
//! ./encoding-bench queries /data/gov2.sorted-text ./bin ./results gov2 q1
//!
//! # Time sequential posting-list decoding, 5 trials per variant
//! ./encoding-bench scan ./bin ./results gov2
//! ```
//!
//! Each timed execution is preceded by a page-cache drop; everything runs
//! strictly one child process at a time.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use encoding_bench::catalog::CATALOG;
use encoding_bench::config::{SweepOptions, ToolPaths};
use encoding_bench::report::SweepReport;
use encoding_bench::sweep::build::BuildSweep;
use encoding_bench::sweep::scan::{self, ScanSweep};
use encoding_bench::sweep::timing::{self, TimingSweep};
use encoding_bench::sweep::ArtifactLayout;

#[derive(Parser)]
#[command(name = "encoding-bench")]
#[command(about = "Cold-cache benchmark sweeps over inverted-index encoding variants")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one compressed index per encoding variant
    Build {
        /// Base path of the preprocessed collection
        collection: PathBuf,

        /// Directory receiving the index binaries
        bin_dir: PathBuf,

        /// Directory receiving per-variant build statistics
        results_dir: PathBuf,

        /// Dataset label embedded in every artifact and result name
        prefix: String,

        /// Index-construction executable
        #[arg(long, default_value = "./create_freq_index")]
        builder: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Time query execution against every pre-built index
    Queries {
        /// Base path of the preprocessed collection
        collection: PathBuf,

        /// Directory holding the index binaries built by `build`
        bin_dir: PathBuf,

        /// Directory receiving per-variant timing logs
        results_dir: PathBuf,

        /// Dataset label embedded in every artifact and result name
        prefix: String,

        /// Query-log suffix, resolved as <collection>.<suffix>
        query_log: String,

        /// Query-execution executable
        #[arg(long, default_value = "./queries")]
        runner: PathBuf,

        /// Query operator handed to the runner
        #[arg(long, default_value = "and")]
        query_op: String,

        /// Timed executions per variant
        #[arg(long, default_value_t = timing::DEFAULT_TRIALS)]
        trials: usize,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Time sequential posting-list decoding for every pre-built index
    Scan {
        /// Directory holding the index binaries built by `build`
        bin_dir: PathBuf,

        /// Directory receiving per-variant timing logs
        results_dir: PathBuf,

        /// Dataset label embedded in every artifact and result name
        prefix: String,

        /// Sequential-decode perftest executable
        #[arg(long, default_value = "./index_perftest")]
        perftest: PathBuf,

        /// Timed executions per variant
        #[arg(long, default_value_t = scan::DEFAULT_TRIALS)]
        trials: usize,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// List the encoding-variant catalog in sweep order
    List,
}

#[derive(Args)]
struct CommonArgs {
    /// Cache-eviction utility run before every timed execution
    #[arg(long, default_value = "./drop_caches")]
    drop_caches: PathBuf,

    /// Per-invocation timeout in seconds (unbounded if omitted)
    #[arg(long)]
    timeout: Option<u64>,

    /// Abort the remaining sweep on the first failed invocation
    #[arg(long)]
    fail_fast: bool,

    /// Append trial output to the result file instead of overwriting it
    #[arg(long)]
    accumulate: bool,

    /// Write a JSON report of every invocation's outcome
    #[arg(long)]
    report: Option<PathBuf>,
}

impl CommonArgs {
    fn sweep_options(&self) -> SweepOptions {
        SweepOptions {
            timeout: self.timeout.map(Duration::from_secs),
            fail_fast: self.fail_fast,
            accumulate: self.accumulate,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            collection,
            bin_dir,
            results_dir,
            prefix,
            builder,
            common,
        } => {
            banner("BUILD SWEEP");
            let sweep = BuildSweep {
                layout: ArtifactLayout::new(bin_dir, results_dir, prefix),
                collection,
            };
            let tools = ToolPaths {
                builder,
                drop_caches: common.drop_caches.clone(),
                ..ToolPaths::default()
            };
            let report = sweep.run(&tools, &common.sweep_options()).await?;
            finish(report, common.report.as_deref())
        }

        Commands::Queries {
            collection,
            bin_dir,
            results_dir,
            prefix,
            query_log,
            runner,
            query_op,
            trials,
            common,
        } => {
            banner("QUERY TIMING SWEEP");
            let sweep = TimingSweep {
                layout: ArtifactLayout::new(bin_dir, results_dir, prefix),
                collection,
                query_log,
                query_op,
                trials,
            };
            let tools = ToolPaths {
                runner,
                drop_caches: common.drop_caches.clone(),
                ..ToolPaths::default()
            };
            let report = sweep.run(&tools, &common.sweep_options()).await?;
            finish(report, common.report.as_deref())
        }

        Commands::Scan {
            bin_dir,
            results_dir,
            prefix,
            perftest,
            trials,
            common,
        } => {
            banner("SEQUENTIAL DECODE SWEEP");
            let sweep = ScanSweep {
                layout: ArtifactLayout::new(bin_dir, results_dir, prefix),
                trials,
            };
            let tools = ToolPaths {
                perftest,
                drop_caches: common.drop_caches.clone(),
                ..ToolPaths::default()
            };
            let report = sweep.run(&tools, &common.sweep_options()).await?;
            finish(report, common.report.as_deref())
        }

        Commands::List => {
            list_variants();
            Ok(())
        }
    }
}

fn banner(title: &str) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  {:<60}║", title);
    println!("╚══════════════════════════════════════════════════════════════╝");
}

fn list_variants() {
    println!("Encoding variants, in sweep order:\n");
    for variant in CATALOG {
        println!("  {:<20} {}", variant.name(), variant.description());
    }
}

/// Print the sweep summary, persist the report if asked to, and fold any
/// recorded failure into the process exit code.
fn finish(report: SweepReport, report_path: Option<&std::path::Path>) -> Result<()> {
    let failures = report.failures();
    println!(
        "\nCompleted {} invocations, {} failed",
        report.records.len(),
        failures
    );

    if let Some(path) = report_path {
        report.save(path)?;
        println!("Report written to {:?}", path);
    }

    if failures > 0 {
        anyhow::bail!("{} of {} invocations failed", failures, report.records.len());
    }
    Ok(())
}
