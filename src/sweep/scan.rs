//! Sequential-decode sweep: raw posting-list scan throughput per variant.
//!
//! Reads only the pre-built index artifacts, so it needs no collection
//! path or query log.

use anyhow::Result;

use crate::catalog::CATALOG;
use crate::config::{SweepOptions, ToolPaths};
use crate::invoke::Invocation;
use crate::report::SweepReport;
use crate::sweep::{execute, ArtifactLayout, MeasuredRun};

/// Baseline repetitions per variant. Scans are shorter and noisier than
/// query runs, hence more of them.
pub const DEFAULT_TRIALS: usize = 5;

#[derive(Debug, Clone)]
pub struct ScanSweep {
    pub layout: ArtifactLayout,
    pub trials: usize,
}

impl ScanSweep {
    /// One perftest command per catalog entry, in catalog order:
    /// `<perftest> <variant> <bin_dir>/<prefix>.<variant>.bin`
    pub fn plan(&self, tools: &ToolPaths) -> Vec<MeasuredRun> {
        CATALOG
            .iter()
            .map(|&variant| MeasuredRun {
                variant,
                invocation: Invocation::new(&tools.perftest)
                    .arg(variant.name())
                    .arg(self.layout.index_path(variant).display().to_string()),
                output: self.layout.scan_timings_path(variant),
                trials: self.trials,
            })
            .collect()
    }

    pub async fn run(&self, tools: &ToolPaths, opts: &SweepOptions) -> Result<SweepReport> {
        self.layout.ensure_dirs()?;
        execute("scan", self.plan(tools), tools, opts).await
    }
}
