//! Query timing sweep: repeated cold-cache query runs per variant.

use anyhow::Result;
use std::path::PathBuf;

use crate::catalog::CATALOG;
use crate::config::{SweepOptions, ToolPaths};
use crate::invoke::Invocation;
use crate::report::SweepReport;
use crate::sweep::{execute, ArtifactLayout, MeasuredRun};

/// Baseline repetitions per variant. The runner reports several internal
/// samples per invocation already; repeating whole invocations reduces
/// cross-invocation variance.
pub const DEFAULT_TRIALS: usize = 3;

/// Times query execution against every pre-built index artifact, one query
/// log at a time.
#[derive(Debug, Clone)]
pub struct TimingSweep {
    pub layout: ArtifactLayout,
    /// Base path of the collection; the query log resolves against it as
    /// `<collection>.<query_log>`.
    pub collection: PathBuf,
    /// Suffix naming the query set, embedded in the result filename.
    pub query_log: String,
    /// Query operator the runner should use (`and`, `ranked_and`).
    pub query_op: String,
    pub trials: usize,
}

impl TimingSweep {
    /// One runner command per catalog entry, in catalog order:
    /// `<runner> <variant> <op> <bin_dir>/<prefix>.<variant>.bin <collection>.<query_log>`
    pub fn plan(&self, tools: &ToolPaths) -> Vec<MeasuredRun> {
        let queries_file = format!("{}.{}", self.collection.display(), self.query_log);
        CATALOG
            .iter()
            .map(|&variant| MeasuredRun {
                variant,
                invocation: Invocation::new(&tools.runner)
                    .arg(variant.name())
                    .arg(self.query_op.as_str())
                    .arg(self.layout.index_path(variant).display().to_string())
                    .arg(queries_file.as_str()),
                output: self.layout.query_timings_path(variant, &self.query_log),
                trials: self.trials,
            })
            .collect()
    }

    pub async fn run(&self, tools: &ToolPaths, opts: &SweepOptions) -> Result<SweepReport> {
        self.layout.ensure_dirs()?;
        execute("queries", self.plan(tools), tools, opts).await
    }
}
