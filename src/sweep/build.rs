//! Build sweep: one index construction per encoding variant.

use anyhow::Result;
use std::path::PathBuf;

use crate::catalog::CATALOG;
use crate::config::{SweepOptions, ToolPaths};
use crate::invoke::Invocation;
use crate::report::SweepReport;
use crate::sweep::{execute, ArtifactLayout, MeasuredRun};

/// Constructs a compressed index binary for every catalog entry from a
/// single preprocessed collection, capturing the builder's build-time
/// statistics per variant.
#[derive(Debug, Clone)]
pub struct BuildSweep {
    pub layout: ArtifactLayout,
    /// Base path of the collection handed to the builder verbatim.
    pub collection: PathBuf,
}

impl BuildSweep {
    /// One builder invocation per catalog entry, in catalog order:
    /// `<builder> <variant> <collection> --out <bin_dir>/<prefix>.<variant>.bin`
    pub fn plan(&self, tools: &ToolPaths) -> Vec<MeasuredRun> {
        CATALOG
            .iter()
            .map(|&variant| MeasuredRun {
                variant,
                invocation: Invocation::new(&tools.builder)
                    .arg(variant.name())
                    .arg(self.collection.display().to_string())
                    .arg("--out")
                    .arg(self.layout.index_path(variant).display().to_string()),
                output: self.layout.build_stats_path(variant),
                trials: 1,
            })
            .collect()
    }

    pub async fn run(&self, tools: &ToolPaths, opts: &SweepOptions) -> Result<SweepReport> {
        self.layout.ensure_dirs()?;
        execute("build", self.plan(tools), tools, opts).await
    }
}
