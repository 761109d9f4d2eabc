//! Sweep drivers and the artifact/result naming they share.
//!
//! A sweep walks the encoding catalog in order and, for every variant, runs
//! one external command a fixed number of times, dropping the page cache
//! immediately before each timed execution. Everything is strictly
//! sequential: one child process at a time, fully awaited, so trials never
//! contend with each other for cache or CPU.

pub mod build;
pub mod scan;
pub mod timing;

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;

use crate::catalog::Encoding;
use crate::config::{SweepOptions, ToolPaths};
use crate::invoke::{Invocation, OutputMode};
use crate::report::{RunRecord, SweepReport};

/// Join rules for everything the sweeps read and write.
///
/// All drivers derive paths from this one struct. The `<prefix>.<variant>`
/// convention has to match between the build side and the timing side, or
/// timing runs reference indexes that were never built.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    pub bin_dir: PathBuf,
    pub results_dir: PathBuf,
    pub prefix: String,
}

impl ArtifactLayout {
    pub fn new(bin_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            results_dir: results_dir.into(),
            prefix: prefix.into(),
        }
    }

    /// `<bin_dir>/<prefix>.<variant>.bin`, written by the build sweep and
    /// read by every timing sweep.
    pub fn index_path(&self, variant: Encoding) -> PathBuf {
        self.bin_dir.join(format!("{}.{}.bin", self.prefix, variant.name()))
    }

    /// `<results_dir>/<prefix>.<variant>.stats`
    pub fn build_stats_path(&self, variant: Encoding) -> PathBuf {
        self.results_dir.join(format!("{}.{}.stats", self.prefix, variant.name()))
    }

    /// `<results_dir>/<prefix>.<variant>.querytime.<query_log>`
    pub fn query_timings_path(&self, variant: Encoding, query_log: &str) -> PathBuf {
        self.results_dir.join(format!(
            "{}.{}.querytime.{}",
            self.prefix,
            variant.name(),
            query_log
        ))
    }

    /// `<results_dir>/<prefix>.<variant>.sequential_decoding`
    pub fn scan_timings_path(&self, variant: Encoding) -> PathBuf {
        self.results_dir.join(format!("{}.{}.sequential_decoding", self.prefix, variant.name()))
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.bin_dir)
            .with_context(|| format!("failed to create binaries directory {:?}", self.bin_dir))?;
        std::fs::create_dir_all(&self.results_dir)
            .with_context(|| format!("failed to create results directory {:?}", self.results_dir))?;
        Ok(())
    }
}

/// One planned timed command for a single catalog entry.
#[derive(Debug, Clone)]
pub struct MeasuredRun {
    pub variant: Encoding,
    /// The command, without its stdout redirection; the executor picks the
    /// output mode per trial.
    pub invocation: Invocation,
    /// Result file receiving the command's stdout.
    pub output: PathBuf,
    pub trials: usize,
}

/// Run every planned command, trial by trial, in catalog order.
///
/// Each trial is preceded by a cache drop. The first trial always truncates
/// the result file so re-running a sweep never needs manual cleanup; later
/// trials truncate too unless `accumulate` is set, in which case they
/// append. External-tool failures are recorded and the sweep keeps going
/// (or stops, under `fail_fast`); `Err` is reserved for the harness's own
/// environment problems.
pub async fn execute(
    driver: &'static str,
    runs: Vec<MeasuredRun>,
    tools: &ToolPaths,
    opts: &SweepOptions,
) -> Result<SweepReport> {
    let mut report = SweepReport::new(driver);

    'sweep: for run in runs {
        eprintln!("▶ {} ({})", run.variant, run.variant.description());

        for trial in 0..run.trials {
            drop_caches(tools).await;

            let mode = if trial > 0 && opts.accumulate {
                OutputMode::Append(run.output.clone())
            } else {
                OutputMode::Truncate(run.output.clone())
            };
            let invocation = run.invocation.clone().stdout_to(mode);
            let command = invocation.render();

            let started = Instant::now();
            let status = invocation.run(opts.timeout).await?;
            let duration_ms = started.elapsed().as_millis() as u64;

            if status.success() {
                tracing::info!(variant = %run.variant, trial, duration_ms, "invocation finished");
            } else {
                tracing::warn!(variant = %run.variant, trial, %status, "invocation failed");
            }

            let failed = !status.success();
            report.push(RunRecord {
                variant: run.variant.name().to_string(),
                trial,
                command,
                status,
                duration_ms,
            });

            if failed && opts.fail_fast {
                tracing::warn!("aborting remaining sweep (--fail-fast)");
                break 'sweep;
            }
        }
    }

    Ok(report)
}

/// Evict the OS page cache before a timed execution. Fire-and-forget by
/// contract, but no longer silent: a failing drop is logged and the sweep
/// proceeds with a warm cache rather than aborting.
async fn drop_caches(tools: &ToolPaths) {
    let drop = Invocation::new(&tools.drop_caches);
    match drop.run(None).await {
        Ok(status) if status.success() => {}
        Ok(status) => tracing::warn!(%status, "cache drop failed; measurements may be warm"),
        Err(err) => tracing::warn!(%err, "cache drop could not be executed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATALOG;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    #[test]
    fn test_layout_literal_paths() {
        let layout = ArtifactLayout::new("./bin", "./results", "gov2");
        let variant = Encoding::BlockVarintGb;

        assert_eq!(
            layout.index_path(variant),
            PathBuf::from("./bin/gov2.block_varintgb.bin")
        );
        assert_eq!(
            layout.build_stats_path(variant),
            PathBuf::from("./results/gov2.block_varintgb.stats")
        );
        assert_eq!(
            layout.query_timings_path(variant, "q1"),
            PathBuf::from("./results/gov2.block_varintgb.querytime.q1")
        );
        assert_eq!(
            layout.scan_timings_path(variant),
            PathBuf::from("./results/gov2.block_varintgb.sequential_decoding")
        );
    }

    fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn tools_with(dir: &Path, drop_body: &str) -> ToolPaths {
        ToolPaths {
            drop_caches: fake_tool(dir, "drop_caches", drop_body),
            ..ToolPaths::default()
        }
    }

    fn measured(variant: Encoding, tool: &Path, output: PathBuf, trials: usize) -> MeasuredRun {
        MeasuredRun {
            variant,
            invocation: Invocation::new(tool).arg(variant.name()),
            output,
            trials,
        }
    }

    #[tokio::test]
    async fn test_cache_drop_precedes_every_trial() {
        let dir = tempfile::tempdir().unwrap();
        let events = dir.path().join("events");
        let touch = |tag: &str| format!("echo {} >> {}", tag, events.display());

        let tools = tools_with(dir.path(), &touch("drop"));
        let tool = fake_tool(dir.path(), "runner", &format!("{}\necho timing", touch("run")));

        let runs = vec![measured(Encoding::OptVb, &tool, dir.path().join("out"), 3)];
        let report = execute("queries", runs, &tools, &SweepOptions::default())
            .await
            .unwrap();

        assert_eq!(report.records.len(), 3);
        let log = std::fs::read_to_string(&events).unwrap();
        let seen: Vec<&str> = log.lines().collect();
        assert_eq!(seen, vec!["drop", "run", "drop", "run", "drop", "run"]);
    }

    #[tokio::test]
    async fn test_failing_variant_does_not_stop_the_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tools_with(dir.path(), "exit 0");
        let tool = fake_tool(
            dir.path(),
            "builder",
            "if [ \"$1\" = \"uniform_vb\" ]; then exit 3; fi\necho ok",
        );

        let runs: Vec<MeasuredRun> = CATALOG
            .iter()
            .map(|&v| measured(v, &tool, dir.path().join(format!("out.{}", v)), 1))
            .collect();
        let report = execute("build", runs, &tools, &SweepOptions::default())
            .await
            .unwrap();

        assert_eq!(report.records.len(), CATALOG.len());
        assert_eq!(report.failures(), 1);
        assert_eq!(report.records[1].status, crate::invoke::RunStatus::Exited { code: 3 });
        for v in CATALOG {
            assert!(dir.path().join(format!("out.{}", v)).exists());
        }
    }

    #[tokio::test]
    async fn test_fail_fast_aborts_remaining_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tools_with(dir.path(), "exit 0");
        let tool = fake_tool(
            dir.path(),
            "builder",
            "if [ \"$1\" = \"uniform_vb\" ]; then exit 3; fi\necho ok",
        );

        let runs: Vec<MeasuredRun> = CATALOG
            .iter()
            .map(|&v| measured(v, &tool, dir.path().join(format!("out.{}", v)), 1))
            .collect();
        let opts = SweepOptions {
            fail_fast: true,
            ..SweepOptions::default()
        };
        let report = execute("build", runs, &tools, &opts).await.unwrap();

        // uniform_vb is the second catalog entry; nothing after it ran.
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.failures(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_only_last_trial() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tools_with(dir.path(), "exit 0");
        let tool = fake_tool(dir.path(), "runner", "echo trial-output");
        let out = dir.path().join("querytime");

        let runs = vec![measured(Encoding::OptVbDp, &tool, out.clone(), 3)];
        execute("queries", runs, &tools, &SweepOptions::default())
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "trial-output\n");
    }

    #[tokio::test]
    async fn test_accumulate_retains_all_trials() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tools_with(dir.path(), "exit 0");
        let tool = fake_tool(dir.path(), "runner", "echo trial-output");
        let out = dir.path().join("querytime");

        // Stale content from an earlier sweep must not survive trial 0.
        std::fs::write(&out, "stale\n").unwrap();

        let opts = SweepOptions {
            accumulate: true,
            ..SweepOptions::default()
        };
        let runs = vec![measured(Encoding::OptVbDp, &tool, out.clone(), 3)];
        execute("queries", runs, &tools, &opts).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "trial-output\ntrial-output\ntrial-output\n"
        );
    }

    #[tokio::test]
    async fn test_cache_drop_failure_does_not_fail_the_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let tools = tools_with(dir.path(), "exit 1");
        let tool = fake_tool(dir.path(), "runner", "echo ok");

        let runs = vec![measured(Encoding::OptVb, &tool, dir.path().join("out"), 1)];
        let report = execute("queries", runs, &tools, &SweepOptions::default())
            .await
            .unwrap();

        assert_eq!(report.failures(), 0);
    }
}
