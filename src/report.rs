//! Per-invocation bookkeeping and the optional JSON sweep report.
//!
//! The harness never parses what the external tools print; their stdout
//! lands untouched in the result files. What it does keep is the outcome of
//! every invocation it launched, so a sweep can finish with an honest
//! overall exit code and the analysis side can see which cells are missing.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use sysinfo::System;

use crate::invoke::RunStatus;

/// Outcome of one timed execution.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub variant: String,
    /// Zero-based trial index within the variant.
    pub trial: usize,
    /// Rendered command line, including the stdout redirection target.
    pub command: String,
    pub status: RunStatus,
    pub duration_ms: u64,
}

/// Facts about the measurement host, recorded once per report.
#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    pub hostname: Option<String>,
    pub os: String,
    pub arch: String,
    pub cpus: usize,
    pub total_memory_mb: u64,
}

impl HostInfo {
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        Self {
            hostname: System::host_name(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpus: std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1),
            total_memory_mb: sys.total_memory() / (1024 * 1024),
        }
    }
}

/// Everything one sweep did, in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub driver: &'static str,
    pub host: HostInfo,
    pub records: Vec<RunRecord>,
}

impl SweepReport {
    pub fn new(driver: &'static str) -> Self {
        Self {
            driver,
            host: HostInfo::collect(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: RunRecord) {
        self.records.push(record);
    }

    pub fn failures(&self) -> usize {
        self.records.iter().filter(|r| !r.status.success()).count()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {:?}", path))?;
        Ok(())
    }
}
