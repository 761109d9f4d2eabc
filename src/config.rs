//! Tool locations and sweep options.
//!
//! Assembled from command-line flags; there is deliberately no config file.
//! Defaults point at the working-directory binaries the measurement host
//! normally carries.

use std::path::PathBuf;
use std::time::Duration;

/// Locations of the external executables the harness drives.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    /// Index-construction binary
    pub builder: PathBuf,
    /// Query-execution binary
    pub runner: PathBuf,
    /// Sequential-decode perftest binary
    pub perftest: PathBuf,
    /// Page-cache eviction utility, run before every timed execution
    pub drop_caches: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            builder: PathBuf::from("./create_freq_index"),
            runner: PathBuf::from("./queries"),
            perftest: PathBuf::from("./index_perftest"),
            drop_caches: PathBuf::from("./drop_caches"),
        }
    }
}

/// Knobs shared by every sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    /// Upper bound on a single invocation's wall-clock time. `None`
    /// reproduces the historical behavior: a hung binary stalls the sweep.
    pub timeout: Option<Duration>,
    /// Abort the remaining sweep after the first failed invocation instead
    /// of recording the failure and continuing.
    pub fail_fast: bool,
    /// Append each trial's output to the result file instead of truncating.
    /// Off by default: only the final trial's output survives.
    pub accumulate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tool_paths() {
        let tools = ToolPaths::default();
        assert_eq!(tools.builder, PathBuf::from("./create_freq_index"));
        assert_eq!(tools.runner, PathBuf::from("./queries"));
        assert_eq!(tools.perftest, PathBuf::from("./index_perftest"));
        assert_eq!(tools.drop_caches, PathBuf::from("./drop_caches"));
    }

    #[test]
    fn test_default_options_preserve_literal_behavior() {
        let opts = SweepOptions::default();
        assert!(opts.timeout.is_none());
        assert!(!opts.fail_fast);
        assert!(!opts.accumulate);
    }
}
