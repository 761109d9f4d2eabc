//! Structured process invocation.
//!
//! Commands are records (executable, argument list, redirection target)
//! rather than concatenated shell strings, and every execution yields a
//! typed status instead of a discarded one.

use anyhow::{Context, Result};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use tokio::process::Command;

/// Where a child process's standard output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Truncate the target file, then capture stdout into it.
    Truncate(PathBuf),
    /// Capture stdout at the end of the target file, creating it if absent.
    Append(PathBuf),
    /// Leave stdout attached to the harness (cache drops).
    Inherit,
}

/// One planned child-process execution.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub stdout: OutputMode,
}

/// How an execution ended. `Exited { code: 0 }` is the only success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunStatus {
    Exited { code: i32 },
    Signaled { signal: i32 },
    TimedOut,
    SpawnFailed { error: String },
}

impl RunStatus {
    pub fn success(&self) -> bool {
        matches!(self, RunStatus::Exited { code: 0 })
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Exited { code } => write!(f, "exited with code {}", code),
            RunStatus::Signaled { signal } => write!(f, "killed by signal {}", signal),
            RunStatus::TimedOut => write!(f, "timed out"),
            RunStatus::SpawnFailed { error } => write!(f, "failed to start: {}", error),
        }
    }
}

impl From<std::process::ExitStatus> for RunStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return RunStatus::Exited { code };
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return RunStatus::Signaled { signal };
            }
        }
        RunStatus::Exited { code: -1 }
    }
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdout: OutputMode::Inherit,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn stdout_to(mut self, mode: OutputMode) -> Self {
        self.stdout = mode;
        self
    }

    /// Shell-style rendering for logs and reports. Never fed back to a
    /// shell; execution always goes through the argument list.
    pub fn render(&self) -> String {
        let mut out = self.program.display().to_string();
        for arg in &self.args {
            out.push(' ');
            out.push_str(arg);
        }
        match &self.stdout {
            OutputMode::Truncate(path) => {
                out.push_str(" > ");
                out.push_str(&path.display().to_string());
            }
            OutputMode::Append(path) => {
                out.push_str(" >> ");
                out.push_str(&path.display().to_string());
            }
            OutputMode::Inherit => {}
        }
        out
    }

    /// Spawn the child, redirect stdout per [`OutputMode`], and wait for it
    /// to finish. The child's failure modes come back as a [`RunStatus`];
    /// `Err` is reserved for harness-environment problems (an output file
    /// that cannot be opened).
    pub async fn run(&self, timeout: Option<Duration>) -> Result<RunStatus> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        match &self.stdout {
            OutputMode::Truncate(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create output file {:?}", path))?;
                cmd.stdout(Stdio::from(file));
            }
            OutputMode::Append(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("failed to open output file {:?}", path))?;
                cmd.stdout(Stdio::from(file));
            }
            OutputMode::Inherit => {}
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return Ok(RunStatus::SpawnFailed {
                    error: err.to_string(),
                })
            }
        };

        let status = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(waited) => waited.context("failed waiting on child process")?,
                Err(_elapsed) => {
                    // Reap the child so it does not linger as a zombie.
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    return Ok(RunStatus::TimedOut);
                }
            },
            None => child.wait().await.context("failed waiting on child process")?,
        };

        Ok(RunStatus::from(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_redirection() {
        let inv = Invocation::new("./create_freq_index")
            .arg("opt_vb")
            .arg("/data/gov2.bin")
            .stdout_to(OutputMode::Truncate(PathBuf::from("./results/gov2.opt_vb.stats")));
        assert_eq!(
            inv.render(),
            "./create_freq_index opt_vb /data/gov2.bin > ./results/gov2.opt_vb.stats"
        );

        let appending = inv.stdout_to(OutputMode::Append(PathBuf::from("out.log")));
        assert!(appending.render().ends_with(" >> out.log"));
    }

    #[test]
    fn test_status_success() {
        assert!(RunStatus::Exited { code: 0 }.success());
        assert!(!RunStatus::Exited { code: 1 }.success());
        assert!(!RunStatus::TimedOut.success());
        assert!(!RunStatus::Signaled { signal: 9 }.success());
    }

    #[tokio::test]
    async fn test_run_captures_exit_codes() {
        let ok = Invocation::new("/bin/true").run(None).await.unwrap();
        assert_eq!(ok, RunStatus::Exited { code: 0 });

        let failed = Invocation::new("/bin/false").run(None).await.unwrap();
        assert_eq!(failed, RunStatus::Exited { code: 1 });
    }

    #[tokio::test]
    async fn test_run_reports_spawn_failure() {
        let status = Invocation::new("/nonexistent/tool").run(None).await.unwrap();
        assert!(matches!(status, RunStatus::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn test_run_times_out() {
        let status = Invocation::new("/bin/sleep")
            .arg("30")
            .run(Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert_eq!(status, RunStatus::TimedOut);
    }

    #[tokio::test]
    async fn test_truncate_and_append_modes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("trial.out");

        let echo = |text: &str| Invocation::new("/bin/echo").arg(text);

        echo("first")
            .stdout_to(OutputMode::Truncate(out.clone()))
            .run(None)
            .await
            .unwrap();
        echo("second")
            .stdout_to(OutputMode::Truncate(out.clone()))
            .run(None)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "second\n");

        echo("third")
            .stdout_to(OutputMode::Append(out.clone()))
            .run(None)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "second\nthird\n");
    }
}
