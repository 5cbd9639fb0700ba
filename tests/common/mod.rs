//! Shared integration-test harness for spawning `signalphase` as a child
//! process.

#![allow(dead_code)]

use std::process::{Output, Stdio};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Default timeout for reading a single snapshot.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the binary to completion with `args`.
#[allow(clippy::missing_panics_doc)]
pub fn run_command(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_signalphase"))
        .args(args)
        .env_remove("SIGNALPHASE_GREEN")
        .env_remove("SIGNALPHASE_LEFT_TURN")
        .env_remove("SIGNALPHASE_CONFIG")
        .output()
        .expect("failed to run signalphase")
}

/// Parses every stdout line as JSON.
#[allow(clippy::missing_panics_doc)]
pub fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad JSON line {l}: {e}")))
        .collect()
}

/// A running `signalphase run` process emitting JSON snapshots.
///
/// The child process is killed on drop via `kill_on_drop(true)`.
pub struct SignalProcess {
    child: Child,
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
}

impl SignalProcess {
    /// Spawns `run --format json` with a fast tick and any extra `args`.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn(extra: &[&str]) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_signalphase"))
            .args(["run", "--format", "json", "--tick-interval", "20ms", "--quiet"])
            .args(extra)
            .env_remove("SIGNALPHASE_GREEN")
            .env_remove("SIGNALPHASE_LEFT_TURN")
            .env_remove("SIGNALPHASE_CONFIG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn signalphase");

        let stdin = child.stdin.take().expect("stdin not captured");
        let stdout = child.stdout.take().expect("stdout not captured");
        Self {
            child,
            stdin,
            reader: BufReader::new(stdout),
        }
    }

    /// Writes one operator command line.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send(&mut self, command: &str) {
        self.stdin
            .write_all(format!("{command}\n").as_bytes())
            .await
            .expect("failed to write command");
        self.stdin.flush().await.expect("failed to flush stdin");
    }

    /// Reads the next snapshot, or `None` at end of output.
    #[allow(clippy::missing_panics_doc)]
    pub async fn next_snapshot(&mut self) -> Option<Value> {
        let mut line = String::new();
        tokio::time::timeout(DEFAULT_TIMEOUT, async {
            loop {
                line.clear();
                let n = self
                    .reader
                    .read_line(&mut line)
                    .await
                    .expect("read_line I/O error");
                if n == 0 {
                    return None;
                }
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    return Some(
                        serde_json::from_str::<Value>(trimmed)
                            .unwrap_or_else(|e| panic!("invalid JSON snapshot: {e}\nline: {line}")),
                    );
                }
            }
        })
        .await
        .expect("timed out waiting for snapshot")
    }

    /// Reads snapshots until `pred` matches.
    #[allow(clippy::missing_panics_doc)]
    pub async fn wait_for(&mut self, pred: impl Fn(&Value) -> bool) -> Value {
        loop {
            let snapshot = self
                .next_snapshot()
                .await
                .expect("process exited before the expected snapshot");
            if pred(&snapshot) {
                return snapshot;
            }
        }
    }

    /// Sends `quit` and waits for a clean exit.
    #[allow(clippy::missing_panics_doc)]
    pub async fn quit(mut self) -> std::process::ExitStatus {
        self.send("quit").await;
        while self.next_snapshot().await.is_some() {}
        tokio::time::timeout(DEFAULT_TIMEOUT, self.child.wait())
            .await
            .expect("timed out waiting for exit")
            .expect("failed to wait for child")
    }
}
