//! External process execution
//!
//! Every tool invocation runs under a deadline and can be cancelled through a
//! shared flag. Output pipes are drained on reader threads so a chatty child
//! cannot block on a full pipe while we wait for it. Readers are never joined
//! without a deadline: a background grandchild may hold the pipes open long
//! after the direct child is gone.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

use crate::domain::ports::ToolError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const DIAGNOSTIC_LINES: usize = 40;

/// Raised once (Ctrl-C) to stop every running and future invocation
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        let stdout = self.stdout_text();
        match (stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (_, true) => stdout,
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", stdout, self.stderr),
        }
    }

    /// Cleaned tail of the output, preferring stderr
    pub fn diagnostics(&self) -> String {
        if self.stderr.trim().is_empty() {
            clean_diagnostics(&self.stdout_text())
        } else {
            clean_diagnostics(&self.stderr)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
    cancel: CancelFlag,
}

impl ProcessRunner {
    pub fn new(timeout: Duration, cancel: CancelFlag) -> Self {
        Self { timeout, cancel }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run to completion; a non-zero exit is returned, not raised
    pub fn run(&self, tool: &str, command: &mut Command) -> Result<CommandOutput, ToolError> {
        if self.cancel.is_cancelled() {
            return Err(ToolError::Cancelled {
                tool: tool.to_string(),
            });
        }
        tracing::debug!(tool, command = ?command, "running external command");

        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ToolError::Launch {
                tool: tool.to_string(),
                message: e.to_string(),
            })?;

        let started = Instant::now();
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        // on timeout or cancel the readers are dropped and left detached
        let status = self.wait(tool, &mut child)?;

        let budget = self.timeout.saturating_sub(started.elapsed());
        let stdout = collect(tool, stdout, budget);
        let stderr = String::from_utf8_lossy(&collect(tool, stderr, budget)).into_owned();
        tracing::debug!(tool, %status, "external command finished");
        Ok(CommandOutput {
            status,
            stdout,
            stderr,
        })
    }

    /// Run and turn a non-zero exit into `ToolError::Failed`
    pub fn run_checked(
        &self,
        tool: &str,
        command: &mut Command,
    ) -> Result<CommandOutput, ToolError> {
        let output = self.run(tool, command)?;
        if output.success() {
            Ok(output)
        } else {
            Err(ToolError::failed(tool, output.status, output.diagnostics()))
        }
    }

    fn wait(&self, tool: &str, child: &mut Child) -> Result<ExitStatus, ToolError> {
        let started = Instant::now();
        loop {
            let remaining = self.timeout.saturating_sub(started.elapsed());
            let slice = remaining.min(POLL_INTERVAL);
            let waited = child.wait_timeout(slice).map_err(|e| ToolError::Launch {
                tool: tool.to_string(),
                message: e.to_string(),
            })?;
            if let Some(status) = waited {
                return Ok(status);
            }

            if self.cancel.is_cancelled() {
                kill(child);
                return Err(ToolError::Cancelled {
                    tool: tool.to_string(),
                });
            }
            if started.elapsed() >= self.timeout {
                kill(child);
                return Err(ToolError::Timeout {
                    tool: tool.to_string(),
                    after_secs: self.timeout.as_secs(),
                });
            }
        }
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    // Reap the zombie process
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<Vec<u8>>> {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(buf);
        });
        rx
    })
}

/// Output of one reader, or nothing once `budget` runs out
fn collect(tool: &str, reader: Option<Receiver<Vec<u8>>>, budget: Duration) -> Vec<u8> {
    let Some(reader) = reader else {
        return Vec::new();
    };
    reader.recv_timeout(budget.max(POLL_INTERVAL)).unwrap_or_else(|_| {
        tracing::warn!(tool, "output pipe still held open after exit, dropping it");
        Vec::new()
    })
}

/// Strip ANSI escapes and blank lines, keep the last lines
pub fn clean_diagnostics(raw: &str) -> String {
    let stripped = strip_ansi(raw);
    let lines: Vec<&str> = stripped
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect();
    let start = lines.len().saturating_sub(DIAGNOSTIC_LINES);
    lines[start..].join("\n")
}

fn strip_ansi(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            if c != '\r' {
                out.push(c);
            }
            continue;
        }
        match chars.peek() {
            // CSI: ESC [ params final-byte
            Some('[') => {
                chars.next();
                for c in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            }
            // OSC: ESC ] ... BEL
            Some(']') => {
                for c in chars.by_ref() {
                    if c == '\u{7}' {
                        break;
                    }
                }
            }
            Some(_) => {
                chars.next();
            }
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_colour_codes() {
        let raw = "\u{1b}[31mError\u{1b}[0m: DataPack failed\r\n\n  \n\u{1b}[1mdone\u{1b}[22m";
        assert_eq!(clean_diagnostics(raw), "Error: DataPack failed\ndone");
    }

    #[test]
    fn keeps_only_the_tail() {
        let raw: String = (0..100).map(|i| format!("line {i}\n")).collect();
        let cleaned = clean_diagnostics(&raw);
        assert_eq!(cleaned.lines().count(), DIAGNOSTIC_LINES);
        assert!(cleaned.ends_with("line 99"));
    }

    #[cfg(unix)]
    #[test]
    fn captures_output_and_status() {
        let runner = ProcessRunner::new(Duration::from_secs(10), CancelFlag::new());
        let output = runner
            .run("sh", Command::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]))
            .unwrap();

        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output.stdout_text().trim(), "out");
        assert_eq!(output.diagnostics(), "err");
    }

    #[cfg(unix)]
    #[test]
    fn run_checked_reports_failure() {
        let runner = ProcessRunner::new(Duration::from_secs(10), CancelFlag::new());
        let err = runner
            .run_checked("sh", Command::new("sh").args(["-c", "echo broken >&2; exit 1"]))
            .unwrap_err();

        assert!(matches!(err, ToolError::Failed { ref diagnostics, .. } if diagnostics == "broken"));
    }

    #[cfg(unix)]
    #[test]
    fn slow_commands_time_out() {
        let runner = ProcessRunner::new(Duration::from_millis(300), CancelFlag::new());
        let err = runner
            .run("sleep", Command::new("sleep").arg("5"))
            .unwrap_err();

        assert!(matches!(err, ToolError::Timeout { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_does_not_wait_for_background_children() {
        let runner = ProcessRunner::new(Duration::from_secs(1), CancelFlag::new());
        let started = Instant::now();
        let err = runner
            .run("sh", Command::new("sh").args(["-c", "sleep 20 & sleep 20"]))
            .unwrap_err();

        assert!(matches!(err, ToolError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn exit_does_not_wait_for_background_children() {
        let runner = ProcessRunner::new(Duration::from_secs(1), CancelFlag::new());
        let started = Instant::now();
        let output = runner
            .run("sh", Command::new("sh").args(["-c", "sleep 20 & echo started"]))
            .unwrap();

        assert!(output.success());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn cancelled_flag_stops_before_launch() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let runner = ProcessRunner::new(Duration::from_secs(10), cancel);

        let err = runner
            .run("git", &mut Command::new("git"))
            .unwrap_err();

        assert_eq!(
            err,
            ToolError::Cancelled {
                tool: "git".to_string()
            }
        );
    }

    #[test]
    fn missing_binary_is_a_launch_error() {
        let runner = ProcessRunner::new(Duration::from_secs(10), CancelFlag::new());
        let err = runner
            .run("nope", &mut Command::new("omnirelease-no-such-binary"))
            .unwrap_err();

        assert!(matches!(err, ToolError::Launch { .. }));
    }
}
