//! Stop hook: block the first stop of a turn while tracked files have
//! uncommitted changes, and suggest committing.

use crate::error::{HookError, Result};
use crate::input::HookInput;
use crate::output::HookOutput;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Upper bound for each git query
pub const GIT_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs a program to completion and returns its stdout if it exited 0.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<Option<String>>;
}

/// Spawns real processes, killing them once `timeout` has elapsed.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    pub timeout: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            timeout: GIT_TIMEOUT,
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str], cwd: &Path) -> Result<Option<String>> {
        let command = format!("{} {}", program, args.join(" "));
        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| HookError::Spawn {
                command: command.clone(),
                source: e,
            })?;

        // Drain stdout while polling; a full pipe would stall the child
        let mut stdout = child.stdout.take();
        let reader = thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(out) = stdout.as_mut() {
                let _ = out.read_to_end(&mut buf);
            }
            buf
        });

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = reader.join();
                        return Err(HookError::Timeout {
                            command,
                            timeout: self.timeout,
                        });
                    }
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    return Err(HookError::Spawn { command, source: e });
                }
            }
        };

        let stdout = reader.join().unwrap_or_default();
        if !status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&stdout).trim().to_string()))
    }
}

pub struct StopNudge<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> StopNudge<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Trimmed stdout of a git query; any failure reads as "nothing".
    fn git(&self, args: &[&str], cwd: &Path) -> Option<String> {
        match self.runner.run("git", args, cwd) {
            Ok(out) => out.filter(|s| !s.is_empty()),
            Err(e) => {
                debug!("{}", e);
                None
            }
        }
    }

    pub fn run(&self, input: &HookInput) -> Option<HookOutput> {
        if input.stop_hook_active == Some(true) {
            debug!("Stop hook already active, allowing stop");
            return None;
        }

        let cwd = input.cwd().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
        self.git(&["status", "--porcelain", "-uno"], &cwd)?;

        let mut reason = "Uncommitted changes detected.".to_string();
        if let Some(stats) = self.git(&["diff", "--stat"], &cwd) {
            reason.push('\n');
            reason.push_str(&stats);
        }
        reason.push_str("\nConsider running /commit.");

        info!("Blocking stop: uncommitted changes in {:?}", cwd);
        Some(HookOutput::block(reason))
    }
}
