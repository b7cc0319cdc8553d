//! Retrying command execution validated against expected output

use crate::command::Command;
use crate::condition::Expectation;
use crate::error::{Error, Result};
use async_io::Timer;
use async_process::Stdio;
use std::time::Duration;
use tracing::debug;

/// Attempt budget and pause for one validated execution
///
/// `max_retries` counts *extra* attempts beyond the first, so a policy with
/// `max_retries = 2` executes the command up to three times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    pause: Duration,
}

impl RetryPolicy {
    /// Create a policy with the given number of extra attempts and pause
    pub fn new(max_retries: u32, pause: Duration) -> Self {
        Self { max_retries, pause }
    }

    /// A policy that executes exactly once, with no pause
    pub fn single_attempt() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Number of extra attempts beyond the first
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Pause between attempts
    pub fn pause(&self) -> Duration {
        self.pause
    }
}

/// Outcome of a validated execution
#[derive(Debug, Clone)]
pub struct Validated {
    /// Whether every expectation held on some attempt
    pub satisfied: bool,
    /// Trimmed combined stdout/stderr of the last attempt
    pub output: String,
}

/// Executes commands and validates their output against expectations
///
/// The validator carries a name used for tracing so that log lines from
/// different callers can be told apart.
#[derive(Debug)]
pub struct Validator {
    service_name: String,
}

impl Validator {
    /// Create a new validator
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Get the validator's name
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Execute a command until its output satisfies every expectation
    ///
    /// One execution per attempt, combined stdout/stderr captured and
    /// trimmed. Returns as soon as all expectations hold; otherwise pauses
    /// and retries up to `policy.max_retries()` extra times, and reports the
    /// last attempt's output with `satisfied` false. A non-zero exit status
    /// aborts the loop immediately with [`Error::CommandFailed`].
    pub async fn run_with_validation(
        &self,
        command: &Command,
        expected: &[Expectation],
        policy: &RetryPolicy,
    ) -> Result<Validated> {
        let mut output = String::new();
        for attempt in 0..=policy.max_retries() {
            if attempt > 0 {
                Timer::after(policy.pause()).await;
            }
            output = self.capture(command).await?;
            // `all` short-circuits on the first failing expectation
            if expected.iter().all(|e| e.is_satisfied_by(&output)) {
                debug!(
                    service = %self.service_name,
                    attempt,
                    "output satisfied all expectations"
                );
                return Ok(Validated {
                    satisfied: true,
                    output,
                });
            }
            debug!(
                service = %self.service_name,
                attempt,
                max_retries = policy.max_retries(),
                "output did not satisfy expectations"
            );
        }
        Ok(Validated {
            satisfied: false,
            output,
        })
    }

    /// Execute a command with inherited stdio, for human-readable streaming
    ///
    /// No capture, no validation, no retry. Fails on non-zero exit status.
    pub async fn run_streaming(&self, command: &Command) -> Result<()> {
        let mut cmd = command.prepare();
        let status = cmd.status().await.map_err(|e| {
            Error::spawn_failed(format!(
                "failed to run {:?}: {}",
                command.get_program(),
                e
            ))
        })?;
        if !status.success() {
            return Err(Error::CommandFailed {
                code: status.code(),
                output: String::new(),
            });
        }
        Ok(())
    }

    /// Run the command once, capturing merged stdout/stderr
    async fn capture(&self, command: &Command) -> Result<String> {
        let mut cmd = command.prepare();
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let out = cmd.output().await.map_err(|e| {
            Error::spawn_failed(format!(
                "failed to run {:?}: {}",
                command.get_program(),
                e
            ))
        })?;

        let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&out.stderr));
        let text = text.trim().to_string();

        if !out.status.success() {
            return Err(Error::CommandFailed {
                code: out.status.code(),
                output: text,
            });
        }
        Ok(text)
    }
}
