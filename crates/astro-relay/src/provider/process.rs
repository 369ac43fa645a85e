//! Ollama run as a child process: `{command} run {model}`.
//!
//! The prompt goes in on stdin; stdout is relayed as it is produced.

use std::process::{ExitStatus, Stdio};

use futures::stream::{self, StreamExt};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use super::{BodyStream, Reply};
use crate::error::RelayError;

pub struct OllamaProcessProvider {
    command: String,
    model: String,
}

impl OllamaProcessProvider {
    pub fn new(command: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            model: model.into(),
        }
    }

    pub async fn run(&self, prompt: &str) -> Result<Reply, RelayError> {
        debug!("Spawning {} run {}", self.command, self.model);
        let mut child = Command::new(&self.command)
            .arg("run")
            .arg(&self.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RelayError::internal(format!("failed to start {}: {}", self.command, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RelayError::internal("child stdout not captured"))?;

        if let Some(mut stdin) = child.stdin.take() {
            let prompt = prompt.to_string();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                    warn!("Writing prompt to child failed: {}", e);
                }
                // dropping stdin closes it
            });
        }

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if !line.trim().is_empty() {
                        warn!("ollama: {}", line);
                    }
                }
            });
        }

        Ok(Reply::Fragments(stdout_stream(child, ReaderStream::new(stdout))))
    }
}

/// Relay stdout chunks and reap the child once stdout closes.
fn stdout_stream(
    child: Child,
    stdout: ReaderStream<tokio::process::ChildStdout>,
) -> BodyStream {
    stream::unfold(Some((child, stdout)), |state| async move {
        let (mut child, mut stdout) = state?;
        match stdout.next().await {
            Some(chunk) => Some((chunk, Some((child, stdout)))),
            None => {
                log_exit(child.wait().await);
                None
            }
        }
    })
    .boxed()
}

fn log_exit(status: std::io::Result<ExitStatus>) {
    match status {
        Ok(status) if status.success() => info!("Child process finished"),
        Ok(status) => warn!("Child process exited with {}", status),
        Err(e) => warn!("Waiting for child process failed: {}", e),
    }
}
