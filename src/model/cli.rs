//! Model backed by a local CLI (default `claude --print`).
//!
//! The CLI expects an interactive terminal, so it runs under a PTY with a
//! timeout. The blocking read happens on tokio's blocking pool.

use std::io::Read;
use std::process::Command;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use portable_pty::{ChildKiller, CommandBuilder, NativePtySystem, PtySize, PtySystem};

use super::{ModelRequest, ScheduleModel};
use crate::error::ModelError;
use crate::types::ModelConfig;

/// Runs the configured command with the prompt as its last argument.
#[derive(Debug, Clone)]
pub struct CliModel {
    command: String,
    args: Vec<String>,
    timeout_secs: u64,
}

impl CliModel {
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    /// Check if the command is on PATH
    pub fn is_available(&self) -> bool {
        Command::new("which")
            .arg(&self.command)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn run_blocking(&self, prompt: &str) -> Result<String, ModelError> {
        if !self.is_available() {
            return Err(ModelError::CommandNotFound(self.command.clone()));
        }

        let pty_system = NativePtySystem::default();
        let pair = pty_system
            .openpty(PtySize {
                rows: 24,
                cols: 200,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| ModelError::Io(format!("Failed to open PTY: {}", e)))?;

        let mut cmd = CommandBuilder::new(&self.command);
        cmd.args(&self.args);
        cmd.arg(prompt);

        let mut child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| ModelError::Io(format!("Failed to spawn {}: {}", self.command, e)))?;

        // Drop the slave so EOF reaches the reader when the child exits
        drop(pair.slave);

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| ModelError::Io(format!("Failed to clone PTY reader: {}", e)))?;

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut output = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => output.extend_from_slice(&buf[..n]),
                    Err(_) => break,
                }
            }
            let _ = tx.send(output);
        });

        let output = match rx.recv_timeout(Duration::from_secs(self.timeout_secs)) {
            Ok(output) => output,
            Err(_) => {
                log::warn!(
                    "{} did not finish within {}s; killing it",
                    self.command,
                    self.timeout_secs
                );
                if let Err(e) = child.kill() {
                    log::warn!("Failed to kill {}: {}", self.command, e);
                }
                let _ = child.wait();
                return Err(ModelError::Timeout(self.timeout_secs));
            }
        };

        if let Err(e) = child.wait() {
            log::debug!("Failed to reap {}: {}", self.command, e);
        }

        classify_output(&String::from_utf8_lossy(&output))
    }
}

/// Map known failure text to errors and normalise terminal line endings.
fn classify_output(raw: &str) -> Result<String, ModelError> {
    let lower = raw.to_lowercase();
    if lower.contains("not authenticated")
        || lower.contains("please login")
        || lower.contains("login required")
    {
        return Err(ModelError::NotAuthenticated);
    }
    if lower.contains("rate limit") || lower.contains("too many requests") {
        return Err(ModelError::RateLimited);
    }

    let text = raw.replace("\r\n", "\n");
    if text.trim().is_empty() {
        return Err(ModelError::EmptyResponse);
    }
    Ok(text)
}

fn render_prompt(request: &ModelRequest) -> String {
    if request.images.is_empty() {
        return request.instruction.clone();
    }
    let mut prompt = request.instruction.clone();
    prompt.push_str("\n\nCalendar images:\n");
    for image in &request.images {
        prompt.push_str(&format!("- {}\n", image.display()));
    }
    prompt
}

#[async_trait]
impl ScheduleModel for CliModel {
    async fn complete(&self, request: ModelRequest) -> Result<String, ModelError> {
        let model = self.clone();
        let prompt = render_prompt(&request);
        log::debug!(
            "Running {} with a {}-byte prompt and {} image(s)",
            self.command,
            prompt.len(),
            request.images.len()
        );
        tokio::task::spawn_blocking(move || model.run_blocking(&prompt))
            .await
            .map_err(|e| ModelError::Io(format!("Model task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Instant;

    #[test]
    fn test_classify_output_normalises_newlines() {
        let text = classify_output("February 2026\r\n\r\nMon Feb 2nd - DESIGN\r\n").unwrap();
        assert_eq!(text, "February 2026\n\nMon Feb 2nd - DESIGN\n");
    }

    #[test]
    fn test_classify_output_errors() {
        assert!(matches!(
            classify_output("Error: Not authenticated. Please login."),
            Err(ModelError::NotAuthenticated)
        ));
        assert!(matches!(
            classify_output("429 Too Many Requests"),
            Err(ModelError::RateLimited)
        ));
        assert!(matches!(classify_output(" \r\n"), Err(ModelError::EmptyResponse)));
    }

    #[test]
    fn test_render_prompt_lists_images() {
        let request = ModelRequest::with_images(
            "Transcribe.",
            vec![PathBuf::from("/tmp/feb-1.png"), PathBuf::from("/tmp/feb-2.png")],
        );
        let prompt = render_prompt(&request);
        assert!(prompt.starts_with("Transcribe.\n\nCalendar images:\n"));
        assert!(prompt.contains("- /tmp/feb-2.png\n"));
        assert_eq!(render_prompt(&ModelRequest::text("Hi")), "Hi");
    }

    #[tokio::test]
    async fn test_missing_command_reported() {
        let model = CliModel::new(&ModelConfig {
            command: "prodsched-no-such-model-binary".to_string(),
            args: vec![],
            timeout_secs: 1,
        });
        let err = model.complete(ModelRequest::text("hello")).await.unwrap_err();
        assert!(matches!(err, ModelError::CommandNotFound(_)));
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let model = CliModel::new(&ModelConfig {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), "exec sleep 30".to_string()],
            timeout_secs: 1,
        });
        if !model.is_available() {
            return;
        }

        let started = Instant::now();
        let err = model.complete(ModelRequest::text("hello")).await.unwrap_err();
        assert!(matches!(err, ModelError::Timeout(1)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_successful_run_returns_output() {
        let model = CliModel::new(&ModelConfig {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), "echo \"Mon Feb 2nd - $0\"".to_string()],
            timeout_secs: 10,
        });
        if !model.is_available() {
            return;
        }

        let text = model.complete(ModelRequest::text("DESIGN")).await.unwrap();
        assert_eq!(text.trim(), "Mon Feb 2nd - DESIGN");
    }
}
