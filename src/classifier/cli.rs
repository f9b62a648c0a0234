//! AI CLI client
//!
//! Runs a locally installed assistant CLI with the prompt as an argument and
//! takes its stdout as the reply.

use super::ModelClient;
use crate::ai_provider::AiProvider;
use crate::error::{MapperError, Result};
use indas_mapper_common::Prompt;
use std::time::Duration;
use tokio::process::Command;

pub struct CliClient {
    provider: AiProvider,
    timeout: Duration,
}

impl CliClient {
    pub fn new(provider: AiProvider, timeout_seconds: u64) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    fn args(&self, prompt: &str) -> Vec<String> {
        let prompt = prompt.to_string();
        match self.provider {
            AiProvider::Codex => vec!["exec".into(), prompt],
            AiProvider::Claude => vec!["-p".into(), prompt, "--output-format".into(), "text".into()],
            _ => vec!["-p".into(), prompt],
        }
    }
}

impl ModelClient for CliClient {
    fn provider(&self) -> AiProvider {
        self.provider
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let command = self
            .provider
            .command_name()
            .ok_or_else(|| MapperError::Config(format!("{:?} has no CLI", self.provider)))?;
        let args = self.args(&prompt.combined());

        // Windows needs cmd /c to resolve the npm shim
        #[cfg(windows)]
        let mut cmd = {
            let mut cmd = Command::new("cmd");
            cmd.arg("/c").arg(command).args(&args);
            cmd
        };

        #[cfg(not(windows))]
        let mut cmd = {
            let mut cmd = Command::new(command);
            cmd.args(&args);
            cmd
        };

        cmd.kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| MapperError::ApiCall(format!("{} timed out after {:?}", command, self.timeout)))?
            .map_err(|e| MapperError::ApiCall(format!("{} could not be started: {}", command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MapperError::ApiCall(format!(
                "{} failed (code {:?}): {}",
                command,
                output.status.code(),
                stderr.trim()
            )));
        }

        let reply = String::from_utf8_lossy(&output.stdout).to_string();
        if reply.trim().is_empty() {
            return Err(MapperError::ApiCall(format!("{} returned no output", command)));
        }

        tracing::debug!(reply_len = reply.len(), command, "CLI reply received");
        Ok(reply)
    }
}
