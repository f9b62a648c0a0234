use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Model provider used for uncached entries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// Chat completions HTTP API
    #[default]
    #[value(name = "openai")]
    OpenAi,
    Claude,
    Codex,
    Gemini,
}

impl AiProvider {
    /// Name shown in the `Source` column of the results
    pub fn display_name(&self) -> &'static str {
        match self {
            AiProvider::OpenAi => "OpenAI",
            AiProvider::Claude => "Claude",
            AiProvider::Codex => "Codex",
            AiProvider::Gemini => "Gemini",
        }
    }

    /// Executable of the locally installed CLI, `None` for the HTTP API
    pub fn command_name(&self) -> Option<&'static str> {
        match self {
            AiProvider::OpenAi => None,
            AiProvider::Claude => Some("claude"),
            AiProvider::Codex => Some("codex"),
            AiProvider::Gemini => Some("gemini"),
        }
    }

    pub fn needs_api_key(&self) -> bool {
        self.command_name().is_none()
    }
}
