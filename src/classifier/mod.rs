//! Classifier gateway
//!
//! Builds the prompt contract from the label catalog, sends it to the model
//! and turns the free-text reply into a taxonomy-constrained classification.
//!
//! - `openai`: chat completions HTTP API
//! - `cli`: locally installed AI CLI (claude / codex / gemini)
//!
//! Provider failures come back as [`ProviderFailure`] values; nothing is
//! retried here.

mod cli;
mod openai;

pub use cli::CliClient;
pub use openai::OpenAiClient;

use crate::ai_provider::AiProvider;
use crate::config::Config;
use crate::error::Result;
use indas_mapper_common::{
    parse_reply, ClassificationResult, Context, LabelCatalog, MatchPolicy, PathValidator, Prompt,
};
use thiserror::Error;

/// Transport to a language model
#[allow(async_fn_in_trait)]
pub trait ModelClient {
    fn provider(&self) -> AiProvider;

    /// Send one prompt and return the raw reply text
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}

/// Model call that produced no reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{provider} request failed: {message}")]
pub struct ProviderFailure {
    pub provider: &'static str,
    pub message: String,
}

/// Client chosen at startup from the `--ai-provider` flag
pub enum ModelBackend {
    OpenAi(OpenAiClient),
    Cli(CliClient),
}

impl ModelBackend {
    /// Build the client for `provider`.
    ///
    /// Fails with `MissingApiKey` when the HTTP provider has no key.
    pub fn from_config(provider: AiProvider, config: &Config) -> Result<Self> {
        if provider.needs_api_key() {
            Ok(ModelBackend::OpenAi(OpenAiClient::from_config(config)?))
        } else {
            Ok(ModelBackend::Cli(CliClient::new(provider, config.timeout_seconds)))
        }
    }
}

impl ModelClient for ModelBackend {
    fn provider(&self) -> AiProvider {
        match self {
            ModelBackend::OpenAi(client) => client.provider(),
            ModelBackend::Cli(client) => client.provider(),
        }
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        match self {
            ModelBackend::OpenAi(client) => client.complete(prompt).await,
            ModelBackend::Cli(client) => client.complete(prompt).await,
        }
    }
}

pub struct ClassifierGateway<'a, C> {
    client: C,
    catalog: &'a LabelCatalog,
    validator: PathValidator<'a>,
}

impl<'a, C: ModelClient> ClassifierGateway<'a, C> {
    pub fn new(client: C, catalog: &'a LabelCatalog, policy: MatchPolicy) -> Self {
        Self {
            client,
            catalog,
            validator: PathValidator::new(catalog, policy),
        }
    }

    pub fn provider(&self) -> AiProvider {
        self.client.provider()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Classify one account entry.
    ///
    /// Missing reply fields degrade to `"Unknown"` and an unmatched label path
    /// to the unresolved sentinel; only a failed model call is an error.
    pub async fn classify(
        &self,
        text: &str,
        context: Context,
    ) -> std::result::Result<ClassificationResult, ProviderFailure> {
        let prompt = Prompt::new(self.catalog.options(), text, context);
        tracing::debug!(
            account = text,
            %context,
            system_len = prompt.system.len(),
            user_len = prompt.user.len(),
            "sending classification prompt"
        );

        let reply = self.client.complete(&prompt).await.map_err(|e| ProviderFailure {
            provider: self.provider().display_name(),
            message: e.to_string(),
        })?;

        let parsed = parse_reply(&reply);
        if !parsed.is_complete() {
            tracing::warn!(account = text, missing = ?parsed.missing, "reply is missing fields");
        }

        let result = parsed.into_result(&self.validator);
        if !result.is_resolved() {
            tracing::warn!(account = text, "label path did not match the taxonomy");
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapperError;
    use indas_mapper_common::UNRESOLVED_LABEL;
    use std::cell::RefCell;

    struct CannedClient {
        reply: std::result::Result<String, String>,
        prompts: RefCell<Vec<Prompt>>,
    }

    impl ModelClient for CannedClient {
        fn provider(&self) -> AiProvider {
            AiProvider::OpenAi
        }

        async fn complete(&self, prompt: &Prompt) -> Result<String> {
            self.prompts.borrow_mut().push(prompt.clone());
            self.reply.clone().map_err(MapperError::ApiCall)
        }
    }

    fn canned(reply: std::result::Result<&str, &str>) -> CannedClient {
        CannedClient {
            reply: reply.map(str::to_string).map_err(str::to_string),
            prompts: RefCell::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_classify_resolves_label() {
        let catalog = LabelCatalog::ind_as();
        let client = canned(Ok("Classification Type: Balance Sheet\n\
                                Label Path: Property, Plant and Equipment\n\
                                Reasoning: Contra asset\n\
                                Ind AS: Ind AS 16"));
        let gateway = ClassifierGateway::new(client, &catalog, MatchPolicy::Containment);

        let result = gateway.classify("Accumulated Depreciation", Context::Debit).await.unwrap();
        assert_eq!(
            result.label_path,
            "Balance Sheet > ASSETS > (1) Non-current assets > (a) Property, Plant and Equipment"
        );
        assert_eq!(result.ind_as_reference, "Ind AS 16");

        let prompts = gateway.client().prompts.borrow();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].user.contains("Text: Accumulated Depreciation"));
        assert!(prompts[0].user.contains("Context: Debit"));
        assert!(prompts[0].system.contains(&catalog.options()[0]));
    }

    #[tokio::test]
    async fn test_classify_degrades_on_garbage_reply() {
        let catalog = LabelCatalog::ind_as();
        let gateway = ClassifierGateway::new(canned(Ok("I am not sure.")), &catalog, MatchPolicy::Containment);

        let result = gateway.classify("Misc", Context::Credit).await.unwrap();
        assert_eq!(result.classification_type, "Unknown");
        assert_eq!(result.label_path, UNRESOLVED_LABEL);
    }

    #[tokio::test]
    async fn test_classify_reports_provider_failure() {
        let catalog = LabelCatalog::ind_as();
        let gateway = ClassifierGateway::new(canned(Err("connection reset")), &catalog, MatchPolicy::Containment);

        let failure = gateway.classify("Cash", Context::Debit).await.unwrap_err();
        assert_eq!(failure.provider, "OpenAI");
        assert!(failure.message.contains("connection reset"));
    }
}
