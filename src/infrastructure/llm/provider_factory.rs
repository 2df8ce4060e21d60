use async_trait::async_trait;

use crate::application::ports::{ProviderError, ResearchProvider};
use crate::domain::{ProviderMessage, ResearchOptions, ResearchResult};
use crate::presentation::config::ProviderSettings;

use super::{AnthropicClient, MockResearchProvider, PerplexityClient};

/// Provider chosen from configuration at startup.
pub enum ConfiguredProvider {
    Perplexity(PerplexityClient),
    Anthropic(AnthropicClient),
    Mock(MockResearchProvider),
}

#[async_trait]
impl ResearchProvider for ConfiguredProvider {
    fn name(&self) -> &str {
        match self {
            ConfiguredProvider::Perplexity(p) => p.name(),
            ConfiguredProvider::Anthropic(p) => p.name(),
            ConfiguredProvider::Mock(p) => p.name(),
        }
    }

    async fn query(
        &self,
        messages: &[ProviderMessage],
        options: &ResearchOptions,
    ) -> Result<ResearchResult, ProviderError> {
        match self {
            ConfiguredProvider::Perplexity(p) => p.query(messages, options).await,
            ConfiguredProvider::Anthropic(p) => p.query(messages, options).await,
            ConfiguredProvider::Mock(p) => p.query(messages, options).await,
        }
    }
}

pub fn create_research_provider(
    settings: &ProviderSettings,
) -> Result<ConfiguredProvider, ProviderError> {
    match settings.name.to_ascii_lowercase().as_str() {
        "perplexity" => Ok(ConfiguredProvider::Perplexity(PerplexityClient::new(
            settings,
        )?)),
        "anthropic" => Ok(ConfiguredProvider::Anthropic(AnthropicClient::new(
            settings,
        )?)),
        "mock" => Ok(ConfiguredProvider::Mock(MockResearchProvider::new())),
        other => Err(ProviderError::Configuration(format!(
            "unknown provider: {}",
            other
        ))),
    }
}
