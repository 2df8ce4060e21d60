mod anthropic_client;
mod mock_research_provider;
mod perplexity_client;
mod provider_error;
mod provider_factory;

pub use anthropic_client::{ANTHROPIC_BASE_URL, ANTHROPIC_VERSION, AnthropicClient};
pub use mock_research_provider::MockResearchProvider;
pub use perplexity_client::{PERPLEXITY_BASE_URL, PerplexityClient};
pub use provider_factory::{ConfiguredProvider, create_research_provider};
