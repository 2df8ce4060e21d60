mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    JobSettings, LoggingSettings, PricingSettings, ProviderSettings, RateLimitOverride,
    RateLimitSettings, ResearchSettings, ServerSettings, Settings, UsageSettings,
};
