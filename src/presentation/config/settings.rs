use std::collections::HashMap;
use std::time::Duration;

use chrono::TimeDelta;
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};

use crate::application::services::{
    DEFAULT_VENDOR_RETRIES, ModelPricing, OrchestratorConfig, RateLimitRule,
};

use super::Environment;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub rate_limit: RateLimitSettings,
    pub jobs: JobSettings,
    pub research: ResearchSettings,
    pub usage: UsageSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Layers built-in defaults, `appsettings.{environment}` and `APP_*` variables, in that order.
    ///
    /// Nested keys use a double underscore: `APP_PROVIDER__API_KEY`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str().to_lowercase()))
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// `perplexity`, `anthropic` or `mock`.
    pub name: String,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: "perplexity".to_string(),
            api_key: String::new(),
            base_url: None,
            model: "sonar-deep-research".to_string(),
            max_tokens: 4096,
            temperature: 0.2,
            request_timeout_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimitOverride {
    pub limit: u32,
    pub window_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub limit: u32,
    pub window_ms: u64,
    pub max_keys: Option<usize>,
    #[serde(default)]
    pub overrides: HashMap<String, RateLimitOverride>,
}

impl RateLimitSettings {
    pub fn default_rule(&self) -> RateLimitRule {
        RateLimitRule::new(self.limit, window(self.window_ms))
    }

    pub fn override_rules(&self) -> impl Iterator<Item = (&str, RateLimitRule)> {
        self.overrides.iter().map(|(key, o)| {
            (key.as_str(), RateLimitRule::new(o.limit, window(o.window_ms)))
        })
    }
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            limit: 5,
            window_ms: 60_000,
            max_keys: Some(1024),
            overrides: HashMap::new(),
        }
    }
}

fn window(ms: u64) -> TimeDelta {
    TimeDelta::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSettings {
    pub retention_secs: u64,
    pub sweep_interval_secs: u64,
    pub max_jobs: Option<usize>,
}

impl JobSettings {
    pub fn retention(&self) -> TimeDelta {
        TimeDelta::seconds(i64::try_from(self.retention_secs).unwrap_or(i64::MAX))
    }
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            retention_secs: 3600,
            sweep_interval_secs: 300,
            max_jobs: Some(10_000),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchSettings {
    pub provider_key: String,
    pub min_query_length: usize,
    pub deep_estimate_secs: u64,
    pub queue_capacity: usize,
    pub worker_recheck_ms: u64,
    /// Provider 429s a started job survives before it is failed.
    pub vendor_retries: u32,
    pub poll_max_attempts: u32,
    pub poll_interval_ms: u64,
}

impl ResearchSettings {
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            provider_key: self.provider_key.clone(),
            min_query_length: self.min_query_length,
            deep_estimate: Duration::from_secs(self.deep_estimate_secs),
        }
    }
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            provider_key: "perplexity".to_string(),
            min_query_length: 3,
            deep_estimate_secs: 120,
            queue_capacity: 64,
            worker_recheck_ms: 1000,
            vendor_retries: DEFAULT_VENDOR_RETRIES,
            poll_max_attempts: 60,
            poll_interval_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricingSettings {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageSettings {
    #[serde(default)]
    pub pricing: HashMap<String, PricingSettings>,
}

impl UsageSettings {
    pub fn pricing_table(&self) -> HashMap<String, ModelPricing> {
        self.pricing
            .iter()
            .map(|(model, p)| {
                (
                    model.clone(),
                    ModelPricing::new(p.input_per_million, p.output_per_million),
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info,research_relay=debug,tower_http=debug".to_string(),
            enable_json: false,
        }
    }
}
