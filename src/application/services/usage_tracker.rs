use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::domain::ResearchResult;

/// Price in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelPricing {
    pub fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    fn cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        (input_tokens as f64 * self.input_per_million
            + output_tokens as f64 * self.output_per_million)
            / 1_000_000.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelUsage {
    pub model: String,
    pub requests: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub estimated_cost_usd: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSnapshot {
    pub models: Vec<ModelUsage>,
    pub total_requests: u64,
    pub total_cost_usd: f64,
}

pub struct UsageTracker {
    totals: Mutex<HashMap<String, ModelUsage>>,
    pricing: HashMap<String, ModelPricing>,
}

impl UsageTracker {
    pub fn new(pricing: HashMap<String, ModelPricing>) -> Self {
        Self {
            totals: Mutex::new(HashMap::new()),
            pricing,
        }
    }

    pub fn record(&self, result: &ResearchResult) {
        let usage = result.usage.unwrap_or_default();
        let cost = self
            .pricing
            .get(&result.model)
            .map(|p| p.cost(usage.input_tokens, usage.output_tokens))
            .unwrap_or(0.0);

        let mut totals = self.totals.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = totals
            .entry(result.model.clone())
            .or_insert_with(|| ModelUsage {
                model: result.model.clone(),
                ..ModelUsage::default()
            });
        entry.requests += 1;
        entry.input_tokens += usage.input_tokens;
        entry.output_tokens += usage.output_tokens;
        entry.estimated_cost_usd += cost;
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        let totals = self.totals.lock().unwrap_or_else(PoisonError::into_inner);
        let mut models: Vec<ModelUsage> = totals.values().cloned().collect();
        models.sort_by(|a, b| a.model.cmp(&b.model));

        UsageSnapshot {
            total_requests: models.iter().map(|m| m.requests).sum(),
            total_cost_usd: models.iter().map(|m| m.estimated_cost_usd).sum(),
            models,
        }
    }
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}
