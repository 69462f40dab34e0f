use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::local_table;
use super::providers::{CalorieNinjasProvider, NutritionProvider, NutritionixProvider, ProviderError};
use super::record::NutritionRecord;
use crate::config::AppConfig;

/// Ordered fallback chain: remote providers in priority order, then the local table.
#[derive(Clone)]
pub struct NutritionResolver {
    providers: Vec<Arc<dyn NutritionProvider>>,
    attempt_timeout: Duration,
}

impl NutritionResolver {
    pub fn new(providers: Vec<Arc<dyn NutritionProvider>>, attempt_timeout: Duration) -> Self {
        Self {
            providers,
            attempt_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("snapmeal/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let providers: Vec<Arc<dyn NutritionProvider>> = vec![
            Arc::new(NutritionixProvider::new(http.clone(), config.nutritionix.clone())),
            Arc::new(CalorieNinjasProvider::new(http, config.calorieninjas.clone())),
        ];
        Ok(Self::new(providers, config.provider_timeout))
    }

    /// Local table only.
    #[cfg(test)]
    pub fn offline() -> Self {
        Self::new(Vec::new(), Duration::from_secs(5))
    }

    async fn attempt(
        &self,
        provider: &dyn NutritionProvider,
        food: &str,
    ) -> Result<NutritionRecord, ProviderError> {
        match tokio::time::timeout(self.attempt_timeout, provider.lookup(food)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::CallFailed(format!(
                "timed out after {:?}",
                self.attempt_timeout
            ))),
        }
    }

    /// Never fails. A `Local` source is the only sign that every remote tier was skipped or failed.
    pub async fn resolve(&self, food: &str) -> NutritionRecord {
        for provider in &self.providers {
            debug!(provider = provider.name(), tier = %provider.tier(), %food, "trying provider");
            match self.attempt(provider.as_ref(), food).await {
                Ok(record) => {
                    info!(provider = provider.name(), source = %record.source(), %food, "nutrition resolved");
                    return record;
                }
                Err(ProviderError::Unavailable) => {
                    debug!(provider = provider.name(), "provider not configured; skipping");
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, %food, "provider failed; falling back");
                }
            }
        }

        let record = local_table::resolve_local(food);
        info!(source = %record.source(), %food, "nutrition resolved from local table");
        record
    }
}
