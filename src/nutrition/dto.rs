use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct NutritionQuery {
    pub food: String,
}

#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub primary_configured: bool,
    pub secondary_configured: bool,
    pub attempt_timeout_secs: u64,
}
