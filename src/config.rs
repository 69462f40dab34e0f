use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context};

pub const DEFAULT_NUTRITIONIX_BASE_URL: &str = "https://trackapi.nutritionix.com";
pub const DEFAULT_CALORIENINJAS_BASE_URL: &str = "https://api.calorieninjas.com";

#[derive(Debug, Clone)]
pub struct NutritionixConfig {
    pub app_id: String,
    pub app_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct CalorieNinjasConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    /// `None` keeps the history in process memory.
    pub database_url: Option<String>,
    pub nutritionix: Option<NutritionixConfig>,
    pub calorieninjas: Option<CalorieNinjasConfig>,
    pub provider_timeout: Duration,
    pub storage: Option<StorageConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            nutritionix: None,
            calorieninjas: None,
            provider_timeout: Duration::from_secs(5),
            storage: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host = get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = get("APP_PORT").unwrap_or_else(|| "8080".into());
        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .with_context(|| format!("APP_HOST/APP_PORT is not a listen address: {host}:{port}"))?;

        let nutritionix = match (get("NUTRITIONIX_APP_ID"), get("NUTRITIONIX_APP_KEY")) {
            (Some(app_id), Some(app_key)) => Some(NutritionixConfig {
                app_id,
                app_key,
                base_url: get("NUTRITIONIX_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_NUTRITIONIX_BASE_URL.into()),
            }),
            (None, None) => None,
            _ => bail!("NUTRITIONIX_APP_ID and NUTRITIONIX_APP_KEY must be set together"),
        };

        let calorieninjas = get("CALORIENINJAS_API_KEY").map(|api_key| CalorieNinjasConfig {
            api_key,
            base_url: get("CALORIENINJAS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_CALORIENINJAS_BASE_URL.into()),
        });

        let provider_timeout = match get("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw
                    .parse::<u64>()
                    .with_context(|| format!("PROVIDER_TIMEOUT_SECS is not a number: {raw}"))?;
                if secs == 0 {
                    bail!("PROVIDER_TIMEOUT_SECS must be positive");
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(5),
        };

        let storage_parts = [
            get("MINIO_ENDPOINT"),
            get("MINIO_BUCKET"),
            get("MINIO_ACCESS_KEY"),
            get("MINIO_SECRET_KEY"),
        ];
        let storage = match storage_parts {
            [Some(endpoint), Some(bucket), Some(access_key), Some(secret_key)] => {
                Some(StorageConfig {
                    endpoint,
                    bucket,
                    access_key,
                    secret_key,
                })
            }
            [None, None, None, None] => None,
            _ => bail!("MINIO_ENDPOINT, MINIO_BUCKET, MINIO_ACCESS_KEY and MINIO_SECRET_KEY must be set together"),
        };

        Ok(Self {
            listen_addr,
            database_url: get("DATABASE_URL"),
            nutritionix,
            calorieninjas,
            provider_timeout,
            storage,
        })
    }
}
