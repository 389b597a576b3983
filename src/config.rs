use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Rate card
    pub rate_card_path: PathBuf,

    // Workflow webhook
    pub workflow_webhook_url: Option<Url>,
    pub workflow_webhook_timeout_seconds: u64,
    pub workflow_webhook_max_elapsed_seconds: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Rate card
        let rate_card_path = env::var("RATE_CARD_PATH")
            .unwrap_or_else(|_| "data/rate_card.json".to_string())
            .into();

        // Workflow webhook
        let workflow_webhook_url = env::var("WORKFLOW_WEBHOOK_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| Url::parse(s.trim()))
            .transpose()
            .context("WORKFLOW_WEBHOOK_URL must be a valid URL")?;
        let workflow_webhook_timeout_seconds = env::var("WORKFLOW_WEBHOOK_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        let workflow_webhook_max_elapsed_seconds = env::var("WORKFLOW_WEBHOOK_MAX_ELAPSED_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Settings {
            env,
            server_addr,
            cors_allow_origins,
            rate_card_path,
            workflow_webhook_url,
            workflow_webhook_timeout_seconds,
            workflow_webhook_max_elapsed_seconds,
        })
    }
}

#[cfg(test)]
impl Settings {
    /// Settings for in-process tests.
    pub fn for_tests(rate_card_path: PathBuf) -> Self {
        Self {
            env: Environment::Dev,
            server_addr: "127.0.0.1:0".to_string(),
            cors_allow_origins: vec!["http://localhost:3000".to_string()],
            rate_card_path,
            workflow_webhook_url: None,
            workflow_webhook_timeout_seconds: 1,
            workflow_webhook_max_elapsed_seconds: 1,
        }
    }
}
