//! Configuration management for the governance pipeline
//!
//! This module handles loading, validation, and access to all pipeline configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{GovernanceError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Governance configuration
    pub governance: GovernanceConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GovernanceError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let governance: GovernanceConfig = serde_yaml::from_str(content)
            .map_err(|e| GovernanceError::Config(format!("Failed to parse config: {}", e)))?;

        let config = Self { governance };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let governance = GovernanceConfig::from_env()?;
        let config = Self { governance };

        config.validate()?;
        Ok(config)
    }

    /// Load from an optional file, then apply environment overrides
    pub async fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };

        let _ = dotenvy::dotenv();
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect();
        config.governance.apply_env(&vars)?;

        config.validate()?;
        Ok(config)
    }

    pub fn backends(&self) -> &BackendsConfig {
        &self.governance.backends
    }

    pub fn rate_limit(&self) -> &RateLimitConfig {
        &self.governance.rate_limit
    }

    pub fn budget(&self) -> &BudgetConfig {
        &self.governance.budget
    }

    pub fn quality(&self) -> &QualityConfig {
        &self.governance.quality
    }

    pub fn cache(&self) -> &CacheConfig {
        &self.governance.cache
    }

    pub fn alerting(&self) -> &AlertingConfig {
        &self.governance.alerting
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.governance.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.governance
            .backends
            .validate()
            .map_err(|e| GovernanceError::Config(format!("Backend config error: {}", e)))?;

        self.governance
            .rate_limit
            .validate()
            .map_err(|e| GovernanceError::Config(format!("Rate limit config error: {}", e)))?;

        self.governance
            .budget
            .validate()
            .map_err(|e| GovernanceError::Config(format!("Budget config error: {}", e)))?;

        self.governance
            .quality
            .validate()
            .map_err(|e| GovernanceError::Config(format!("Quality config error: {}", e)))?;

        self.governance
            .cache
            .validate()
            .map_err(|e| GovernanceError::Config(format!("Cache config error: {}", e)))?;

        self.governance
            .alerting
            .validate()
            .map_err(|e| GovernanceError::Config(format!("Alerting config error: {}", e)))?;

        self.governance
            .logging
            .validate()
            .map_err(|e| GovernanceError::Config(format!("Logging config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.governance).map_err(|e| {
            GovernanceError::Config(format!("Failed to serialize config to YAML: {}", e))
        })
    }
}
