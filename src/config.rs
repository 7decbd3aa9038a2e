use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::llm::{LLMConfig, LLMProvider};

/// Configuration for the course platform backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP surface settings
    pub server: ServerConfig,

    /// Remote relational store collaborator
    pub store: StoreConfig,

    /// Object-storage collaborator for media uploads
    pub storage: StorageConfig,

    /// Generative-metadata settings
    pub llm: LLMConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the PostgREST-compatible endpoint
    pub endpoint: String,

    /// API key, sent both as apikey and bearer headers
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Whether the store cascades module deletion to its lessons. When
    /// false, lessons are deleted explicitly before their module.
    pub cascade_deletes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base URL of the storage endpoint
    pub endpoint: String,

    /// API key for uploads
    pub api_key: String,

    /// Bucket holding uploaded videos and thumbnails
    pub bucket: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "coursecast.toml",
            "config/coursecast.toml",
            "~/.config/coursecast/config.toml",
            "/etc/coursecast/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        // Fall back to environment variables
        Self::from_env()
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config file {}: {}", path, e))?;
        let config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Cannot parse config file {}: {}", path, e))?;
        tracing::info!("Loaded configuration from: {}", path);
        Ok(config)
    }

    /// Build configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var("COURSECAST_STORE_URL") {
            config.store.endpoint = endpoint;
        }

        if let Ok(api_key) = std::env::var("COURSECAST_STORE_KEY") {
            config.store.api_key = api_key.clone();
            // The storage collaborator usually shares the project key
            if config.storage.api_key.is_empty() {
                config.storage.api_key = api_key;
            }
        }

        if let Ok(endpoint) = std::env::var("COURSECAST_STORAGE_URL") {
            config.storage.endpoint = endpoint;
        }

        if let Ok(bucket) = std::env::var("COURSECAST_STORAGE_BUCKET") {
            config.storage.bucket = bucket;
        }

        if let Ok(api_key) = std::env::var("COURSECAST_LLM_API_KEY") {
            config.llm.api_key = Some(api_key);
        }

        if let Ok(port) = std::env::var("COURSECAST_PORT") {
            config.server.port = port.parse().unwrap_or(config.server.port);
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("server.port must be greater than 0"));
        }

        url::Url::parse(&self.store.endpoint)
            .map_err(|e| anyhow!("store.endpoint is not a valid URL: {}", e))?;
        url::Url::parse(&self.storage.endpoint)
            .map_err(|e| anyhow!("storage.endpoint is not a valid URL: {}", e))?;

        if self.store.api_key.is_empty() {
            return Err(anyhow!("store.api_key must be set"));
        }

        if self.storage.bucket.is_empty() {
            return Err(anyhow!("storage.bucket must be set"));
        }

        if self.llm.enable_generation && self.llm.api_key.is_none() {
            match self.llm.provider {
                LLMProvider::Gemini | LLMProvider::OpenAI => {
                    return Err(anyhow!(
                        "llm.api_key required when metadata generation is enabled"
                    ));
                }
            }
        }

        tracing::info!("Configuration validation passed");
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            store: StoreConfig {
                endpoint: "http://localhost:3000".to_string(),
                api_key: String::new(),
                timeout_seconds: 30,
                cascade_deletes: true,
            },
            storage: StorageConfig {
                endpoint: "http://localhost:3000/storage/v1".to_string(),
                api_key: String::new(),
                bucket: "videos".to_string(),
                timeout_seconds: 120,
            },
            llm: LLMConfig::default(),
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    pub fn with_store_endpoint(mut self, endpoint: String) -> Self {
        self.config.store.endpoint = endpoint;
        self
    }

    pub fn with_store_key(mut self, api_key: String) -> Self {
        self.config.store.api_key = api_key;
        self
    }

    pub fn with_storage_endpoint(mut self, endpoint: String) -> Self {
        self.config.storage.endpoint = endpoint;
        self
    }

    pub fn with_bucket(mut self, bucket: String) -> Self {
        self.config.storage.bucket = bucket;
        self
    }

    pub fn with_cascade_deletes(mut self, cascade: bool) -> Self {
        self.config.store.cascade_deletes = cascade;
        self
    }

    pub fn enable_generation(mut self, enable: bool) -> Self {
        self.config.llm.enable_generation = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
