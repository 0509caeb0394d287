use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

pub mod provisioning;

pub use provisioning::{ConfigError, ProvisioningConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub gateway: GatewayConfig,
    pub security: SecurityConfig,
    /// Provisioning config file served by the gateway binary
    pub provision_config: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    /// Keys accepted on `x-api-key` for API-key-gated methods
    pub api_keys: Vec<String>,
    /// HS256 secret the custom authorizer validates bearer tokens with
    pub authorizer_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Gateway overrides
        if let Ok(v) = env::var("GATEWAY_PORT").or_else(|_| env::var("PORT")) {
            self.gateway.port = v.parse().unwrap_or(self.gateway.port);
        }
        if let Ok(v) = env::var("GATEWAY_ENABLE_REQUEST_LOGGING") {
            self.gateway.enable_request_logging = v.parse().unwrap_or(self.gateway.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_API_KEYS") {
            self.security.api_keys = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_AUTHORIZER_SECRET") {
            self.security.authorizer_secret = v;
        }

        if let Ok(v) = env::var("PROVISION_CONFIG") {
            self.provision_config = Some(v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            gateway: GatewayConfig {
                port: 3000,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:4200".to_string()],
                api_keys: Vec::new(),
                authorizer_secret: String::new(),
            },
            provision_config: None,
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            gateway: GatewayConfig {
                port: 8080,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                api_keys: Vec::new(),
                authorizer_secret: String::new(),
            },
            provision_config: None,
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            gateway: GatewayConfig {
                port: 8080,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                api_keys: Vec::new(),
                authorizer_secret: String::new(),
            },
            provision_config: None,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
