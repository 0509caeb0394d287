use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::compute::{LayerRef, RolloutPolicy, POOLED_QUALIFIER};
use crate::iam::{DeploymentEnvironment, IdentityProviderDetails, Role};
use crate::provision::{ServiceCatalog, ServiceUnitSpec, TenantProvisioningRequest};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse provisioning config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid provisioning config: {0}")]
    Invalid(String),
}

fn default_canary_preference() -> String {
    "none".to_string()
}

fn default_partition() -> String {
    "aws".to_string()
}

fn default_source_root() -> String {
    "../src".to_string()
}

/// Structured input a provisioning run is invoked with. Accepts YAML or JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningConfig {
    pub tenant_id: String,
    pub account_id: String,
    pub region: String,
    #[serde(default = "default_partition")]
    pub partition: String,
    pub idp_details: IdentityProviderDetails,
    pub lambda_reserve_concurrency: u32,
    #[serde(default = "default_canary_preference")]
    pub lambda_canary_deployment_preference: String,
    pub is_pooled_deploy: bool,
    #[serde(rename = "lambdaServerlessSaaSLayers", alias = "sharedRuntimeLayer")]
    pub lambda_serverless_saas_layers: String,
    pub tenant_scoped_access_role: String,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    /// Overrides the built-in service catalog when present
    #[serde(default)]
    pub services: Option<Vec<ServiceUnitSpec>>,
}

impl ProvisioningConfig {
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded provisioning config from {}", path.display());
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("tenantId", &self.tenant_id),
            ("accountId", &self.account_id),
            ("region", &self.region),
            ("idpDetails.name", &self.idp_details.kind),
            ("lambdaServerlessSaaSLayers", &self.lambda_serverless_saas_layers),
            ("tenantScopedAccessRole", &self.tenant_scoped_access_role),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("'{}' is required", field)));
            }
        }

        if !self
            .tenant_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Invalid(
                "tenantId can only contain letters, numbers, hyphens, and underscores".to_string(),
            ));
        }

        if !self.is_pooled_deploy && self.tenant_id == POOLED_QUALIFIER {
            return Err(ConfigError::Invalid(format!(
                "tenantId '{}' is reserved for pooled deployments",
                POOLED_QUALIFIER
            )));
        }

        Ok(())
    }

    pub fn to_request(&self) -> TenantProvisioningRequest {
        TenantProvisioningRequest {
            tenant_id: self.tenant_id.clone(),
            environment: DeploymentEnvironment {
                account_id: self.account_id.clone(),
                region: self.region.clone(),
                partition: self.partition.clone(),
            },
            identity_provider: self.idp_details.clone(),
            per_service_concurrency_limit: self.lambda_reserve_concurrency,
            deployment_strategy: RolloutPolicy::parse(&self.lambda_canary_deployment_preference),
            is_pooled_deployment: self.is_pooled_deploy,
            shared_runtime_layer: LayerRef(self.lambda_serverless_saas_layers.clone()),
            tenant_access_role: Role::new(self.tenant_scoped_access_role.clone()),
            source_root: self.source_root.clone(),
        }
    }

    pub fn catalog(&self) -> ServiceCatalog {
        match &self.services {
            Some(specs) => ServiceCatalog::new(specs.clone()),
            None => ServiceCatalog::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SILO: &str = r#"
tenantId: acme
accountId: "123456789012"
region: us-east-1
idpDetails:
  name: Cognito
  details:
    userPoolId: us-east-1_ABC
lambdaReserveConcurrency: 5
isPooledDeploy: false
lambdaServerlessSaaSLayers: arn:aws:lambda:us-east-1:123456789012:layer:saas:3
tenantScopedAccessRole: AcmeTenantRole
"#;

    #[test]
    fn test_canary_defaults_to_none() {
        let config = ProvisioningConfig::from_yaml(SILO).unwrap();
        assert_eq!(config.lambda_canary_deployment_preference, "none");

        let request = config.to_request();
        assert_eq!(request.deployment_strategy, RolloutPolicy::None);
        assert_eq!(request.per_service_concurrency_limit, 5);
        assert_eq!(request.environment.partition, "aws");
        assert_eq!(request.source_root, "../src");
        assert!(!request.is_pooled_deployment);
    }

    #[test]
    fn test_json_is_accepted() {
        let json = r#"{
            "tenantId": "pooled",
            "accountId": "1",
            "region": "eu-west-1",
            "idpDetails": {"name": "OIDC", "details": {}},
            "lambdaReserveConcurrency": 0,
            "lambdaCanaryDeploymentPreference": "Canary10Percent5Minutes",
            "isPooledDeploy": true,
            "sharedRuntimeLayer": "layer",
            "tenantScopedAccessRole": "role"
        }"#;
        let request = ProvisioningConfig::from_yaml(json).unwrap().to_request();
        assert_eq!(request.deployment_strategy.name(), Some("Canary10Percent5Minutes"));
    }

    #[test]
    fn test_missing_required_value() {
        let err = ProvisioningConfig::from_yaml(&SILO.replace("AcmeTenantRole", "\"\"")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("tenantScopedAccessRole")));
    }

    #[test]
    fn test_siloed_tenant_cannot_take_the_pool_name() {
        let err = ProvisioningConfig::from_yaml(&SILO.replace("tenantId: acme", "tenantId: pooled")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("reserved for pooled")));
    }

    #[test]
    fn test_negative_concurrency_is_a_parse_error() {
        let err = ProvisioningConfig::from_yaml(&SILO.replace("lambdaReserveConcurrency: 5", "lambdaReserveConcurrency: -1"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_field_is_a_parse_error() {
        let err = ProvisioningConfig::from_yaml(&SILO.replace("isPooledDeploy: false\n", "")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_builtin_catalog_unless_overridden() {
        let config = ProvisioningConfig::from_yaml(SILO).unwrap();
        assert_eq!(config.catalog(), ServiceCatalog::builtin());
    }
}
