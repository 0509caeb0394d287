#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use tenant_provisioner::compute::{LayerRef, RolloutPolicy};
use tenant_provisioner::gateway::{self, GatewayOptions};
use tenant_provisioner::iam::{DeploymentEnvironment, IdentityProviderDetails, Role};
use tenant_provisioner::middleware::Authorizer;
use tenant_provisioner::provision::{TenantProvisioner, TenantProvisioningRequest, TenantStack};

pub const ACCOUNT: &str = "123456789012";
pub const REGION: &str = "us-east-1";
pub const USER_POOL: &str = "us-east-1_Pool42";
pub const API_KEY: &str = "test-api-key";
pub const AUTH_SECRET: &str = "integration-secret";

pub const SILO_CONFIG: &str = r#"
tenantId: acme
accountId: "123456789012"
region: us-east-1
idpDetails:
  name: Cognito
  details:
    userPoolId: us-east-1_Pool42
    appClientId: client-1
lambdaReserveConcurrency: 5
lambdaCanaryDeploymentPreference: Canary10Percent5Minutes
isPooledDeploy: false
lambdaServerlessSaaSLayers: arn:aws:lambda:us-east-1:123456789012:layer:saas-shared:7
tenantScopedAccessRole: AcmeTenantScopedAccessRole
"#;

pub fn cognito() -> IdentityProviderDetails {
    IdentityProviderDetails::new("Cognito", json!({ "userPoolId": USER_POOL, "appClientId": "client-1" }))
}

pub fn request(tenant_id: &str, is_pooled: bool, idp: IdentityProviderDetails) -> TenantProvisioningRequest {
    TenantProvisioningRequest {
        tenant_id: tenant_id.to_string(),
        environment: DeploymentEnvironment::new(ACCOUNT, REGION),
        identity_provider: idp,
        per_service_concurrency_limit: 10,
        deployment_strategy: RolloutPolicy::None,
        is_pooled_deployment: is_pooled,
        shared_runtime_layer: LayerRef("arn:aws:lambda:us-east-1:123456789012:layer:saas-shared:7".to_string()),
        tenant_access_role: Role::new("TenantScopedAccessRole"),
        source_root: "../src".to_string(),
    }
}

pub fn pooled_stack() -> Result<TenantStack> {
    Ok(TenantProvisioner::default().provision(&request("pooled", true, cognito()))?)
}

/// Write a config to a unique temp file
pub fn write_config(content: &str) -> Result<PathBuf> {
    let path = std::env::temp_dir().join(format!("tenant-provisioner-{}.yaml", uuid::Uuid::new_v4()));
    std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

pub fn app(stack: TenantStack, authorizer: Arc<dyn Authorizer>) -> Result<Router> {
    let stack = Arc::new(stack);
    let options = GatewayOptions {
        api_keys: [API_KEY.to_string()].into_iter().collect(),
        ..GatewayOptions::default()
    };
    let invokers = gateway::local_invokers(&stack);
    Ok(gateway::router(stack, options, authorizer, invokers)?)
}

pub struct Call<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub body: Option<Value>,
    pub bearer: Option<&'a str>,
    pub api_key: Option<&'a str>,
}

impl<'a> Call<'a> {
    pub fn new(method: &'a str, path: &'a str) -> Self {
        Self {
            method,
            path,
            body: None,
            bearer: None,
            api_key: None,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn bearer(mut self, token: &'a str) -> Self {
        self.bearer = Some(token);
        self
    }

    pub fn api_key(mut self, key: &'a str) -> Self {
        self.api_key = Some(key);
        self
    }
}

/// Drive one request through the router and decode the JSON response
pub async fn send(app: &Router, call: Call<'_>) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(call.method).uri(call.path);
    if let Some(token) = call.bearer {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    if let Some(key) = call.api_key {
        builder = builder.header("x-api-key", key);
    }

    let body = match call.body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&value)?)
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body)?).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let payload = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).with_context(|| format!("non-JSON response: {:?}", bytes))?
    };

    Ok((status, payload))
}
