use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use tenant_provisioner::config::{config, ProvisioningConfig};
use tenant_provisioner::gateway::{self, GatewayOptions};
use tenant_provisioner::middleware::JwtAuthorizer;
use tenant_provisioner::provision::TenantProvisioner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up PROVISION_CONFIG, SECURITY_API_KEYS, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config();
    tracing::info!("Starting tenant provisioner in {:?} mode", config.environment);

    let path = config
        .provision_config
        .as_deref()
        .context("PROVISION_CONFIG is not set")?;
    let provisioning = ProvisioningConfig::load(path)?;
    let stack = TenantProvisioner::new(provisioning.catalog())
        .provision(&provisioning.to_request())
        .with_context(|| format!("Provisioning tenant '{}'", provisioning.tenant_id))?;
    let stack = Arc::new(stack);

    if config.security.authorizer_secret.is_empty() {
        tracing::warn!("SECURITY_AUTHORIZER_SECRET is not set, gated methods will deny every request");
    }
    if config.security.api_keys.is_empty() {
        tracing::warn!("SECURITY_API_KEYS is empty, API-key-gated methods will reject every request");
    }

    let app = gateway::router(
        stack.clone(),
        GatewayOptions::from_config(config),
        Arc::new(JwtAuthorizer::new(config.security.authorizer_secret.clone())),
        gateway::local_invokers(&stack),
    )?;

    let bind_addr = format!("0.0.0.0:{}", config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!(tenant = %stack.tenant_id, "Gateway listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
