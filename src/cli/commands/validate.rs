use serde_json::json;

use crate::cli::commands::ConfigArgs;
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config::ProvisioningConfig;
use crate::provision::{ProvisionError, TenantProvisioner, RESERVED_SEGMENTS};

pub async fn handle(args: ConfigArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let provisioning = args.load()?;
    let catalog = provisioning.catalog();

    if let Err(e) = catalog.validate(RESERVED_SEGMENTS) {
        output_error(&output_format, &e.to_string(), Some("INVALID_CATALOG"))?;
        return Err(e.into());
    }

    if let Err(e) = dry_run(&provisioning) {
        output_error(&output_format, &e.to_string(), Some("INVALID_CONFIG"))?;
        return Err(e.into());
    }

    output_success(
        &output_format,
        &format!(
            "Config for tenant '{}' is valid ({} services)",
            provisioning.tenant_id,
            catalog.specs().len()
        ),
        Some(json!({
            "tenantId": provisioning.tenant_id,
            "services": catalog.specs().iter().map(|s| s.name.clone()).collect::<Vec<_>>(),
        })),
    )
}

/// Provision the config in memory and discard the stack. Catches provider and
/// request problems the catalog check cannot see.
pub fn dry_run(provisioning: &ProvisioningConfig) -> Result<(), ProvisionError> {
    TenantProvisioner::new(provisioning.catalog()).provision(&provisioning.to_request())?;
    Ok(())
}
