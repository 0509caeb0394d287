pub mod grants;
pub mod routes;
pub mod synth;
pub mod token;
pub mod validate;

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use crate::config::{config, ProvisioningConfig};
use crate::provision::{TenantProvisioner, TenantStack};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(long, short, help = "Provisioning config (YAML or JSON); defaults to PROVISION_CONFIG")]
    pub config: Option<PathBuf>,
}

impl ConfigArgs {
    pub fn path(&self) -> anyhow::Result<PathBuf> {
        self.config
            .clone()
            .or_else(|| config().provision_config.as_ref().map(PathBuf::from))
            .context("No provisioning config given. Pass --config or set PROVISION_CONFIG")
    }

    pub fn load(&self) -> anyhow::Result<ProvisioningConfig> {
        let path = self.path()?;
        ProvisioningConfig::load(&path).with_context(|| format!("Loading {}", path.display()))
    }
}

/// Load the config and run a full provisioning pass
pub fn provision(args: &ConfigArgs) -> anyhow::Result<TenantStack> {
    let provisioning = args.load()?;
    let provisioner = TenantProvisioner::new(provisioning.catalog());
    let stack = provisioner
        .provision(&provisioning.to_request())
        .with_context(|| format!("Provisioning tenant '{}'", provisioning.tenant_id))?;
    Ok(stack)
}
