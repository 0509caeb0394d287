use serde::Serialize;

use super::ProvisionError;
use crate::compute::{CapacityPlacement, LayerRef, RolloutPolicy, POOLED_QUALIFIER};
use crate::iam::{DeploymentEnvironment, IdentityProviderDetails, Role};

/// Everything one provisioning run needs. Read-only once the run starts; the
/// tenant role is copied into the resulting stack and extended there.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantProvisioningRequest {
    pub tenant_id: String,
    pub environment: DeploymentEnvironment,
    pub identity_provider: IdentityProviderDetails,
    pub per_service_concurrency_limit: u32,
    pub deployment_strategy: RolloutPolicy,
    pub is_pooled_deployment: bool,
    pub shared_runtime_layer: LayerRef,
    pub tenant_access_role: Role,
    /// Directory the service code entry paths are relative to
    pub source_root: String,
}

impl TenantProvisioningRequest {
    pub fn placement(&self) -> CapacityPlacement {
        CapacityPlacement::for_tenant(self.is_pooled_deployment, &self.tenant_id)
    }

    /// A siloed tenant named after the shared pool would resolve to the pooled
    /// tables and functions.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if !self.is_pooled_deployment && self.tenant_id == POOLED_QUALIFIER {
            return Err(ProvisionError::InvalidConfig(format!(
                "siloed tenant id '{}' is reserved for the shared pool",
                self.tenant_id
            )));
        }
        Ok(())
    }

    /// Absolute code entry for a service directory
    pub fn code_entry(&self, service_dir: &str) -> String {
        format!("{}/{}", self.source_root.trim_end_matches('/'), service_dir.trim_start_matches('/'))
    }
}
