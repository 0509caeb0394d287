use serde_json::json;

use crate::compute::{LayerRef, RolloutPolicy};
use crate::iam::{DeploymentEnvironment, IdentityProviderDetails, Role};
use crate::provision::TenantProvisioningRequest;

// Fixtures shared by unit tests

pub const TEST_ACCOUNT: &str = "123456789012";
pub const TEST_REGION: &str = "us-east-1";
pub const TEST_USER_POOL: &str = "us-east-1_ABC";

pub fn cognito() -> IdentityProviderDetails {
    IdentityProviderDetails::new(
        "Cognito",
        json!({
            "userPoolId": TEST_USER_POOL,
            "appClientId": "client-123"
        }),
    )
}

pub fn request(tenant_id: &str, is_pooled: bool) -> TenantProvisioningRequest {
    TenantProvisioningRequest {
        tenant_id: tenant_id.to_string(),
        environment: DeploymentEnvironment::new(TEST_ACCOUNT, TEST_REGION),
        identity_provider: cognito(),
        per_service_concurrency_limit: 10,
        deployment_strategy: RolloutPolicy::None,
        is_pooled_deployment: is_pooled,
        shared_runtime_layer: LayerRef("arn:aws:lambda:us-east-1:123456789012:layer:saas-shared:1".to_string()),
        tenant_access_role: Role::new("TenantScopedAccessRole"),
        source_root: "../src".to_string(),
    }
}

pub fn pooled_request() -> TenantProvisioningRequest {
    request("pooled", true)
}

pub fn siloed_request(tenant_id: &str) -> TenantProvisioningRequest {
    request(tenant_id, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_placements() {
        assert_eq!(pooled_request().placement().stack_qualifier(), "pooled");
        assert_eq!(siloed_request("acme").placement().stack_qualifier(), "acme");
    }
}
