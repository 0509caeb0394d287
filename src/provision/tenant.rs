use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use super::{ProvisionError, ServiceCatalog, ServiceUnit, TenantProvisioningRequest};
use crate::compute::{BindingId, ComputeBinding};
use crate::iam::{self, Role};
use crate::routes::{MethodOptions, NodeId, RouteTree};
use crate::types::HttpMethod;

pub const USERS_SEGMENT: &str = "users";
pub const AI_CONCIERGE_SEGMENT: &str = "ai-concierge";

/// Top-level segments owned by auxiliary services; catalog services may not use them
pub const RESERVED_SEGMENTS: &[&str] = &[USERS_SEGMENT, AI_CONCIERGE_SEGMENT];

/// Secret name prefix the concierge binding may read
pub const CONCIERGE_SECRET_PREFIX: &str = "OpenAI_API_Key";

const USER_MANAGEMENT_TIMEOUT_SECS: u64 = 60;
const AI_CONCIERGE_TIMEOUT_SECS: u64 = 300;

/// Single-function service outside the CRUD catalog, with its own execution role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuxiliaryService {
    pub name: String,
    pub binding: ComputeBinding,
    pub role: Role,
    pub routes: Vec<NodeId>,
}

/// Result of a successful provisioning run. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantStack {
    pub tenant_id: String,
    pub routes: RouteTree,
    pub units: Vec<ServiceUnit>,
    pub user_management: AuxiliaryService,
    pub ai_concierge: AuxiliaryService,
    pub tenant_role: Role,
}

impl TenantStack {
    pub fn unit(&self, name: &str) -> Option<&ServiceUnit> {
        self.units.iter().find(|u| u.name == name)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &ComputeBinding> {
        self.units
            .iter()
            .flat_map(|u| u.bindings.values())
            .chain([&self.user_management.binding, &self.ai_concierge.binding])
    }

    pub fn binding(&self, id: &BindingId) -> Option<&ComputeBinding> {
        self.bindings().find(|b| &b.id == id)
    }

    pub fn all_roles(&self) -> Vec<&Role> {
        vec![&self.tenant_role, &self.user_management.role, &self.ai_concierge.role]
    }

    /// SHA-256 over the canonical JSON form; identical input yields an identical fingerprint
    pub fn fingerprint(&self) -> Result<String, ProvisionError> {
        let canonical = serde_json::to_vec(self)?;
        let digest = Sha256::digest(&canonical);
        Ok(format!("{:x}", digest))
    }
}

/// Composes the service catalog and the auxiliary services into one stack
#[derive(Debug, Clone, Default)]
pub struct TenantProvisioner {
    catalog: ServiceCatalog,
}

impl TenantProvisioner {
    pub fn new(catalog: ServiceCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// Provision against a fresh API entry point
    pub fn provision(&self, request: &TenantProvisioningRequest) -> Result<TenantStack, ProvisionError> {
        self.provision_into(request, RouteTree::new())
    }

    /// Provision on top of an entry point that may already carry stack-owned routes.
    /// The tree is consumed; on failure it is dropped with everything built so far.
    pub fn provision_into(
        &self,
        request: &TenantProvisioningRequest,
        mut routes: RouteTree,
    ) -> Result<TenantStack, ProvisionError> {
        request.validate()?;
        self.catalog.validate(RESERVED_SEGMENTS)?;

        let mut tenant_role = request.tenant_access_role.clone();
        let mut units = Vec::with_capacity(self.catalog.specs().len());

        for spec in self.catalog.specs() {
            let unit = ServiceUnit::provision(spec, request, &mut routes)?;
            tenant_role.attach(unit.data_access_grant());
            units.push(unit);
        }

        let user_management = provision_user_management(request, &mut routes)?;
        let ai_concierge = provision_ai_concierge(request, &mut routes)?;

        info!(
            tenant = %request.tenant_id,
            units = units.len(),
            routes = routes.route_count(),
            methods = routes.method_count(),
            "Provisioned tenant stack"
        );

        Ok(TenantStack {
            tenant_id: request.tenant_id.clone(),
            routes,
            units,
            user_management,
            ai_concierge,
            tenant_role,
        })
    }
}

fn provision_user_management(
    request: &TenantProvisioningRequest,
    routes: &mut RouteTree,
) -> Result<AuxiliaryService, ProvisionError> {
    let placement = request.placement();

    let mut role = Role::new(format!("UserManagementExecRole-{}", placement.stack_qualifier()))
        .assumed_by(iam::LAMBDA_SERVICE_PRINCIPAL)
        .with_managed_policy(iam::BASIC_EXECUTION_POLICY)
        .with_managed_policy(iam::LAMBDA_INSIGHTS_POLICY)
        .with_managed_policy(iam::XRAY_WRITE_POLICY);

    // Empty for providers that need no elevation
    role.attach(iam::grants_for(&request.identity_provider, &request.environment)?);

    let binding = ComputeBinding::builder("AppPlaneUserManagementServices")
        .code(request.code_entry("UserManagementService"), "user_management.py", "lambda_handler")
        .timeout_secs(USER_MANAGEMENT_TIMEOUT_SECS)
        .layer(request.shared_runtime_layer.clone())
        .env("IDP_DETAILS", request.identity_provider.to_config_value()?)
        .execution_role(role.name.as_str())
        .placement(placement)
        .build();

    let open = MethodOptions::open();
    let id = &binding.id;
    let root = routes.root();

    let users = routes.add_child(root, USERS_SEGMENT)?;
    routes.attach_handler(users, HttpMethod::Post, id.clone(), open)?;
    routes.attach_handler(users, HttpMethod::Get, id.clone(), open)?;

    let username = routes.add_child(users, "{username}")?;
    routes.attach_handler(username, HttpMethod::Get, id.clone(), open)?;
    routes.attach_handler(username, HttpMethod::Put, id.clone(), open)?;
    routes.attach_handler(username, HttpMethod::Delete, id.clone(), open)?;

    let disable = routes.add_child(username, "disable")?;
    routes.attach_handler(disable, HttpMethod::Delete, id.clone(), open)?;

    let enable = routes.add_child(username, "enable")?;
    routes.attach_handler(enable, HttpMethod::Put, id.clone(), open)?;

    info!(
        role = %role.name,
        provider = %request.identity_provider.kind,
        grants = role.grant_count(),
        "Provisioned user management service"
    );

    Ok(AuxiliaryService {
        name: "UserManagementService".to_string(),
        binding,
        role,
        routes: vec![users, username, disable, enable],
    })
}

fn provision_ai_concierge(
    request: &TenantProvisioningRequest,
    routes: &mut RouteTree,
) -> Result<AuxiliaryService, ProvisionError> {
    let placement = request.placement();

    let mut role = Role::new(format!("AIConciergeExecRole-{}", placement.stack_qualifier()))
        .assumed_by(iam::LAMBDA_SERVICE_PRINCIPAL)
        .with_managed_policy(iam::BASIC_EXECUTION_POLICY);
    role.attach(iam::secret_read_grant(CONCIERGE_SECRET_PREFIX, &request.environment));

    let binding = ComputeBinding::builder("AIConciergeService")
        .code(request.code_entry("AIConciergeService"), "ai_concierge.py", "lambda_handler")
        .timeout_secs(AI_CONCIERGE_TIMEOUT_SECS)
        .layer(request.shared_runtime_layer.clone())
        .env("IDP_DETAILS", request.identity_provider.to_config_value()?)
        .execution_role(role.name.as_str())
        .placement(placement)
        .build();

    // Only gated method in the stack: custom authorizer and API key, unlike the
    // open CRUD and user routes.
    let concierge = routes.add_child(routes.root(), AI_CONCIERGE_SEGMENT)?;
    routes.attach_handler(concierge, HttpMethod::Post, binding.id.clone(), MethodOptions::gated())?;

    info!(role = %role.name, "Provisioned AI concierge service");

    Ok(AuxiliaryService {
        name: "AIConciergeService".to_string(),
        binding,
        role,
        routes: vec![concierge],
    })
}
