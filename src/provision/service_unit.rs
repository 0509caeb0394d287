use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::{ProvisionError, ServiceUnitSpec, TenantProvisioningRequest};
use crate::compute::{CapacityPlacement, ComputeBinding, DataStore, RolloutPolicy};
use crate::iam::{self, AccessGrant, AccessMode};
use crate::routes::{MethodOptions, NodeId, RouteTree};
use crate::types::CrudRole;

/// Path parameter segment of every item route
pub const ITEM_SEGMENT: &str = "{id}";

const SERVICE_TIMEOUT_SECS: u64 = 60;

/// One provisioned microservice: its store, one binding per CRUD role, and the
/// collection/item routes those bindings answer on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUnit {
    pub name: String,
    pub store: DataStore,
    pub bindings: BTreeMap<CrudRole, ComputeBinding>,
    pub collection: NodeId,
    pub item: NodeId,
    pub rollout: RolloutPolicy,
    pub placement: CapacityPlacement,
}

impl ServiceUnit {
    /// Build the unit and register its routes on `routes`.
    ///
    /// Routes are staged on a copy of the tree and only committed once every
    /// registration succeeded, so a failed unit leaves `routes` untouched.
    pub fn provision(
        spec: &ServiceUnitSpec,
        request: &TenantProvisioningRequest,
        routes: &mut RouteTree,
    ) -> Result<Self, ProvisionError> {
        spec.validate()?;

        let placement = request.placement();
        let rollout = request.deployment_strategy.clone();
        let store = DataStore::new(&spec.name, &spec.sort_key_name, placement.clone(), &request.environment);
        let entry = request.code_entry(&spec.code_entry_path);

        let mut bindings = BTreeMap::new();
        for role in CrudRole::ALL {
            let binding = ComputeBinding::builder(format!("{}-{}", spec.name, role.label()))
                .code(entry.as_str(), spec.handler_index_file.as_str(), spec.handler(role)?)
                .timeout_secs(SERVICE_TIMEOUT_SECS)
                .reserved_concurrency(request.per_service_concurrency_limit)
                .layer(request.shared_runtime_layer.clone())
                .env(spec.table_name_env_key.as_str(), store.name.as_str())
                .env("POWERTOOLS_SERVICE_NAME", spec.name.as_str())
                .execution_role(request.tenant_access_role.name.as_str())
                .rollout(rollout.clone())
                .placement(placement.clone())
                .build();
            bindings.insert(role, binding);
        }

        let mut staged = routes.clone();
        let collection = staged.add_child(staged.root(), &spec.route_segment)?;
        let item = staged.add_child(collection, ITEM_SEGMENT)?;

        for (role, binding) in &bindings {
            let node = if role.is_collection() { collection } else { item };
            staged.attach_handler(node, role.method(), binding.id.clone(), MethodOptions::open())?;
        }
        *routes = staged;

        if let Some(policy) = rollout.name() {
            debug!("{} bindings deploy through rollout policy {}", spec.name, policy);
        }
        info!(
            service = %spec.name,
            store = %store.name,
            placement = placement.stack_qualifier(),
            "Provisioned service unit"
        );

        Ok(Self {
            name: spec.name.clone(),
            store,
            bindings,
            collection,
            item,
            rollout,
            placement,
        })
    }

    /// Read/write grant on this unit's store, for the tenant role
    pub fn data_access_grant(&self) -> AccessGrant {
        iam::data_access_grant(&self.store, AccessMode::ReadWrite)
    }

    pub fn binding(&self, role: CrudRole) -> Option<&ComputeBinding> {
        self.bindings.get(&role)
    }
}
