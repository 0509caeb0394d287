use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Qualifier of the shared pool; no siloed tenant may use it as its id
pub const POOLED_QUALIFIER: &str = "pooled";

/// Stable identifier of a compute binding, e.g. `ProductService-GetAll`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(String);

impl BindingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to the shared runtime layer every binding loads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerRef(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Runtime {
    #[serde(rename = "python3.10")]
    Python310,
}

/// Named canary/rollout policy applied to a binding's deployment.
/// The policy itself runs elsewhere; bindings only record which one applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "name")]
pub enum RolloutPolicy {
    #[default]
    None,
    Named(String),
}

impl RolloutPolicy {
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            RolloutPolicy::None
        } else {
            RolloutPolicy::Named(trimmed.to_string())
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            RolloutPolicy::None => None,
            RolloutPolicy::Named(name) => Some(name),
        }
    }

    /// Alias traffic is shifted through when a policy applies
    pub fn alias(&self) -> Option<&'static str> {
        self.name().map(|_| "live")
    }
}

/// Where a binding's capacity comes from. Placement never changes the route shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "pool")]
pub enum CapacityPlacement {
    /// Shared by every pooled tenant
    Pooled,
    /// Reserved for one siloed tenant
    Dedicated {
        #[serde(rename = "tenantId")]
        tenant_id: String,
    },
}

impl CapacityPlacement {
    pub fn for_tenant(is_pooled: bool, tenant_id: &str) -> Self {
        if is_pooled {
            CapacityPlacement::Pooled
        } else {
            CapacityPlacement::Dedicated { tenant_id: tenant_id.to_string() }
        }
    }

    /// Stack qualifier used in physical resource names
    pub fn stack_qualifier(&self) -> &str {
        match self {
            CapacityPlacement::Pooled => POOLED_QUALIFIER,
            CapacityPlacement::Dedicated { tenant_id } => tenant_id,
        }
    }
}

/// Typed configuration handed to a binding at construction time
pub type BindingConfig = BTreeMap<String, String>;

/// One deployable function and everything needed to invoke it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeBinding {
    pub id: BindingId,
    pub function_name: String,
    pub runtime: Runtime,
    pub entry: String,
    pub index: String,
    pub handler: String,
    pub timeout_secs: u64,
    /// Per-function reservation; never pooled across a unit
    pub reserved_concurrency: Option<u32>,
    pub layers: Vec<LayerRef>,
    pub environment: BindingConfig,
    pub execution_role: String,
    pub rollout: RolloutPolicy,
    pub placement: CapacityPlacement,
}

impl ComputeBinding {
    pub fn builder(id: impl Into<String>) -> ComputeBindingBuilder {
        ComputeBindingBuilder::new(id)
    }

    pub fn env(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str)
    }
}

/// Builder for [`ComputeBinding`]. Configuration is resolved before `build`, after
/// which the binding is considered ready and never changes.
#[derive(Debug, Clone)]
pub struct ComputeBindingBuilder {
    id: String,
    function_name: Option<String>,
    entry: String,
    index: String,
    handler: String,
    timeout_secs: u64,
    reserved_concurrency: Option<u32>,
    layers: Vec<LayerRef>,
    environment: BindingConfig,
    execution_role: String,
    rollout: RolloutPolicy,
    placement: CapacityPlacement,
}

impl ComputeBindingBuilder {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            function_name: None,
            entry: String::new(),
            index: String::new(),
            handler: "lambda_handler".to_string(),
            timeout_secs: 30,
            reserved_concurrency: None,
            layers: Vec::new(),
            environment: BindingConfig::new(),
            execution_role: String::new(),
            rollout: RolloutPolicy::None,
            placement: CapacityPlacement::Pooled,
        }
    }

    pub fn function_name(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    pub fn code(mut self, entry: impl Into<String>, index: impl Into<String>, handler: impl Into<String>) -> Self {
        self.entry = entry.into();
        self.index = index.into();
        self.handler = handler.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn reserved_concurrency(mut self, limit: u32) -> Self {
        self.reserved_concurrency = Some(limit);
        self
    }

    pub fn layer(mut self, layer: LayerRef) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn execution_role(mut self, role: impl Into<String>) -> Self {
        self.execution_role = role.into();
        self
    }

    pub fn rollout(mut self, rollout: RolloutPolicy) -> Self {
        self.rollout = rollout;
        self
    }

    pub fn placement(mut self, placement: CapacityPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn build(self) -> ComputeBinding {
        let function_name = self
            .function_name
            .unwrap_or_else(|| format!("{}-{}", self.id, self.placement.stack_qualifier()));

        ComputeBinding {
            id: BindingId::new(self.id),
            function_name,
            runtime: Runtime::Python310,
            entry: self.entry,
            index: self.index,
            handler: self.handler,
            timeout_secs: self.timeout_secs,
            reserved_concurrency: self.reserved_concurrency,
            layers: self.layers,
            environment: self.environment,
            execution_role: self.execution_role,
            rollout: self.rollout,
            placement: self.placement,
        }
    }
}
