use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

use crate::compute::{BindingId, ComputeBinding};
use crate::types::HttpMethod;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("No invoker for binding {0}")]
    UnknownBinding(String),

    #[error("Backend failure: {0}")]
    Backend(String),
}

/// Proxy-style event handed to a binding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub method: HttpMethod,
    /// Route template, e.g. `/products/{id}`
    pub resource: String,
    /// Concrete request path
    pub path: String,
    pub path_parameters: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub principal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: Value,
}

impl InvocationResponse {
    pub fn ok(body: Value) -> Self {
        Self { status_code: 200, body }
    }
}

/// Executes a compute binding on behalf of the gateway
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, binding: &ComputeBinding, invocation: Invocation) -> Result<InvocationResponse, InvokeError>;
}

/// Reflects the invocation back. Stands in for deployed functions when running locally.
#[derive(Debug, Clone, Default)]
pub struct EchoInvoker;

#[async_trait]
impl Invoker for EchoInvoker {
    async fn invoke(&self, binding: &ComputeBinding, invocation: Invocation) -> Result<InvocationResponse, InvokeError> {
        tracing::debug!(binding = %binding.id, resource = %invocation.resource, "Echo invocation");
        Ok(InvocationResponse::ok(json!({
            "binding": binding.id,
            "functionName": binding.function_name,
            "handler": format!("{}.{}", binding.index.trim_end_matches(".py"), binding.handler),
            "method": invocation.method,
            "resource": invocation.resource,
            "path": invocation.path,
            "pathParameters": invocation.path_parameters,
            "body": invocation.body,
            "principal": invocation.principal,
        })))
    }
}

/// Invokers keyed by binding, with an optional fallback
#[derive(Clone, Default)]
pub struct InvokerRegistry {
    by_binding: HashMap<BindingId, Arc<dyn Invoker>>,
    fallback: Option<Arc<dyn Invoker>>,
}

impl InvokerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, binding: BindingId, invoker: Arc<dyn Invoker>) -> Self {
        self.by_binding.insert(binding, invoker);
        self
    }

    pub fn with_fallback(mut self, invoker: Arc<dyn Invoker>) -> Self {
        self.fallback = Some(invoker);
        self
    }

    pub fn resolve(&self, binding: &BindingId) -> Result<Arc<dyn Invoker>, InvokeError> {
        self.by_binding
            .get(binding)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| InvokeError::UnknownBinding(binding.to_string()))
    }
}
